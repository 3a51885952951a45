//! Consumer pacing.
//!
//! The scheduler never decides on its own when the consumer advances; it asks
//! a [`PacingSignal`] once per row. Interactive front ends prompt a user,
//! tests script the answers.

use std::collections::VecDeque;

use async_trait::async_trait;

/// Answer of one pacing rendezvous.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Pacing {
    Proceed,
    Cancel,
}

/// The single synchronous rendezvous between consumer and scheduler.
#[async_trait]
pub trait PacingSignal: Send {
    /// Wait until the consumer is ready for row `index`.
    async fn wait(&mut self, index: usize) -> Pacing;
}

/// Pacing driven by a fixed script.
///
/// Once the script runs out, the fallback answer is returned forever.
#[derive(Debug, Clone)]
pub struct ScriptedPacing {
    script: VecDeque<Pacing>,
    fallback: Pacing,
    requests: Vec<usize>,
}

impl ScriptedPacing {
    pub fn new(script: impl IntoIterator<Item = Pacing>, fallback: Pacing) -> Self {
        Self {
            script: script.into_iter().collect(),
            fallback,
            requests: Vec::new(),
        }
    }

    /// Always proceed.
    pub fn proceed_all() -> Self {
        Self::new([], Pacing::Proceed)
    }

    /// Proceed `count` times, then cancel.
    pub fn cancel_after(count: usize) -> Self {
        Self::new(std::iter::repeat(Pacing::Proceed).take(count), Pacing::Cancel)
    }

    /// Row indices this signal was asked about, in order.
    pub fn requests(&self) -> &[usize] {
        &self.requests
    }
}

#[async_trait]
impl PacingSignal for ScriptedPacing {
    async fn wait(&mut self, index: usize) -> Pacing {
        self.requests.push(index);
        self.script.pop_front().unwrap_or(self.fallback)
    }
}
