//! Operator prompts.
//!
//! [`Prompter`] is the only place the runner reads user input. The console
//! implementation reads stdin; [`ScriptedPrompter`] replays canned answers.

use std::collections::VecDeque;
use std::io::Write;

use async_trait::async_trait;
use print_prefetch::{Pacing, PacingSignal};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::warn;

/// What to do with a row that carries an inherent error.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorChoice {
    Ignore,
    End,
}

/// Source of operator answers.
#[async_trait]
pub trait Prompter: Send {
    /// Show `prompt` and return the answer line. `None` means input closed.
    async fn ask(&mut self, prompt: &str) -> Option<String>;
}

/// `q` or closed input cancels, anything else proceeds.
pub async fn confirm(prompter: &mut (dyn Prompter + '_), prompt: &str) -> Pacing {
    match prompter.ask(prompt).await {
        Some(answer) if !answer.trim().eq_ignore_ascii_case("q") => Pacing::Proceed,
        _ => Pacing::Cancel,
    }
}

/// Ask whether to keep going after an inherent error.
pub async fn choose_on_error(
    prompter: &mut (dyn Prompter + '_),
    layer: &str,
    error: &str,
) -> ErrorChoice {
    println!("Error detected in layer {layer}: {error}");
    let prompt = "Options: [i]gnore error and continue, [e]nd printing. Enter choice (i/e): ";
    match prompter.ask(prompt).await {
        Some(answer) if !answer.trim().eq_ignore_ascii_case("e") => ErrorChoice::Ignore,
        _ => ErrorChoice::End,
    }
}

pub fn sequential_prompt(layer: &str) -> String {
    format!("Press 'Enter' to print layer {layer} or type 'q' to quit: ")
}

pub fn prefetch_prompt(index: usize) -> String {
    format!("Press Enter to process layer {index} (or 'q' to quit): ")
}

/// Interactive prompts on stdin/stdout.
pub struct ConsolePrompter {
    lines: Lines<BufReader<Stdin>>,
}

impl ConsolePrompter {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }
}

impl Default for ConsolePrompter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Prompter for ConsolePrompter {
    async fn ask(&mut self, prompt: &str) -> Option<String> {
        print!("{prompt}");
        if let Err(err) = std::io::stdout().flush() {
            warn!(error = %err, "failed to flush prompt");
        }
        match self.lines.next_line().await {
            Ok(line) => line,
            Err(err) => {
                warn!(error = %err, "failed to read answer");
                None
            }
        }
    }
}

/// Replays a fixed list of answers, then reports closed input.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    asked: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }

    /// `count` empty answers.
    pub fn enter_times(count: usize) -> Self {
        Self::new(std::iter::repeat("").take(count))
    }

    /// Every prompt shown so far.
    pub fn asked(&self) -> &[String] {
        &self.asked
    }
}

#[async_trait]
impl Prompter for ScriptedPrompter {
    async fn ask(&mut self, prompt: &str) -> Option<String> {
        self.asked.push(prompt.to_string());
        self.answers.pop_front()
    }
}

/// Paces a prefetch run with the prompter, one confirmation per row.
pub struct PromptPacing<'a> {
    prompter: &'a mut (dyn Prompter + 'a),
}

impl<'a> PromptPacing<'a> {
    pub fn new(prompter: &'a mut (dyn Prompter + 'a)) -> Self {
        Self { prompter }
    }
}

#[async_trait]
impl PacingSignal for PromptPacing<'_> {
    async fn wait(&mut self, index: usize) -> Pacing {
        confirm(&mut *self.prompter, &prefetch_prompt(index)).await
    }
}
