//! Command line arguments and the run configuration derived from them.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use clap::Parser;
use print_prefetch::{PrefetchConfig, DEFAULT_INITIAL_FILL, DEFAULT_MAX_WINDOW};
use print_types::{FetchPolicy, PrintError};

/// How the operator drives the run.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Every layer is confirmed interactively.
    Supervised,
    /// Layers run without prompts.
    Automatic,
}

impl FromStr for Mode {
    type Err = PrintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "supervised" => Ok(Mode::Supervised),
            "automatic" => Ok(Mode::Automatic),
            _ => Err(PrintError::InvalidMode(s.to_string())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Supervised => write!(f, "supervised"),
            Mode::Automatic => write!(f, "automatic"),
        }
    }
}

/// Execution strategy picked from the mode and flags.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// One row at a time. `supervised` adds the confirm and ignore/end prompts.
    Sequential { supervised: bool },
    /// Every row in flight at once.
    FullConcurrency,
    /// Bounded window of rows running ahead of the pacing prompt.
    PrefetchPaced,
}

#[derive(Debug, Parser)]
#[command(
    name = "layer-print",
    author,
    version,
    about = "Simulate printing layers from CSV data"
)]
pub struct Args {
    /// Name of the print job.
    pub print_name: String,

    /// Destination folder for layer artifacts and the summary.
    pub output_folder: PathBuf,

    /// Mode to run: 'supervised' or 'automatic'.
    pub mode: Mode,

    /// CSV file containing the print layer data.
    pub csv_file: PathBuf,

    /// Maximum number of layers prefetched ahead of the operator.
    #[arg(long, env = "LAYER_PRINT_MAX_WINDOW", default_value_t = DEFAULT_MAX_WINDOW)]
    pub max_window: usize,

    /// Layers launched before the first prompt.
    #[arg(long, env = "LAYER_PRINT_INITIAL_FILL", default_value_t = DEFAULT_INITIAL_FILL)]
    pub initial_fill: usize,

    /// Timeout for a single image fetch.
    #[arg(long, env = "LAYER_PRINT_FETCH_TIMEOUT_SECS", default_value_t = 10)]
    pub fetch_timeout_secs: u64,

    /// Process layers strictly one after another.
    #[arg(long)]
    pub sequential: bool,

    /// Simulated print time per layer in sequential automatic runs.
    #[arg(long, env = "LAYER_PRINT_LAYER_DELAY_MS", default_value_t = 0)]
    pub layer_delay_ms: u64,

    /// Cap on layers running at once in automatic mode (default: all).
    #[arg(long, value_name = "N")]
    pub automatic_concurrency: Option<usize>,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn strategy(&self) -> Strategy {
        match (self.mode, self.sequential) {
            (Mode::Supervised, true) => Strategy::Sequential { supervised: true },
            (Mode::Automatic, true) => Strategy::Sequential { supervised: false },
            (Mode::Supervised, false) => Strategy::PrefetchPaced,
            (Mode::Automatic, false) => Strategy::FullConcurrency,
        }
    }

    /// Validate the options and assemble the run configuration.
    pub fn run_config(&self) -> Result<RunConfig, PrintError> {
        let prefetch = PrefetchConfig::new(self.max_window, self.initial_fill)?;
        Ok(RunConfig {
            print_name: self.print_name.clone(),
            output_folder: self.output_folder.clone(),
            mode: self.mode,
            strategy: self.strategy(),
            prefetch,
            fetch: FetchPolicy::with_timeout_secs(self.fetch_timeout_secs),
            layer_delay: Duration::from_millis(self.layer_delay_ms),
            automatic_concurrency: self.automatic_concurrency.filter(|cap| *cap > 0),
        })
    }
}

/// Everything the coordinator needs to know about one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub print_name: String,
    pub output_folder: PathBuf,
    pub mode: Mode,
    pub strategy: Strategy,
    pub prefetch: PrefetchConfig,
    pub fetch: FetchPolicy,
    pub layer_delay: Duration,
    pub automatic_concurrency: Option<usize>,
}

impl RunConfig {
    /// Defaults for `mode`, used by tests and embedders that skip the CLI.
    pub fn new(print_name: impl Into<String>, output_folder: impl Into<PathBuf>, mode: Mode) -> Self {
        Self {
            print_name: print_name.into(),
            output_folder: output_folder.into(),
            mode,
            strategy: match mode {
                Mode::Supervised => Strategy::PrefetchPaced,
                Mode::Automatic => Strategy::FullConcurrency,
            },
            prefetch: PrefetchConfig::default(),
            fetch: FetchPolicy::default(),
            layer_delay: Duration::ZERO,
            automatic_concurrency: None,
        }
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_prefetch(mut self, prefetch: PrefetchConfig) -> Self {
        self.prefetch = prefetch;
        self
    }
}
