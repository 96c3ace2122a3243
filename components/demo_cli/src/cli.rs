//! Command-line arguments

use clap::{Parser, Subcommand, ValueEnum};
use std::time::Duration;

/// Demonstrations of deferred values on a single-threaded event loop
#[derive(Parser, Debug)]
#[command(name = "deferred-demo", version)]
pub struct Cli {
    /// Scenario to run
    #[command(subcommand)]
    pub command: Command,

    /// Delay before each producer settles, in milliseconds
    #[arg(long, global = true, default_value_t = 2000)]
    pub delay_ms: u64,

    /// Run on virtual time: timers fire instantly, reported times stay exact
    #[arg(long, global = true)]
    pub virtual_time: bool,

    /// How settlement lines are rendered
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// The producer delay as a `Duration`.
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Process exit code for an argument error.
///
/// `--help` and `--version` exit with 0; every real argument error exits
/// with 1, like runtime errors.
pub fn exit_code(error: &clap::Error) -> i32 {
    if error.use_stderr() {
        1
    } else {
        0
    }
}

/// Available scenarios
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Consume one value with then/catch/finally handlers
    Reactions {
        /// Use the producer that always rejects
        #[arg(long)]
        reject: bool,
    },

    /// Await one value and branch on the outcome
    AwaitOne {
        /// Use the producer that always rejects
        #[arg(long)]
        reject: bool,
    },

    /// Await values one after another (slow path)
    Sequential {
        /// Number of values to create and await
        #[arg(long, default_value_t = 4)]
        count: u32,

        /// Use the producer that always rejects
        #[arg(long)]
        reject: bool,
    },

    /// Await a collection at once and report every outcome (fast path)
    AllSettled {
        /// Comma-separated producers, one value per entry
        #[arg(
            long,
            value_enum,
            value_delimiter = ',',
            default_values = ["fulfill", "reject", "fulfill", "reject"]
        )]
        pattern: Vec<ProducerKind>,
    },
}

/// Which demonstration producer settles a value
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProducerKind {
    /// Fulfills with `{ firstName: 'Nadia', lastName: 'Idris' }`
    Fulfill,
    /// Rejects with "this promise failed"
    Reject,
}

impl ProducerKind {
    /// Maps a `--reject` flag to a producer.
    pub fn from_reject_flag(reject: bool) -> Self {
        if reject {
            ProducerKind::Reject
        } else {
            ProducerKind::Fulfill
        }
    }
}

/// Rendering of console lines
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}
