//! Deferred value demonstrations
//!
//! Provides the CLI definition, the scenario runner and the console sink
//! behind the `deferred-demo` binary.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cli;
pub mod console;
pub mod demo;
pub mod error;
pub mod logging;

pub use cli::{Cli, Command, OutputFormat, ProducerKind};
pub use console::{Console, Line, MemoryOutput, Scenario};
pub use demo::Demo;
pub use error::{CliError, CliResult};
