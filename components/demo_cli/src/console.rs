//! Console sink for scenario output
//!
//! Scenario code and reaction handlers emit [`Line`]s without handling
//! write errors on the spot; the first failure is kept and reported by
//! [`Console::finish`].

use crate::cli::OutputFormat;
use crate::error::{CliError, CliResult};
use core_types::{DeferredError, FutureValue};
use serde::Serialize;
use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;
use std::time::Duration;

/// Which consumer style produced a settlement line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    /// Reaction handlers
    Reactions,
    /// A single awaited value
    Await,
    /// One entry of an all-settled aggregation
    Aggregate,
}

/// One unit of console output
#[derive(Debug, Clone, Copy)]
pub enum Line<'a> {
    /// A value fulfilled
    Fulfilled {
        /// Consumer style
        scenario: Scenario,
        /// The value
        value: &'a FutureValue,
    },
    /// A value rejected
    Rejected {
        /// Consumer style
        scenario: Scenario,
        /// The error
        error: &'a DeferredError,
    },
    /// Elapsed time of a scenario
    TotalTime(Duration),
}

#[derive(Serialize)]
struct JsonLine<'a> {
    event: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    scenario: Option<Scenario>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<&'a FutureValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seconds: Option<f64>,
}

impl<'a> Line<'a> {
    /// Renders the line as human-readable text.
    ///
    /// The text may span more than one output line.
    pub fn to_text(&self) -> String {
        match self {
            Line::Fulfilled { scenario, value } => match scenario {
                Scenario::Reactions => value.to_string(),
                Scenario::Await => format!("Promise got fulfilled:\n{}", value),
                Scenario::Aggregate => format!("OK: {}", value),
            },
            Line::Rejected { scenario, error } => match scenario {
                Scenario::Reactions => error.to_string(),
                Scenario::Await => format!("Promise got rejected:\n{}", error),
                Scenario::Aggregate => format!("ERROR: {}", error),
            },
            Line::TotalTime(elapsed) => {
                format!("Total time:  {:.3}", elapsed.as_secs_f64())
            }
        }
    }

    /// Renders the line as a single JSON object.
    pub fn to_json(&self) -> serde_json::Result<String> {
        let line = match *self {
            Line::Fulfilled { scenario, value } => JsonLine {
                event: "fulfilled",
                scenario: Some(scenario),
                value: Some(value),
                reason: None,
                seconds: None,
            },
            Line::Rejected { scenario, error } => JsonLine {
                event: "rejected",
                scenario: Some(scenario),
                value: None,
                reason: Some(error.message.as_str()),
                seconds: None,
            },
            Line::TotalTime(elapsed) => JsonLine {
                event: "total_time",
                scenario: None,
                value: None,
                reason: None,
                seconds: Some(elapsed.as_secs_f64()),
            },
        };
        serde_json::to_string(&line)
    }
}

struct ConsoleInner {
    out: Box<dyn Write>,
    format: OutputFormat,
    failure: Option<CliError>,
}

/// Write-only output sink shared by a scenario and its handlers.
#[derive(Clone)]
pub struct Console {
    inner: Rc<RefCell<ConsoleInner>>,
}

impl Console {
    /// Creates a console writing to `out`.
    pub fn new<W: Write + 'static>(out: W, format: OutputFormat) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ConsoleInner {
                out: Box::new(out),
                format,
                failure: None,
            })),
        }
    }

    /// Creates a console writing to standard output.
    pub fn stdout(format: OutputFormat) -> Self {
        Self::new(io::stdout(), format)
    }

    /// Creates a console writing to memory, for inspection in tests.
    pub fn memory(format: OutputFormat) -> (Self, MemoryOutput) {
        let output = MemoryOutput::default();
        (Self::new(output.clone(), format), output)
    }

    /// Writes one line.
    ///
    /// After the first failure further lines are dropped.
    pub fn emit(&self, line: Line<'_>) {
        let mut inner = self.inner.borrow_mut();
        if inner.failure.is_some() {
            return;
        }
        let rendered = match inner.format {
            OutputFormat::Text => Ok(line.to_text()),
            OutputFormat::Json => line.to_json().map_err(CliError::from),
        };
        let result =
            rendered.and_then(|text| writeln!(inner.out, "{}", text).map_err(CliError::from));
        if let Err(error) = result {
            tracing::warn!(%error, "console output failed");
            inner.failure = Some(error);
        }
    }

    /// Flushes the output and reports the first failure, if any.
    pub fn finish(&self) -> CliResult<()> {
        let mut inner = self.inner.borrow_mut();
        if let Some(error) = inner.failure.take() {
            return Err(error);
        }
        inner.out.flush()?;
        Ok(())
    }
}

impl std::fmt::Debug for Console {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Console")
            .field("format", &inner.format)
            .field("failed", &inner.failure.is_some())
            .finish()
    }
}

/// In-memory console output.
#[derive(Debug, Clone, Default)]
pub struct MemoryOutput {
    buffer: Rc<RefCell<Vec<u8>>>,
}

impl MemoryOutput {
    /// Everything written so far.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.borrow()).into_owned()
    }

    /// Everything written so far, split into lines.
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_owned).collect()
    }
}

impl Write for MemoryOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
