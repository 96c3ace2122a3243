//! Scenario runner
//!
//! [`Demo`] owns the event loop and the console and runs one scenario per
//! call:
//! - `reactions` - then/catch/finally handlers on one value
//! - `await-one` - await one value and branch on the outcome
//! - `sequential` - await `count` values one at a time
//! - `all-settled` - await a whole collection at once

use crate::cli::{Cli, Command, ProducerKind};
use crate::console::{Console, Line, Scenario};
use crate::error::CliResult;
use async_runtime::{
    all_settled, always_fulfills, always_rejects, Deferred, EventLoop, Handle, Settlement,
};
use core_types::FutureValue;
use std::time::Duration;
use tracing::debug;

/// Runs demonstration scenarios on a single event loop
#[derive(Debug)]
pub struct Demo {
    event_loop: EventLoop,
    delay: Duration,
    console: Console,
}

impl Demo {
    /// Creates a runner.
    ///
    /// # Arguments
    /// * `event_loop` - Loop the scenarios run on
    /// * `delay` - Delay before each producer settles
    /// * `console` - Output sink
    pub fn new(event_loop: EventLoop, delay: Duration, console: Console) -> Self {
        Self {
            event_loop,
            delay,
            console,
        }
    }

    /// Creates a runner configured from parsed arguments.
    pub fn from_cli(cli: &Cli, console: Console) -> Self {
        let event_loop = if cli.virtual_time {
            EventLoop::with_virtual_clock()
        } else {
            EventLoop::new()
        };
        Self::new(event_loop, cli.delay(), console)
    }

    /// Current time on the runner's event loop.
    pub fn now(&self) -> Duration {
        self.event_loop.now()
    }

    /// Runs `command` to completion and flushes the console.
    ///
    /// Rejections are part of the demonstration and are reported, not
    /// returned as errors.
    ///
    /// # Errors
    /// Returns `CliError` if the event loop stalls or output cannot be written
    pub fn run(&mut self, command: &Command) -> CliResult<()> {
        debug!(?command, delay = ?self.delay, "running scenario");
        match command {
            Command::Reactions { reject } => {
                self.reactions(ProducerKind::from_reject_flag(*reject))
            }
            Command::AwaitOne { reject } => {
                self.await_one(ProducerKind::from_reject_flag(*reject))?
            }
            Command::Sequential { count, reject } => {
                self.sequential(*count, ProducerKind::from_reject_flag(*reject))?
            }
            Command::AllSettled { pattern } => self.all_settled(pattern)?,
        }
        self.console.finish()
    }

    /// Handlers only; nothing awaits the value.
    fn reactions(&mut self, kind: ProducerKind) {
        let handle = self.event_loop.handle();
        let start = handle.now();
        let (on_value, on_error) = (self.console.clone(), self.console.clone());
        let on_done = self.console.clone();
        let clock = handle.clone();

        produce(&handle, kind, self.delay)
            .then(move |value| {
                on_value.emit(Line::Fulfilled {
                    scenario: Scenario::Reactions,
                    value,
                })
            })
            .catch(move |error| {
                on_error.emit(Line::Rejected {
                    scenario: Scenario::Reactions,
                    error,
                })
            })
            .finally(move || on_done.emit(Line::TotalTime(clock.now() - start)));

        self.event_loop.run_until_done();
    }

    fn await_one(&mut self, kind: ProducerKind) -> CliResult<()> {
        let handle = self.event_loop.handle();
        let console = self.console.clone();
        let delay = self.delay;

        self.event_loop.block_on(async move {
            let start = handle.now();
            let deferred = produce(&handle, kind, delay);
            report_await(&console, deferred.await);
            console.emit(Line::TotalTime(handle.now() - start));
        })?;
        Ok(())
    }

    fn sequential(&mut self, count: u32, kind: ProducerKind) -> CliResult<()> {
        let handle = self.event_loop.handle();
        let console = self.console.clone();
        let delay = self.delay;

        self.event_loop.block_on(async move {
            let start = handle.now();
            for _ in 0..count {
                let deferred = produce(&handle, kind, delay);
                report_await(&console, deferred.await);
            }
            console.emit(Line::TotalTime(handle.now() - start));
        })?;
        Ok(())
    }

    fn all_settled(&mut self, pattern: &[ProducerKind]) -> CliResult<()> {
        let handle = self.event_loop.handle();
        let console = self.console.clone();
        let start = handle.now();
        let inputs: Vec<_> = pattern
            .iter()
            .map(|kind| produce(&handle, *kind, self.delay))
            .collect();

        let settled = self.event_loop.block_on(all_settled(inputs))?;
        for settlement in &settled {
            console.emit(match settlement {
                Settlement::Fulfilled(value) => Line::Fulfilled {
                    scenario: Scenario::Aggregate,
                    value,
                },
                Settlement::Rejected(error) => Line::Rejected {
                    scenario: Scenario::Aggregate,
                    error,
                },
            });
        }
        console.emit(Line::TotalTime(handle.now() - start));
        Ok(())
    }
}

fn produce(handle: &Handle, kind: ProducerKind, delay: Duration) -> Deferred<FutureValue> {
    match kind {
        ProducerKind::Fulfill => Deferred::new(always_fulfills(handle, delay)),
        ProducerKind::Reject => Deferred::new(always_rejects(handle, delay)),
    }
}

fn report_await(console: &Console, outcome: Result<FutureValue, core_types::DeferredError>) {
    match &outcome {
        Ok(value) => console.emit(Line::Fulfilled {
            scenario: Scenario::Await,
            value,
        }),
        Err(error) => console.emit(Line::Rejected {
            scenario: Scenario::Await,
            error,
        }),
    }
}
