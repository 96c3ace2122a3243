//! Structured rejection errors.
//!
//! A deferred value is always rejected with a [`DeferredError`], never with a
//! bare string, so every consumer handles one error shape.

use crate::SourceLocation;
use std::error::Error as StdError;
use std::sync::Arc;
use thiserror::Error;

/// The kind of rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The producer routine reported a failure
    ProducerFailure,
}

/// An error a deferred value was rejected with.
///
/// Carries a descriptive message, the location where it was constructed and
/// an optional underlying cause reachable through [`StdError::source`].
///
/// # Examples
///
/// ```
/// use core_types::{DeferredError, ErrorKind};
/// use std::error::Error;
///
/// let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "upstream timed out");
/// let error = DeferredError::producer_failure("lookup failed").with_cause(io);
///
/// assert_eq!(error.kind, ErrorKind::ProducerFailure);
/// assert_eq!(error.message, "lookup failed");
/// assert_eq!(error.source().unwrap().to_string(), "upstream timed out");
/// ```
#[derive(Debug, Clone, Error)]
#[error("Error: {message}")]
pub struct DeferredError {
    /// The type of error
    pub kind: ErrorKind,
    /// Human-readable error message
    pub message: String,
    /// Where the error was constructed, if known
    pub location: Option<SourceLocation>,
    /// Underlying cause
    #[source]
    pub cause: Option<Arc<dyn StdError + Send + Sync + 'static>>,
}

impl DeferredError {
    /// Creates an error of the given kind, recording the caller's location.
    #[track_caller]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            location: Some(SourceLocation::caller()),
            cause: None,
        }
    }

    /// Creates a [`ErrorKind::ProducerFailure`] error.
    #[track_caller]
    pub fn producer_failure(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ProducerFailure, message)
    }

    /// Attaches an underlying cause.
    pub fn with_cause<E>(mut self, cause: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        self.cause = Some(Arc::new(cause));
        self
    }
}

// Two errors are equal when kind and message match; location and cause are
// diagnostic metadata.
impl PartialEq for DeferredError {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.message == other.message
    }
}

impl Eq for DeferredError {}
