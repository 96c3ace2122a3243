//! Core value and error types for deferred computations.
//!
//! This crate provides the data that flows through a deferred value:
//! the record a producer settles with, and the structured error it
//! rejects with.
//!
//! # Overview
//!
//! - [`FutureValue`] - The record carried by a fulfilled deferred value
//! - [`DeferredError`] - Structured rejection error with optional cause
//! - [`ErrorKind`] - Classification of rejection errors
//! - [`SourceLocation`] - Where a rejection error was constructed
//!
//! # Examples
//!
//! ```
//! use core_types::{DeferredError, ErrorKind, FutureValue};
//!
//! let value = FutureValue::new("Nadia", "Idris");
//! assert_eq!(value.to_string(), "{ firstName: 'Nadia', lastName: 'Idris' }");
//!
//! let error = DeferredError::producer_failure("this promise failed");
//! assert_eq!(error.kind, ErrorKind::ProducerFailure);
//! assert_eq!(error.to_string(), "Error: this promise failed");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod error;
mod source;
mod value;

pub use error::{DeferredError, ErrorKind};
pub use source::SourceLocation;
pub use value::FutureValue;
