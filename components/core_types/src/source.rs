//! Source location tracking for rejection errors.

use std::fmt;
use std::panic::Location;

/// A position in the Rust source where an error value was created.
///
/// Captured through `#[track_caller]`, so it points at the producer code
/// that called the error constructor rather than at this crate.
///
/// # Examples
///
/// ```
/// use core_types::SourceLocation;
///
/// let here = SourceLocation::caller();
/// assert!(here.file.ends_with(".rs"));
/// assert!(here.line > 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    /// Source file path as reported by the compiler
    pub file: &'static str,
    /// 1-indexed line number
    pub line: u32,
    /// 1-indexed column number
    pub column: u32,
}

impl SourceLocation {
    /// Returns the location of the caller.
    #[track_caller]
    pub fn caller() -> Self {
        Self::from(Location::caller())
    }
}

impl From<&'static Location<'static>> for SourceLocation {
    fn from(location: &'static Location<'static>) -> Self {
        Self {
            file: location.file(),
            line: location.line(),
            column: location.column(),
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}
