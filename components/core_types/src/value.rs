//! The record carried by a fulfilled deferred value.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A person's name, as produced by the demonstration producers.
///
/// Serializes with camelCase keys (`firstName`, `lastName`). The `Display`
/// implementation renders the record the way a console would print an
/// object literal.
///
/// # Examples
///
/// ```
/// use core_types::FutureValue;
///
/// let value = FutureValue::new("Nadia", "Idris");
/// assert_eq!(value.first_name, "Nadia");
/// assert_eq!(value.to_string(), "{ firstName: 'Nadia', lastName: 'Idris' }");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FutureValue {
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
}

impl FutureValue {
    /// Creates a new record.
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }
}

impl fmt::Display for FutureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ firstName: '{}', lastName: '{}' }}",
            self.first_name, self.last_name
        )
    }
}
