//! Field-keyed validation accumulator.
//!
//! A [`Validator`] collects one human-readable message per field. The first
//! failure recorded for a field wins; later failures for the same field are
//! ignored. Entity rule sets are plain functions issuing a sequence of
//! [`Validator::check`] calls, so new entities reuse the accumulator as-is.

use std::collections::{BTreeMap, HashSet};
use std::hash::Hash;

use serde::Serialize;

/// Field name to first recorded failure message.
pub type FieldErrors = BTreeMap<String, String>;

/// Accumulates validation failures for a single request.
///
/// # Examples
/// ```
/// use greenlight::domain::Validator;
///
/// let mut v = Validator::new();
/// v.check(false, "title", "must be provided");
/// v.check(false, "title", "must not be more than 500 bytes long");
/// assert!(!v.valid());
/// assert_eq!(v.errors()["title"], "must be provided");
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Validator {
    errors: FieldErrors,
}

impl Validator {
    /// Create an empty validator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no field has a recorded failure.
    #[must_use]
    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Record `message` for `field` unless the field already failed.
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_insert_with(|| message.into());
    }

    /// Record `message` for `field` when `ok` is false.
    pub fn check(&mut self, ok: bool, field: impl Into<String>, message: impl Into<String>) {
        if !ok {
            self.add_error(field, message);
        }
    }

    /// Recorded failures keyed by field.
    #[must_use]
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Consume the validator, returning its failures.
    #[must_use]
    pub fn into_errors(self) -> FieldErrors {
        self.errors
    }
}

/// True when `value` appears in `permitted`.
#[must_use]
pub fn permitted_value<T: PartialEq>(value: &T, permitted: &[T]) -> bool {
    permitted.contains(value)
}

/// True when every entry in `values` is distinct.
#[must_use]
pub fn unique<T: Eq + Hash>(values: &[T]) -> bool {
    let mut seen = HashSet::with_capacity(values.len());
    values.iter().all(|value| seen.insert(value))
}
