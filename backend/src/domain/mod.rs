//! Domain primitives and aggregates.
//!
//! Purpose: define transport-agnostic types used by the HTTP adapter. Keep
//! types immutable where possible and document invariants and serialisation
//! contracts (serde) in each type's Rustdoc.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure and its category.
//! - Movie / MovieDraft / MovieId: the movie resource and its inputs.
//! - Runtime: minute count with the `"<n> mins"` wire form.
//! - Validator: first-failure-per-field accumulator.

pub mod error;
pub mod movie;
pub mod ports;
pub mod runtime;
pub mod validator;

pub use self::error::{Error, ErrorCode};
pub use self::movie::{InvalidMovieId, Movie, MovieDraft, MovieId, validate_movie};
pub use self::runtime::{INVALID_RUNTIME_FORMAT, Runtime, RuntimeFormatError};
pub use self::validator::{FieldErrors, Validator, permitted_value, unique};
