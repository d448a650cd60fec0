//! Strict JSON request decoding and deterministic response encoding.
//!
//! Request bodies are read under a byte cap, parsed as exactly one JSON value,
//! and mapped onto the destination type with undeclared keys rejected. Every
//! failure lands in one [`DecodeError`] variant whose `Display` output is the
//! message shown to clients.
//!
//! Destinations are type parameters bounded by [`DeserializeOwned`], so a
//! destination that cannot be decoded into is a compile error rather than a
//! run-time condition.

mod shape;

use std::fmt;

use actix_web::web::{Bytes, BytesMut};
use futures_util::{Stream, StreamExt};
use serde::Serialize;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde_json::Value;
use serde_json::error::Category;
use serde_json::ser::PrettyFormatter;

use self::shape::{Node, ShapeError};

/// Default request body cap in bytes.
pub const DEFAULT_MAX_BODY_BYTES: usize = 1_048_576;

/// Indentation applied to response bodies.
pub const INDENT: &[u8] = b"\t";

/// Where a JSON type mismatch was detected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MismatchLocation {
    /// Dotted path of the destination field.
    Field(String),
    /// Byte offset into the body, used when no field applies.
    Offset(usize),
}

impl fmt::Display for MismatchLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(field) => write!(f, "for field \"{field}\""),
            Self::Offset(offset) => write!(f, "(at character {offset})"),
        }
    }
}

/// Client-facing request body failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Malformed JSON at the given byte offset.
    #[error("body contains badly-formed JSON (at character {offset})")]
    Syntax { offset: usize },
    /// The body ended in the middle of a value.
    #[error("body contains badly-formed JSON")]
    UnexpectedEof,
    /// A value had the wrong JSON type for its destination.
    #[error("body contains incorrect JSON type {0}")]
    TypeMismatch(MismatchLocation),
    /// The body was empty or whitespace.
    #[error("body must not be empty")]
    EmptyBody,
    /// The body named a key the destination does not declare.
    #[error("body contains unknown key \"{field}\"")]
    UnknownField { field: String },
    /// The body exceeded the configured cap.
    #[error("body must not be larger than {limit} bytes")]
    BodyTooLarge { limit: usize },
    /// Content followed the first JSON value.
    #[error("body must only contain a single JSON value")]
    MultipleValues,
    /// A runtime was not a `"<minutes> mins"` string.
    #[error("invalid runtime format")]
    InvalidRuntimeFormat,
    /// Any other failure, carrying the underlying message.
    #[error("{message}")]
    Failed { message: String },
}

/// Collect a request payload, failing as soon as it grows past `limit` bytes.
///
/// # Errors
/// Returns [`DecodeError::BodyTooLarge`] once the cap is exceeded and
/// [`DecodeError::Failed`] if the underlying stream errors.
pub async fn read_body<S, E>(mut payload: S, limit: usize) -> Result<Bytes, DecodeError>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: fmt::Display,
{
    let mut body = BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|error| DecodeError::Failed {
            message: error.to_string(),
        })?;
        if body.len().saturating_add(chunk.len()) > limit {
            return Err(DecodeError::BodyTooLarge { limit });
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body.freeze())
}

/// Strictly decode exactly one JSON value from `body` into `T`.
///
/// # Examples
/// ```
/// use greenlight::inbound::http::json::{DEFAULT_MAX_BODY_BYTES, DecodeError, decode};
///
/// #[derive(serde::Deserialize)]
/// struct Probe {
///     name: String,
/// }
///
/// let probe: Probe = decode(br#"{"name":"ok"}"#, DEFAULT_MAX_BODY_BYTES).expect("decodes");
/// assert_eq!(probe.name, "ok");
///
/// let err = decode::<Probe>(br#"{"name":"a"}{}"#, DEFAULT_MAX_BODY_BYTES).err();
/// assert_eq!(err, Some(DecodeError::MultipleValues));
/// ```
///
/// # Errors
/// Returns the [`DecodeError`] variant describing the first problem found.
pub fn decode<T: DeserializeOwned>(body: &[u8], limit: usize) -> Result<T, DecodeError> {
    if body.len() > limit {
        return Err(DecodeError::BodyTooLarge { limit });
    }

    let mut values = serde_json::Deserializer::from_slice(body).into_iter::<Value>();
    let value = match values.next() {
        None => return Err(DecodeError::EmptyBody),
        Some(Err(error)) => return Err(parse_error(body, &error)),
        Some(Ok(value)) => value,
    };
    let consumed = values.byte_offset();

    let decoded = T::deserialize(Node(value)).map_err(|error| shape_error(error, consumed))?;
    ensure_end_of_input(body.get(consumed..).unwrap_or_default())?;
    Ok(decoded)
}

/// Read a capped payload and strictly decode it into `T`.
///
/// # Errors
/// See [`read_body`] and [`decode`].
pub async fn read_json<T, S, E>(payload: S, limit: usize) -> Result<T, DecodeError>
where
    T: DeserializeOwned,
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: fmt::Display,
{
    let body = read_body(payload, limit).await?;
    decode(&body, limit)
}

/// Serialise `value` fully into memory with the given indentation and a
/// trailing newline.
///
/// # Errors
/// Propagates serialisation failures; nothing is produced on error.
pub fn encode<T: Serialize + ?Sized>(value: &T, indent: &[u8]) -> Result<Vec<u8>, serde_json::Error> {
    let mut buffer = Vec::with_capacity(256);
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(indent));
    value.serialize(&mut serializer)?;
    buffer.push(b'\n');
    Ok(buffer)
}

fn ensure_end_of_input(rest: &[u8]) -> Result<(), DecodeError> {
    let mut trailing = serde_json::Deserializer::from_slice(rest).into_iter::<IgnoredAny>();
    match trailing.next() {
        None => Ok(()),
        Some(_) => Err(DecodeError::MultipleValues),
    }
}

fn parse_error(body: &[u8], error: &serde_json::Error) -> DecodeError {
    match error.classify() {
        Category::Syntax => DecodeError::Syntax {
            offset: byte_offset(body, error.line(), error.column()),
        },
        Category::Eof => DecodeError::UnexpectedEof,
        Category::Data | Category::Io => DecodeError::Failed {
            message: error.to_string(),
        },
    }
}

fn shape_error(error: ShapeError, consumed: usize) -> DecodeError {
    match error {
        ShapeError::TypeMismatch { path } if path.is_empty() => {
            DecodeError::TypeMismatch(MismatchLocation::Offset(consumed))
        }
        ShapeError::TypeMismatch { path } => {
            DecodeError::TypeMismatch(MismatchLocation::Field(path.join(".")))
        }
        ShapeError::UnknownField(field) => DecodeError::UnknownField { field },
        ShapeError::InvalidRuntimeFormat => DecodeError::InvalidRuntimeFormat,
        ShapeError::Other(message) => DecodeError::Failed { message },
    }
}

/// Convert a one-based line and column into a byte offset.
fn byte_offset(body: &[u8], line: usize, column: usize) -> usize {
    let preceding: usize = body
        .split_inclusive(|byte| *byte == b'\n')
        .take(line.saturating_sub(1))
        .map(<[u8]>::len)
        .sum();
    preceding.saturating_add(column)
}
