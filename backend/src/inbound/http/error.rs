//! HTTP adapter mapping for request and domain failures.
//!
//! Purpose: give every handler one error type that Actix renders as an
//! `{"error": ...}` envelope with the matching status code. Client errors
//! carry their message verbatim; internal failures are logged and replaced
//! with a generic message.

use actix_web::http::header::HeaderMap;
use actix_web::http::{Method, StatusCode};
use actix_web::{HttpRequest, HttpResponse, ResponseError};
use serde::Serialize;
use tracing::error;

use super::envelope::{Envelope, SERVER_ERROR_MESSAGE, respond};
use super::json::DecodeError;
use crate::domain::{Error, ErrorCode, FieldErrors, Validator};
use crate::middleware::trace::TraceId;

/// Message sent for unknown resources.
pub const NOT_FOUND_MESSAGE: &str = "the requested resource could not be found.";

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Failures a handler can report to the client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The request body could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("{}", NOT_FOUND_MESSAGE)]
    NotFound,
    #[error("the {0} method is not supported for this resource.")]
    MethodNotAllowed(Method),
    /// One message per failing field.
    #[error("validation failed")]
    FailedValidation(FieldErrors),
    /// Unexpected failure; `cause` is for operators only.
    #[error("{}", SERVER_ERROR_MESSAGE)]
    Internal { cause: String },
}

impl ApiError {
    /// Wrap an unexpected failure, keeping its description for the logs.
    pub fn internal(cause: impl Into<String>) -> Self {
        Self::Internal {
            cause: cause.into(),
        }
    }
}

impl From<Validator> for ApiError {
    fn from(validator: Validator) -> Self {
        Self::FailedValidation(validator.into_errors())
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err.code() {
            ErrorCode::NotFound => Self::NotFound,
            ErrorCode::InternalError => Self::internal(err.message()),
        }
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum ErrorBody<'a> {
    Message(String),
    Fields(&'a FieldErrors),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Decode(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::FailedValidation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            Self::FailedValidation(fields) => ErrorBody::Fields(fields),
            Self::Internal { cause } => {
                error!(
                    cause = %cause,
                    trace_id = ?TraceId::current().map(|id| id.to_string()),
                    "internal failure while handling request"
                );
                ErrorBody::Message(self.to_string())
            }
            other => ErrorBody::Message(other.to_string()),
        };
        respond(
            self.status_code(),
            &Envelope::new("error", &body),
            &HeaderMap::new(),
        )
    }
}

/// Fallback handler for paths no route matches.
pub async fn not_found() -> ApiResult<HttpResponse> {
    Err(ApiError::NotFound)
}

/// Fallback handler for known paths requested with an unsupported method.
pub async fn method_not_allowed(req: HttpRequest) -> ApiResult<HttpResponse> {
    Err(ApiError::MethodNotAllowed(req.method().clone()))
}

#[cfg(test)]
mod tests;
