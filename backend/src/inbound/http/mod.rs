//! HTTP inbound adapter exposing the JSON API.

pub mod envelope;
pub mod error;
pub mod health;
pub mod json;
pub mod movies;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
