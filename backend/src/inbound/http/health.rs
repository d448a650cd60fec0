//! Health check endpoint reporting availability and build information.

use actix_web::http::StatusCode;
use actix_web::http::header::HeaderMap;
use actix_web::{HttpResponse, web};
use serde::Serialize;

use super::envelope::respond;
use super::state::HttpState;

/// Crate version baked in at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Serialize)]
struct SystemInfo<'a> {
    environment: &'a str,
    version: &'a str,
}

#[derive(Debug, Serialize)]
struct Health<'a> {
    status: &'a str,
    system_info: SystemInfo<'a>,
}

/// Report that the service is available.
pub async fn healthcheck(state: web::Data<HttpState>) -> HttpResponse {
    let health = Health {
        status: "available",
        system_info: SystemInfo {
            environment: &state.environment,
            version: VERSION,
        },
    };
    respond(StatusCode::OK, &health, &HeaderMap::new())
}
