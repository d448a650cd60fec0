//! Route table for the HTTP adapter.
//!
//! Each path is registered as a resource so that a request with a known path
//! but an unsupported method gets a 405 rather than a 404.

use actix_web::web;

use super::error::{method_not_allowed, not_found};
use super::health::healthcheck;
use super::movies::{create_movie, show_movie};

/// Register every endpoint plus the 404 and 405 fallbacks.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use greenlight::inbound::http::routes::configure;
///
/// let _app = App::new().configure(configure);
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/v1/healthcheck")
            .route(web::get().to(healthcheck))
            .default_service(web::route().to(method_not_allowed)),
    )
    .service(
        web::resource("/v1/movies")
            .route(web::post().to(create_movie))
            .default_service(web::route().to(method_not_allowed)),
    )
    .service(
        web::resource("/v1/movies/{id}")
            .route(web::get().to(show_movie))
            .default_service(web::route().to(method_not_allowed)),
    )
    .default_service(web::route().to(not_found));
}
