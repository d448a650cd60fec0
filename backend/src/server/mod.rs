//! Server construction and middleware wiring.

mod config;

pub use config::ServerSettings;

use std::sync::Arc;
use std::time::Duration;

use actix_web::body::MessageBody;
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::middleware::from_fn;
use actix_web::{App, HttpServer, web};
use mockable::{Clock, DefaultClock};
use tracing::info;

use greenlight::domain::ports::FixtureMovieRepository;
use greenlight::inbound::http::routes::configure;
use greenlight::inbound::http::state::HttpState;
use greenlight::middleware::trace_requests;

const KEEP_ALIVE: Duration = Duration::from_secs(60);
const CLIENT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Build handler state from validated settings using the system clock.
pub fn build_http_state(settings: &ServerSettings) -> HttpState {
    let clock: Arc<dyn Clock + Send + Sync> = Arc::new(DefaultClock);
    HttpState::new(Arc::new(FixtureMovieRepository::new(clock.clone())), clock)
        .with_max_body_bytes(settings.max_body_bytes())
        .with_environment(settings.environment())
}

fn build_app(
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(http_state)
        .wrap(from_fn(trace_requests))
        .configure(configure)
}

/// Construct an Actix HTTP server for the given settings.
///
/// # Returns
/// A [`Server`] that must be awaited to drive the listener.
///
/// # Errors
/// Returns [`std::io::Error`] when the settings are unusable or binding the
/// socket fails.
pub fn create_server(settings: &ServerSettings) -> std::io::Result<Server> {
    settings.validate().map_err(std::io::Error::other)?;
    let http_state = web::Data::new(build_http_state(settings));
    let bind_addr = settings.bind_addr();

    let server = HttpServer::new(move || build_app(http_state.clone()))
        .keep_alive(KEEP_ALIVE)
        .client_request_timeout(CLIENT_REQUEST_TIMEOUT)
        .bind(bind_addr)?
        .run();

    info!(
        addr = %bind_addr,
        env = settings.environment(),
        "starting server"
    );
    Ok(server)
}
