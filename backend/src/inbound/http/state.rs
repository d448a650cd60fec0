//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports and remain testable without I/O.

use std::sync::Arc;

use mockable::Clock;

use super::json::DEFAULT_MAX_BODY_BYTES;
use crate::domain::ports::MovieRepository;

/// Environment name reported when none is configured.
pub const DEFAULT_ENVIRONMENT: &str = "development";

/// Port implementations and request limits shared by HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Movie storage.
    pub movies: Arc<dyn MovieRepository>,
    /// Source of the current time for date-relative validation.
    pub clock: Arc<dyn Clock + Send + Sync>,
    /// Largest request body accepted, in bytes.
    pub max_body_bytes: usize,
    /// Deployment environment reported by the health check.
    pub environment: String,
}

impl HttpState {
    /// Construct state with the default body cap and environment.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use greenlight::domain::ports::FixtureMovieRepository;
    /// use greenlight::inbound::http::state::HttpState;
    /// use mockable::DefaultClock;
    ///
    /// let clock = Arc::new(DefaultClock);
    /// let state = HttpState::new(Arc::new(FixtureMovieRepository::new(clock.clone())), clock)
    ///     .with_max_body_bytes(4096)
    ///     .with_environment("staging");
    /// assert_eq!(state.max_body_bytes, 4096);
    /// ```
    pub fn new(movies: Arc<dyn MovieRepository>, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self {
            movies,
            clock,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            environment: DEFAULT_ENVIRONMENT.to_owned(),
        }
    }

    /// Override the request body cap.
    #[must_use]
    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    /// Override the reported environment.
    #[must_use]
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }
}
