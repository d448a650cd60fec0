//! Driven port for movie storage.
//!
//! HTTP handlers reach movies only through this port. No persistence engine
//! backs it yet; [`FixtureMovieRepository`] stands in with deterministic data
//! so the request pipeline can be exercised end to end.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;

use crate::domain::{Error, Movie, MovieDraft, MovieId, Runtime};

/// Storage operations for movies.
#[async_trait]
pub trait MovieRepository: Send + Sync {
    /// Store a validated draft, returning the created record.
    async fn insert(&self, draft: MovieDraft) -> Result<Movie, Error>;

    /// Look up a movie by identifier.
    async fn find(&self, id: MovieId) -> Result<Option<Movie>, Error>;
}

/// Temporary fixture repository used until persistence is wired.
///
/// Inserts are echoed back with the first identifier and version 1; lookups
/// return the same hardcoded film under whichever identifier was asked for.
#[derive(Clone)]
pub struct FixtureMovieRepository {
    clock: Arc<dyn Clock + Send + Sync>,
}

impl FixtureMovieRepository {
    /// Create a fixture stamping records with `clock`.
    pub fn new(clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self { clock }
    }
}

#[async_trait]
impl MovieRepository for FixtureMovieRepository {
    async fn insert(&self, draft: MovieDraft) -> Result<Movie, Error> {
        let id = MovieId::new(1)
            .map_err(|err| Error::internal(format!("invalid fixture movie id: {err}")))?;
        Ok(Movie::from_draft(id, self.clock.utc(), draft))
    }

    async fn find(&self, id: MovieId) -> Result<Option<Movie>, Error> {
        Ok(Some(Movie {
            id,
            created_at: self.clock.utc(),
            title: "Casablanca".to_owned(),
            year: 1942,
            runtime: Runtime::new(102),
            genres: vec!["drama".to_owned(), "romance".to_owned(), "war".to_owned()],
            version: 1,
        }))
    }
}
