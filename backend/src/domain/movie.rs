//! Movie entity and its validation rules.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::runtime::Runtime;
use super::validator::{Validator, unique};

/// Earliest plausible release year is the year after this one.
pub const FIRST_FILM_YEAR: i32 = 1888;
/// Maximum title length in bytes.
pub const MAX_TITLE_BYTES: usize = 500;
/// Maximum number of genres per movie.
pub const MAX_GENRES: usize = 5;

/// Raised when an identifier is not a positive integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid id parameter")]
pub struct InvalidMovieId;

/// Positive movie identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct MovieId(i64);

impl MovieId {
    /// Validate and wrap a raw identifier.
    ///
    /// # Errors
    /// Returns [`InvalidMovieId`] when `raw` is below one.
    pub const fn new(raw: i64) -> Result<Self, InvalidMovieId> {
        if raw < 1 {
            return Err(InvalidMovieId);
        }
        Ok(Self(raw))
    }

    /// Raw identifier value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl FromStr for MovieId {
    type Err = InvalidMovieId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.parse::<i64>().map_err(|_| InvalidMovieId)?;
        Self::new(raw)
    }
}

impl fmt::Display for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Client-suppliable movie fields, prior to validation.
///
/// `genres` is `None` when the client omitted the list or sent `null`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MovieDraft {
    pub title: String,
    pub year: i32,
    pub runtime: Runtime,
    pub genres: Option<Vec<String>>,
}

/// A movie record.
///
/// ## Invariants
/// - Instances reaching serialisation were built from a [`MovieDraft`] that
///   passed [`validate_movie`], or by trusted fixtures obeying the same rules.
/// - `created_at` is server-assigned and never serialised.
/// - `version` starts at 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Movie {
    pub id: MovieId,
    #[serde(skip)]
    pub created_at: DateTime<Utc>,
    pub title: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub year: i32,
    #[serde(skip_serializing_if = "Runtime::is_zero")]
    pub runtime: Runtime,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub genres: Vec<String>,
    pub version: i32,
}

impl Movie {
    /// Build a first-version movie from a validated draft.
    #[must_use]
    pub fn from_draft(id: MovieId, created_at: DateTime<Utc>, draft: MovieDraft) -> Self {
        let MovieDraft {
            title,
            year,
            runtime,
            genres,
        } = draft;
        Self {
            id,
            created_at,
            title,
            year,
            runtime,
            genres: genres.unwrap_or_default(),
            version: 1,
        }
    }
}

const fn is_zero(value: &i32) -> bool {
    *value == 0
}

/// Apply the movie rule set to `movie`, recording failures in `v`.
///
/// Checks on the same field are ordered so the most basic failure is the one
/// reported.
pub fn validate_movie(v: &mut Validator, movie: &MovieDraft, current_year: i32) {
    v.check(!movie.title.is_empty(), "title", "must be provided");
    v.check(
        movie.title.len() <= MAX_TITLE_BYTES,
        "title",
        format!("must not be more than {MAX_TITLE_BYTES} bytes long"),
    );

    v.check(movie.year != 0, "year", "must be provided");
    v.check(
        movie.year > FIRST_FILM_YEAR,
        "year",
        format!("must be greater than {FIRST_FILM_YEAR}"),
    );
    v.check(movie.year <= current_year, "year", "must not be in the future");

    v.check(!movie.runtime.is_zero(), "runtime", "must be provided");
    v.check(
        movie.runtime.minutes() > 0,
        "runtime",
        "must be a positive integer",
    );

    let genres = movie.genres.as_deref();
    v.check(genres.is_some(), "genres", "must be provided");
    let genres = genres.unwrap_or_default();
    v.check(!genres.is_empty(), "genres", "must contain one or more genres");
    v.check(
        genres.len() <= MAX_GENRES,
        "genres",
        format!("must not contain more than {MAX_GENRES} genres"),
    );
    v.check(unique(genres), "genres", "must not contain duplicate values");
}
