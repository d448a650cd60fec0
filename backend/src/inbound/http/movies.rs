//! Movie endpoints.
//!
//! ```text
//! POST /v1/movies       create a movie from a strict JSON body
//! GET  /v1/movies/{id}  fetch a movie by positive integer id
//! ```

use actix_web::http::StatusCode;
use actix_web::http::header::{self, HeaderMap, HeaderValue};
use actix_web::{HttpResponse, web};
use chrono::Datelike;
use serde::Deserialize;

use super::envelope::{Envelope, respond};
use super::error::{ApiError, ApiResult};
use super::json::read_json;
use super::state::HttpState;
use crate::domain::{MovieDraft, MovieId, Runtime, Validator, validate_movie};

/// Request body for creating a movie.
///
/// Absent fields take their zero values so validation, not decoding, reports
/// them as missing. Keys outside this list are rejected while decoding.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateMovieRequest {
    pub title: String,
    pub year: i32,
    pub runtime: Runtime,
    pub genres: Option<Vec<String>>,
}

impl From<CreateMovieRequest> for MovieDraft {
    fn from(request: CreateMovieRequest) -> Self {
        let CreateMovieRequest {
            title,
            year,
            runtime,
            genres,
        } = request;
        Self {
            title,
            year,
            runtime,
            genres,
        }
    }
}

/// Create a movie.
///
/// Responds 201 with the stored movie and a `Location` header, 400 when the
/// body cannot be decoded, or 422 with one message per failing field.
pub async fn create_movie(
    state: web::Data<HttpState>,
    payload: web::Payload,
) -> ApiResult<HttpResponse> {
    let request: CreateMovieRequest = read_json(payload, state.max_body_bytes).await?;
    let draft = MovieDraft::from(request);

    let mut v = Validator::new();
    validate_movie(&mut v, &draft, state.clock.utc().year());
    if !v.valid() {
        return Err(ApiError::from(v));
    }

    let movie = state.movies.insert(draft).await?;

    let mut headers = HeaderMap::new();
    let location = HeaderValue::try_from(format!("/v1/movies/{}", movie.id))
        .map_err(|err| ApiError::internal(format!("invalid location header: {err}")))?;
    headers.insert(header::LOCATION, location);

    Ok(respond(
        StatusCode::CREATED,
        &Envelope::new("movie", &movie),
        &headers,
    ))
}

/// Fetch a movie by id.
///
/// Ids that are not positive integers are treated as unknown resources.
pub async fn show_movie(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id: MovieId = path.parse().map_err(|_| ApiError::NotFound)?;
    let movie = state.movies.find(id).await?.ok_or(ApiError::NotFound)?;
    Ok(respond(
        StatusCode::OK,
        &Envelope::new("movie", &movie),
        &HeaderMap::new(),
    ))
}
