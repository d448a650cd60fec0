//! JSON response writer.
//!
//! Every response body is a single-key object, for example `{"movie": {...}}`
//! or `{"error": "..."}`. Bodies are encoded fully before anything is sent,
//! so an encoding failure never leaves a half-written response behind.

use actix_web::http::StatusCode;
use actix_web::http::header::{ContentType, HeaderMap};
use actix_web::HttpResponse;
use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::error;

use super::json::{INDENT, encode};
use crate::middleware::trace::TraceId;

/// Message sent when a response cannot be produced.
pub const SERVER_ERROR_MESSAGE: &str =
    "the server encountered a problem and could not process your request.";

/// Single-key wrapper naming the payload it carries.
///
/// # Examples
/// ```
/// use greenlight::inbound::http::envelope::Envelope;
///
/// let body = serde_json::to_string(&Envelope::new("status", "available")).expect("encodes");
/// assert_eq!(body, r#"{"status":"available"}"#);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Envelope<'a, T: ?Sized> {
    name: &'a str,
    payload: &'a T,
}

impl<'a, T: ?Sized> Envelope<'a, T> {
    /// Wrap `payload` under the key `name`.
    pub const fn new(name: &'a str, payload: &'a T) -> Self {
        Self { name, payload }
    }
}

impl<T: Serialize + ?Sized> Serialize for Envelope<'_, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.name, self.payload)?;
        map.end()
    }
}

/// Build a JSON response from `body`, applying `headers` before the status.
///
/// # Errors
/// Returns the serialisation failure untouched; no response is built.
pub fn write_json<T: Serialize + ?Sized>(
    status: StatusCode,
    body: &T,
    headers: &HeaderMap,
) -> Result<HttpResponse, serde_json::Error> {
    let bytes = encode(body, INDENT)?;
    let mut builder = HttpResponse::build(status);
    for (name, value) in headers {
        builder.append_header((name.clone(), value.clone()));
    }
    builder.insert_header(ContentType::json());
    Ok(builder.body(bytes))
}

/// Like [`write_json`], but falls back to a generic 500 response when the
/// body cannot be encoded.
pub fn respond<T: Serialize + ?Sized>(
    status: StatusCode,
    body: &T,
    headers: &HeaderMap,
) -> HttpResponse {
    match write_json(status, body, headers) {
        Ok(response) => response,
        Err(err) => {
            error!(
                error = %err,
                status = status.as_u16(),
                trace_id = ?TraceId::current().map(|id| id.to_string()),
                "failed to encode response body"
            );
            server_error()
        }
    }
}

fn server_error() -> HttpResponse {
    let status = StatusCode::INTERNAL_SERVER_ERROR;
    write_json(
        status,
        &Envelope::new("error", SERVER_ERROR_MESSAGE),
        &HeaderMap::new(),
    )
    .unwrap_or_else(|_| HttpResponse::build(status).finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use actix_web::http::header::{self, HeaderName, HeaderValue};
    use rstest::rstest;
    use serde::ser::Error as _;

    struct Unencodable;

    impl Serialize for Unencodable {
        fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("cannot encode"))
        }
    }

    async fn body_text(response: HttpResponse) -> String {
        let bytes = to_bytes(response.into_body())
            .await
            .expect("reading response body succeeds");
        String::from_utf8(bytes.to_vec()).expect("utf8 body")
    }

    #[rstest]
    #[actix_web::test]
    async fn writes_status_headers_and_tab_indented_body() {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("location"),
            HeaderValue::from_static("/v1/movies/1"),
        );

        let response = write_json(
            StatusCode::CREATED,
            &Envelope::new("movie", &serde_json::json!({ "id": 1 })),
            &headers,
        )
        .expect("encodes");

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            response.headers().get(header::LOCATION),
            Some(&HeaderValue::from_static("/v1/movies/1"))
        );
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE),
            Some(&HeaderValue::from_static("application/json"))
        );
        assert_eq!(
            body_text(response).await,
            "{\n\t\"movie\": {\n\t\t\"id\": 1\n\t}\n}\n"
        );
    }

    #[rstest]
    fn encoding_failures_are_returned() {
        let result = write_json(StatusCode::OK, &Unencodable, &HeaderMap::new());
        assert!(result.is_err());
    }

    #[rstest]
    #[actix_web::test]
    async fn respond_falls_back_to_a_generic_server_error() {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("location"),
            HeaderValue::from_static("/v1/movies/1"),
        );

        let response = respond(StatusCode::CREATED, &Unencodable, &headers);

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.headers().get(header::LOCATION).is_none());
        let body: serde_json::Value =
            serde_json::from_str(&body_text(response).await).expect("json body");
        assert_eq!(body, serde_json::json!({ "error": SERVER_ERROR_MESSAGE }));
    }
}
