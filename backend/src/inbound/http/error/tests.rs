//! Tests for HTTP error mapping.

use super::*;
use actix_web::body::to_bytes;
use actix_web::http::header;
use actix_web::{App, test as actix_test, web};
use rstest::rstest;
use serde_json::{Value, json};

async fn error_body(error: &ApiError) -> Value {
    let response = ResponseError::error_response(error);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).map(|v| v.as_bytes()),
        Some(&b"application/json"[..])
    );
    let bytes = to_bytes(response.into_body())
        .await
        .expect("reading response body succeeds");
    serde_json::from_slice(&bytes).expect("error body is JSON")
}

#[rstest]
#[case(ApiError::Decode(DecodeError::EmptyBody), StatusCode::BAD_REQUEST)]
#[case(ApiError::NotFound, StatusCode::NOT_FOUND)]
#[case(ApiError::MethodNotAllowed(Method::PUT), StatusCode::METHOD_NOT_ALLOWED)]
#[case(ApiError::FailedValidation(FieldErrors::new()), StatusCode::UNPROCESSABLE_ENTITY)]
#[case(ApiError::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn status_code_matches_variant(#[case] error: ApiError, #[case] expected: StatusCode) {
    assert_eq!(ResponseError::status_code(&error), expected);
}

#[rstest]
#[case(
    ApiError::Decode(DecodeError::UnknownField { field: "director".to_owned() }),
    "body contains unknown key \"director\""
)]
#[case(ApiError::NotFound, "the requested resource could not be found.")]
#[case(
    ApiError::MethodNotAllowed(Method::DELETE),
    "the DELETE method is not supported for this resource."
)]
#[actix_web::test]
async fn client_errors_carry_their_message(#[case] error: ApiError, #[case] expected: &str) {
    assert_eq!(error_body(&error).await, json!({ "error": expected }));
}

#[rstest]
#[actix_web::test]
async fn validation_failures_expose_the_field_map() {
    let mut v = Validator::new();
    v.check(false, "title", "must be provided");
    v.check(false, "year", "must be provided");

    let body = error_body(&ApiError::from(v)).await;

    assert_eq!(
        body,
        json!({ "error": { "title": "must be provided", "year": "must be provided" } })
    );
}

#[rstest]
#[actix_web::test]
async fn internal_causes_are_redacted() {
    let body = error_body(&ApiError::internal("connection refused: db:5432")).await;
    assert_eq!(body, json!({ "error": SERVER_ERROR_MESSAGE }));
}

#[rstest]
#[case(Error::not_found("movie 7"), ApiError::NotFound)]
#[case(Error::internal("pool closed"), ApiError::internal("pool closed"))]
fn domain_errors_map_by_code(#[case] error: Error, #[case] expected: ApiError) {
    assert_eq!(ApiError::from(error), expected);
}

#[rstest]
#[actix_web::test]
async fn fallback_handlers_render_not_found_and_method_not_allowed() {
    let app = actix_test::init_service(
        App::new()
            .service(
                web::resource("/only-get")
                    .route(web::get().to(|| async { HttpResponse::Ok().finish() }))
                    .default_service(web::route().to(method_not_allowed)),
            )
            .default_service(web::route().to(not_found)),
    )
    .await;

    let missing = actix_test::call_service(&app, actix_test::TestRequest::get().uri("/nope").to_request()).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let wrong_method =
        actix_test::call_service(&app, actix_test::TestRequest::patch().uri("/only-get").to_request()).await;
    assert_eq!(wrong_method.status(), StatusCode::METHOD_NOT_ALLOWED);
    let body: Value = actix_test::read_body_json(wrong_method).await;
    assert_eq!(
        body,
        json!({ "error": "the PATCH method is not supported for this resource." })
    );
}
