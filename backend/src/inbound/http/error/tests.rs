//! Tests for HTTP error mapping.

use super::*;
use crate::domain::Error;
use actix_web::ResponseError;
use actix_web::body::to_bytes;
use actix_web::http::StatusCode;
use rstest::{fixture, rstest};
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn expected_trace_id() -> String {
    TRACE_ID.to_owned()
}

#[rstest]
#[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
#[case(Error::unauthorized("no auth"), StatusCode::UNAUTHORIZED)]
#[case(Error::forbidden("denied"), StatusCode::FORBIDDEN)]
#[case(Error::not_found("missing"), StatusCode::NOT_FOUND)]
#[case(Error::conflict("taken"), StatusCode::CONFLICT)]
#[case(Error::too_many_requests("slow down"), StatusCode::TOO_MANY_REQUESTS)]
#[case(Error::service_unavailable("down"), StatusCode::SERVICE_UNAVAILABLE)]
#[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn status_code_matches_error_code(#[case] error: Error, #[case] status: StatusCode) {
    assert_eq!(ResponseError::status_code(&error), status);
}

async fn response_payload(error: &Error) -> (actix_web::http::header::HeaderMap, Error) {
    let response = ResponseError::error_response(error);
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body())
        .await
        .expect("reading response body succeeds");
    let payload = serde_json::from_slice(&bytes).expect("Error JSON deserialisation succeeds");
    (headers, payload)
}

#[rstest]
#[actix_web::test]
async fn internal_errors_are_redacted_but_keep_trace_id(expected_trace_id: String) {
    let error = Error::internal("connection string leaked")
        .with_trace_id(expected_trace_id.clone())
        .with_details(json!({ "secret": "x" }));

    let (headers, payload) = response_payload(&error).await;
    assert_eq!(
        headers
            .get(TRACE_ID_HEADER)
            .and_then(|value| value.to_str().ok()),
        Some(expected_trace_id.as_str())
    );
    assert_eq!(payload.code(), ErrorCode::InternalError);
    assert_eq!(payload.message(), "Internal server error");
    assert_eq!(payload.trace_id(), Some(expected_trace_id.as_str()));
    assert!(payload.details().is_none());
}

#[rstest]
#[actix_web::test]
async fn verification_failures_keep_remaining_attempts() {
    let error = Error::unauthorized("invalid admin password")
        .with_details(json!({ "remainingAttempts": 2 }));

    let (headers, payload) = response_payload(&error).await;
    assert!(headers.get(TRACE_ID_HEADER).is_none());
    assert!(headers.get(RETRY_AFTER).is_none());
    assert_eq!(
        headers.get(WWW_AUTHENTICATE).and_then(|value| value.to_str().ok()),
        Some("Bearer")
    );
    assert_eq!(payload.details(), Some(&json!({ "remainingAttempts": 2 })));
}

#[rstest]
#[actix_web::test]
async fn rate_limited_responses_carry_retry_after() {
    let error = Error::too_many_requests("too many attempts")
        .with_details(json!({ "remainingAttempts": 0, "retryAfterSeconds": 1800 }));

    let (headers, payload) = response_payload(&error).await;
    assert_eq!(
        headers.get(RETRY_AFTER).and_then(|value| value.to_str().ok()),
        Some("1800")
    );
    assert_eq!(payload.code(), ErrorCode::TooManyRequests);
}

#[test]
fn from_actix_error_is_redacted_internal_error() {
    use actix_web::error;

    let actix_err = error::ErrorBadRequest("boom");
    let err: Error = actix_err.into();

    assert_eq!(err.code(), ErrorCode::InternalError);
    assert_eq!(err.message(), "Internal server error");
    assert_eq!(err.details(), None);
}
