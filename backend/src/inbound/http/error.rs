//! [`ResponseError`] for the domain [`Error`].
//!
//! Status codes follow the error code. Besides the JSON body the response
//! carries `trace-id` when known, `Retry-After` on an exhausted promotion
//! budget and `WWW-Authenticate: Bearer` on `401`. Internal errors are
//! logged here with their full message and returned redacted.

use actix_web::http::header::{HeaderValue, RETRY_AFTER, WWW_AUTHENTICATE};
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, HttpResponseBuilder, ResponseError};
use tracing::error;

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Result type returned by every handler.
pub type ApiResult<T> = Result<T, Error>;

const REDACTED: &str = "Internal server error";

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self.code() {
            ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut response = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            response.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        match self.code() {
            ErrorCode::InternalError => {
                error!(trace_id = self.trace_id(), message = self.message(), "internal error");
                return response.json(redacted(self));
            }
            ErrorCode::Unauthorized => {
                response.insert_header((WWW_AUTHENTICATE, HeaderValue::from_static("Bearer")));
            }
            ErrorCode::TooManyRequests => retry_after(&mut response, self),
            _ => {}
        }
        response.json(self)
    }
}

fn redacted(error: &Error) -> Error {
    match error.trace_id() {
        Some(id) => Error::internal(REDACTED).with_trace_id(id.to_owned()),
        None => Error::internal(REDACTED),
    }
}

fn retry_after(response: &mut HttpResponseBuilder, error: &Error) {
    let seconds = error
        .details()
        .and_then(|details| details.get("retryAfterSeconds"))
        .and_then(serde_json::Value::as_i64);
    if let Some(seconds) = seconds {
        response.insert_header((RETRY_AFTER, seconds.max(0).to_string()));
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "framework error surfaced as internal error");
        Self::internal(REDACTED)
    }
}

#[cfg(test)]
mod tests;
