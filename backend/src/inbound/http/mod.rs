//! HTTP inbound adapter exposing REST endpoints and the RPC functions.

pub mod accounts;
pub mod announcements;
pub mod auth;
pub mod availability;
pub mod bikes;
pub mod error;
pub mod functions;
pub mod health;
pub mod price_list;
pub mod registrations;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod tv;
pub mod validation;

use actix_web::web;
use tracing::debug;

use crate::domain::Error;

pub use error::ApiResult;

/// Register every `/api/v1` endpoint.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(accounts::configure)
            .configure(announcements::configure)
            .configure(availability::configure)
            .configure(bikes::configure)
            .configure(price_list::configure)
            .configure(registrations::configure)
            .configure(tv::configure),
    );
}

/// JSON body extractor settings reporting malformed payloads as `400`
/// with the shared error payload.
#[must_use]
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        debug!(error = %err, "rejected malformed JSON body");
        Error::invalid_request(format!("malformed request body: {err}")).into()
    })
}

/// Query string extractor settings, same shape as [`json_config`].
#[must_use]
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        debug!(error = %err, "rejected malformed query string");
        Error::invalid_request(format!("malformed query string: {err}")).into()
    })
}
