//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::http::header::AUTHORIZATION;

use crate::domain::ports::{
    MockAccountAdministration, MockAdminPromotion, MockAuthenticator, MockAvailabilitySchedule,
    MockBikeWorkflow, MockFrameNumberRecognition, MockPriceList, MockTableBoardQuery,
    MockTvAnnouncements,
};
use crate::domain::{AccessToken, Error, UserId};
use crate::inbound::http::state::HttpState;

/// Token accepted by [`state_for`]'s authenticator.
pub const VALID_TOKEN: &str = "valid-token";

/// `Authorization` header carrying `token`.
pub fn bearer(token: &str) -> (actix_web::http::header::HeaderName, String) {
    (AUTHORIZATION, format!("Bearer {token}"))
}

/// Authenticator resolving [`VALID_TOKEN`] to `caller` and rejecting others.
pub fn authenticator_for(caller: UserId) -> MockAuthenticator {
    let expected = AccessToken::new(VALID_TOKEN)
        .map(|token| token.digest())
        .expect("fixture token");
    let mut authenticator = MockAuthenticator::new();
    authenticator.expect_authenticate().returning(move |token| {
        if token.digest() == expected {
            Ok(caller)
        } else {
            Err(Error::unauthorized("invalid or expired token"))
        }
    });
    authenticator
}

/// State whose ports have no expectations beyond authentication.
///
/// Tests replace the ports they exercise with struct update syntax:
/// `HttpState { bikes: Arc::new(mock), ..state_for(caller) }`.
pub fn state_for(caller: UserId) -> HttpState {
    HttpState {
        authenticator: Arc::new(authenticator_for(caller)),
        promotion: Arc::new(MockAdminPromotion::new()),
        accounts: Arc::new(MockAccountAdministration::new()),
        bikes: Arc::new(MockBikeWorkflow::new()),
        price_list: Arc::new(MockPriceList::new()),
        availability: Arc::new(MockAvailabilitySchedule::new()),
        announcements: Arc::new(MockTvAnnouncements::new()),
        board: Arc::new(MockTableBoardQuery::new()),
        frame_numbers: Arc::new(MockFrameNumberRecognition::new()),
    }
}
