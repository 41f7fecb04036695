//! Driving port resolving bearer tokens.

use async_trait::async_trait;

use crate::domain::{AccessToken, Error, UserId};

/// Turns a presented bearer token into the user it belongs to.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Fails with `401` when the token is unknown or expired.
    async fn authenticate(&self, token: &AccessToken) -> Result<UserId, Error>;
}
