//! Ports towards the identity provider.
//!
//! Staff sign in elsewhere; this service only needs to map a bearer token to
//! a user and, for account deletion, remove the identity record.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{TokenDigest, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by identity adapters.
    pub enum IdentityError {
        Connection { message: String } =>
            "identity store connection failed: {message}",
        Query { message: String } =>
            "identity store query failed: {message}",
    }
}

/// Resolves bearer token digests to users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// User owning a token that is still valid at `now`.
    async fn resolve(
        &self,
        digest: &TokenDigest,
        now: DateTime<Utc>,
    ) -> Result<Option<UserId>, IdentityError>;
}

/// Administrative operations on identity records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityDirectory: Send + Sync {
    /// Remove the identity record and revoke its tokens. Deleting an unknown
    /// user succeeds.
    async fn delete_identity(&self, user_id: &UserId) -> Result<(), IdentityError>;
}
