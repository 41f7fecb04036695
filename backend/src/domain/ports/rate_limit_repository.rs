//! Port for the privileged-attempt counters.
//!
//! Adapters must make [`RateLimitRepository::try_acquire`] atomic per key:
//! two concurrent callers may never both observe the same attempt count.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{RateLimitKey, RateLimitPolicy, SlotAcquisition};

use super::define_port_error;

define_port_error! {
    /// Errors raised by rate-limit storage adapters.
    pub enum RateLimitRepositoryError {
        /// Storage could not be reached.
        Connection { message: String } =>
            "rate limit repository connection failed: {message}",
        /// Statement failed during execution.
        Query { message: String } =>
            "rate limit repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RateLimitRepository: Send + Sync {
    /// Consume one attempt slot for `key`, opening a new window when none is
    /// open at `now`.
    async fn try_acquire(
        &self,
        key: &RateLimitKey,
        policy: RateLimitPolicy,
        now: DateTime<Utc>,
    ) -> Result<SlotAcquisition, RateLimitRepositoryError>;

    /// Forget every attempt recorded for `key`.
    async fn reset(&self, key: &RateLimitKey) -> Result<(), RateLimitRepositoryError>;
}
