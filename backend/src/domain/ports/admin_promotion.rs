//! Driving port for password-gated admin promotion.
//!
//! Both operations share one attempt budget shape but count attempts
//! separately per purpose and caller.

use async_trait::async_trait;

use crate::domain::{ClientInfo, Error, UserId};

/// Result of a successful promotion call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromotionOutcome {
    /// The target now holds the admin role.
    Promoted,
    /// The password matched but the target already was an admin; the role
    /// row was left as it was.
    AlreadyAdmin,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AdminPromotion: Send + Sync {
    /// An admin confirms promoting `target` with the promotion password.
    ///
    /// Wrong passwords fail with `401` carrying `remainingAttempts`; an
    /// exhausted budget fails with `429`.
    async fn verify_admin_password(
        &self,
        caller: &UserId,
        target: &UserId,
        password: &str,
        client: &ClientInfo,
    ) -> Result<PromotionOutcome, Error>;

    /// The caller promotes their own account with the promotion password.
    async fn promote_self(
        &self,
        caller: &UserId,
        password: &str,
        client: &ClientInfo,
    ) -> Result<PromotionOutcome, Error>;
}
