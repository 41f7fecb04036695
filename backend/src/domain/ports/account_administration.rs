//! Driving port for staff account administration.

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::domain::{Account, Error, Permission, Role, UserId};

use super::AccountFlags;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountAdministration: Send + Sync {
    /// Account of the caller.
    async fn me(&self, caller: &UserId) -> Result<Account, Error>;

    /// Every account; admin only.
    async fn list(&self, caller: &UserId) -> Result<Vec<Account>, Error>;

    /// Approve, deactivate or reactivate an account; admin only.
    async fn update_flags(
        &self,
        caller: &UserId,
        target: &UserId,
        flags: AccountFlags,
    ) -> Result<Account, Error>;

    /// Set a non-admin role; admin only.
    async fn set_role(&self, caller: &UserId, target: &UserId, role: Role)
    -> Result<Account, Error>;

    /// Replace feature permissions; admin only.
    async fn set_permissions(
        &self,
        caller: &UserId,
        target: &UserId,
        permissions: BTreeSet<Permission>,
    ) -> Result<Account, Error>;

    /// Remove an account and its identity; admin only, never oneself.
    async fn delete_user(&self, caller: &UserId, target: &UserId) -> Result<(), Error>;

    /// bcrypt hash for the promotion secret; super-admin only.
    async fn hash_password(&self, caller: &UserId, password: &str) -> Result<String, Error>;
}
