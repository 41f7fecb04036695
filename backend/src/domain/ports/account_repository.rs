//! Port for staff profiles, roles and permissions.
//!
//! Profile, role and permission rows live in separate tables; adapters
//! assemble them into [`Account`] values. Each user holds exactly one role
//! row, so [`AccountRepository::set_role`] replaces rather than appends.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;

use crate::domain::{Account, Permission, Role, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by account adapters.
    pub enum AccountRepositoryError {
        Connection { message: String } =>
            "account repository connection failed: {message}",
        Query { message: String } =>
            "account repository query failed: {message}",
        /// A stored row could not be mapped into the domain.
        Corrupt { message: String } =>
            "account row is invalid: {message}",
    }
}

/// Flags an admin can toggle on a profile; `None` leaves a flag untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccountFlags {
    pub active: Option<bool>,
    pub approved: Option<bool>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn find(&self, user_id: &UserId) -> Result<Option<Account>, AccountRepositoryError>;

    /// Every account ordered by display name.
    async fn list(&self) -> Result<Vec<Account>, AccountRepositoryError>;

    /// Batch lookup of display names; unknown ids are absent from the map.
    async fn display_names(
        &self,
        user_ids: &[UserId],
    ) -> Result<HashMap<UserId, String>, AccountRepositoryError>;

    /// Replace the role row of `user_id`.
    async fn set_role(&self, user_id: &UserId, role: Role) -> Result<(), AccountRepositoryError>;

    /// Update profile flags, returning the updated account when it exists.
    async fn update_flags(
        &self,
        user_id: &UserId,
        flags: AccountFlags,
    ) -> Result<Option<Account>, AccountRepositoryError>;

    /// Replace the permission set of `user_id`.
    async fn set_permissions(
        &self,
        user_id: &UserId,
        permissions: &BTreeSet<Permission>,
    ) -> Result<(), AccountRepositoryError>;

    /// Remove profile, role and permission rows. Returns whether a profile
    /// existed.
    async fn delete(&self, user_id: &UserId) -> Result<bool, AccountRepositoryError>;
}
