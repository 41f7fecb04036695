//! In-process adapters for every driven port.
//!
//! [`MemoryStore`] keeps each table behind its own mutex and implements all
//! repository ports, so one `Arc<MemoryStore>` can be handed to every
//! service. It backs deployments without a database and the integration
//! tests. Nothing survives a restart.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    Account, AttemptWindow, AuditLogEntry, Availability, Bike, BikeId, RepairType, RepairTypeId,
    TokenDigest, TvAnnouncement, UserId, WorkRegistration, WorkRegistrationId,
};

mod accounts;
mod rate_limit;
mod schedule;
mod workshop;

/// Token row: owner and optional expiry.
#[derive(Debug, Clone, Copy)]
struct IssuedToken {
    user_id: UserId,
    expires_at: Option<DateTime<Utc>>,
}

/// Shared in-memory storage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    accounts: Mutex<HashMap<UserId, Account>>,
    tokens: Mutex<HashMap<TokenDigest, IssuedToken>>,
    settings: Mutex<HashMap<String, String>>,
    attempts: Mutex<HashMap<String, AttemptWindow>>,
    audit: Mutex<Vec<AuditLogEntry>>,
    bikes: Mutex<HashMap<BikeId, Bike>>,
    registrations: Mutex<HashMap<WorkRegistrationId, WorkRegistration>>,
    repair_types: Mutex<HashMap<RepairTypeId, RepairType>>,
    availability: Mutex<HashMap<Uuid, Availability>>,
    announcements: Mutex<HashMap<Uuid, TvAnnouncement>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an account.
    pub fn insert_account(&self, account: Account) {
        lock(&self.accounts).insert(*account.user_id(), account);
    }

    /// Register a token digest for `user_id`.
    pub fn issue_token(
        &self,
        digest: TokenDigest,
        user_id: UserId,
        expires_at: Option<DateTime<Utc>>,
    ) {
        lock(&self.tokens).insert(
            digest,
            IssuedToken {
                user_id,
                expires_at,
            },
        );
    }

    /// Store an admin setting.
    pub fn put_setting(&self, key: impl Into<String>, value: impl Into<String>) {
        lock(&self.settings).insert(key.into(), value.into());
    }

    /// Audit entries in insertion order.
    #[must_use]
    pub fn audit_entries(&self) -> Vec<AuditLogEntry> {
        lock(&self.audit).clone()
    }
}

/// Lock a table. Every write leaves the map consistent, so a poisoned lock
/// still holds usable data.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
