//! Attempt counters and the audit trail.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{
    AuditLogRepository, AuditLogRepositoryError, RateLimitRepository, RateLimitRepositoryError,
};
use crate::domain::{AuditLogEntry, RateLimitKey, RateLimitPolicy, SlotAcquisition};

use super::{MemoryStore, lock};

#[async_trait]
impl RateLimitRepository for MemoryStore {
    async fn try_acquire(
        &self,
        key: &RateLimitKey,
        policy: RateLimitPolicy,
        now: DateTime<Utc>,
    ) -> Result<SlotAcquisition, RateLimitRepositoryError> {
        let mut attempts = lock(&self.attempts);
        let stored = attempts.get(key.as_str()).copied();
        let acquisition = policy.acquire(stored, now);
        if let SlotAcquisition::Acquired(window) = acquisition {
            attempts.insert(key.as_str().to_owned(), window);
        }
        Ok(acquisition)
    }

    async fn reset(&self, key: &RateLimitKey) -> Result<(), RateLimitRepositoryError> {
        lock(&self.attempts).remove(key.as_str());
        Ok(())
    }
}

#[async_trait]
impl AuditLogRepository for MemoryStore {
    async fn record(&self, entry: &AuditLogEntry) -> Result<(), AuditLogRepositoryError> {
        lock(&self.audit).push(entry.clone());
        Ok(())
    }
}
