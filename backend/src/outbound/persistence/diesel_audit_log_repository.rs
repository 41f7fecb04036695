//! Append-only writes to `admin_audit_log`.

use async_trait::async_trait;
use diesel_async::RunQueryDsl;

use crate::domain::AuditLogEntry;
use crate::domain::ports::{AuditLogRepository, AuditLogRepositoryError};

use super::models::NewAuditRow;
use super::pool::DbPool;
use super::schema::admin_audit_log;

#[derive(Clone)]
pub struct DieselAuditLogRepository {
    pool: DbPool,
}

impl DieselAuditLogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl<'a> From<&'a AuditLogEntry> for NewAuditRow<'a> {
    fn from(entry: &'a AuditLogEntry) -> Self {
        Self {
            actor_id: *entry.actor.as_uuid(),
            target_id: *entry.target.as_uuid(),
            purpose: entry.purpose.as_str(),
            outcome: entry.outcome.as_str(),
            ip_address: entry.client.ip.as_deref(),
            user_agent: entry.client.user_agent.as_deref(),
            created_at: entry.created_at,
        }
    }
}

#[async_trait]
impl AuditLogRepository for DieselAuditLogRepository {
    async fn record(&self, entry: &AuditLogEntry) -> Result<(), AuditLogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(AuditLogRepositoryError::from)?;
        diesel::insert_into(admin_audit_log::table)
            .values(NewAuditRow::from(entry))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(AuditLogRepositoryError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AttemptPurpose, AuditOutcome, ClientInfo, UserId};
    use crate::test_support::fixture_now;

    #[test]
    fn audit_rows_use_storage_names() {
        let entry = AuditLogEntry {
            actor: UserId::random(),
            target: UserId::random(),
            purpose: AttemptPurpose::PromoteToAdmin,
            outcome: AuditOutcome::RateLimited,
            client: ClientInfo {
                ip: Some("10.0.0.7".to_owned()),
                user_agent: None,
            },
            created_at: fixture_now(),
        };

        let row = NewAuditRow::from(&entry);
        assert_eq!(row.purpose, "promote_to_admin");
        assert_eq!(row.outcome, "rate_limited");
        assert_eq!(row.ip_address, Some("10.0.0.7"));
        assert_eq!(row.actor_id, *entry.actor.as_uuid());
    }
}
