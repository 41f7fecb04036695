//! Port for the privileged-attempt audit trail.

use async_trait::async_trait;

use crate::domain::AuditLogEntry;

use super::define_port_error;

define_port_error! {
    /// Errors raised by audit log adapters.
    pub enum AuditLogRepositoryError {
        Connection { message: String } =>
            "audit log connection failed: {message}",
        Query { message: String } =>
            "audit log write failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuditLogRepository: Send + Sync {
    /// Append one entry.
    async fn record(&self, entry: &AuditLogEntry) -> Result<(), AuditLogRepositoryError>;
}
