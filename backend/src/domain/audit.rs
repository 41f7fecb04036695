//! Audit trail entries for privileged attempts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AttemptPurpose, UserId};

/// How a privileged attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    Success,
    Failure,
    RateLimited,
}

impl AuditOutcome {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::RateLimited => "rate_limited",
        }
    }
}

/// Network origin of a request, as seen by the HTTP adapter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInfo {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}

/// One row of the audit log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditLogEntry {
    pub actor: UserId,
    pub target: UserId,
    pub purpose: AttemptPurpose,
    pub outcome: AuditOutcome,
    pub client: ClientInfo,
    pub created_at: DateTime<Utc>,
}
