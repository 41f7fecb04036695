//! Repair line items registered on a bike.
//!
//! A registration is proposed by a mechanic during diagnosis, approved or
//! rejected by front-of-house after calling the customer, and completed by a
//! mechanic once the work is done.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{BikeId, Error, RepairTypeId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct WorkRegistrationId(Uuid);

impl WorkRegistrationId {
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for WorkRegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Customer decision on a proposed repair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Approval {
    Proposed,
    Approved,
    Rejected,
}

impl Approval {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Proposed => "proposed",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl FromStr for Approval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "proposed" => Ok(Self::Proposed),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(format!("unknown approval state: {other}")),
        }
    }
}

/// Repair line item on a bike.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkRegistration {
    pub id: WorkRegistrationId,
    pub bike_id: BikeId,
    pub repair_type_id: RepairTypeId,
    pub approval: Approval,
    pub completed: bool,
    #[schema(value_type = String)]
    pub proposed_by: UserId,
    #[schema(value_type = Option<String>)]
    pub completed_by: Option<UserId>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl WorkRegistration {
    /// Record the front-of-house decision.
    ///
    /// Completed registrations can no longer be re-decided.
    pub fn decide(&mut self, approved: bool) -> Result<(), Error> {
        if self.completed {
            return Err(Error::conflict("registration is already completed")
                .with_details(json!({ "code": "registration_completed" })));
        }
        self.approval = if approved {
            Approval::Approved
        } else {
            Approval::Rejected
        };
        Ok(())
    }

    /// Mark the registration done by `mechanic` at `now`.
    ///
    /// Only approved registrations can be completed; completing twice is a
    /// no-op that keeps the original attribution.
    pub fn complete(&mut self, mechanic: UserId, now: DateTime<Utc>) -> Result<(), Error> {
        if self.approval != Approval::Approved {
            return Err(Error::conflict("only approved registrations can be completed")
                .with_details(json!({
                    "approval": self.approval,
                    "code": "registration_not_approved",
                })));
        }
        if !self.completed {
            self.completed = true;
            self.completed_by = Some(mechanic);
            self.completed_at = Some(now);
        }
        Ok(())
    }
}
