//! Mechanic availability slots.
//!
//! One slot per user per calendar date. Slots start `pending` and are
//! approved or rejected by an admin or a holder of the `availability`
//! permission.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{Error, UserId};

/// Maximum length of free-text notes.
pub const AVAILABILITY_NOTES_MAX: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityStatus {
    Pending,
    Approved,
    Rejected,
}

impl AvailabilityStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl FromStr for AvailabilityStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(format!("unknown availability status: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    pub id: Uuid,
    #[schema(value_type = String)]
    pub user_id: UserId,
    pub date: NaiveDate,
    #[schema(value_type = String, example = "09:00:00")]
    pub start_time: NaiveTime,
    #[schema(value_type = String, example = "17:30:00")]
    pub end_time: NaiveTime,
    pub notes: Option<String>,
    pub status: AvailabilityStatus,
    pub created_at: DateTime<Utc>,
}

/// Submitted slot before it is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityDraft {
    pub date: NaiveDate,
    #[schema(value_type = String, example = "09:00:00")]
    pub start_time: NaiveTime,
    #[schema(value_type = String, example = "17:30:00")]
    pub end_time: NaiveTime,
    #[serde(default)]
    pub notes: Option<String>,
}

impl AvailabilityDraft {
    /// Validate times and notes; blank notes collapse to `None`.
    pub fn validate(mut self) -> Result<Self, Error> {
        if self.end_time <= self.start_time {
            return Err(Error::invalid_request("end time must be after start time")
                .with_details(json!({ "field": "endTime", "code": "end_before_start" })));
        }
        self.notes = self
            .notes
            .map(|notes| notes.trim().to_owned())
            .filter(|notes| !notes.is_empty());
        if self
            .notes
            .as_ref()
            .is_some_and(|notes| notes.chars().count() > AVAILABILITY_NOTES_MAX)
        {
            return Err(Error::invalid_request(format!(
                "notes must be at most {AVAILABILITY_NOTES_MAX} characters"
            ))
            .with_details(json!({ "field": "notes", "code": "notes_too_long" })));
        }
        Ok(self)
    }
}

/// Date-range listing filter; bounds are inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
    /// `None` lists every user.
    pub user_id: Option<UserId>,
}

impl AvailabilityQuery {
    #[must_use]
    pub fn matches(&self, slot: &Availability) -> bool {
        slot.date >= self.from
            && slot.date <= self.to
            && self.user_id.is_none_or(|user| user == slot.user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).expect("valid time")
    }

    fn draft(start: NaiveTime, end: NaiveTime, notes: Option<&str>) -> AvailabilityDraft {
        AvailabilityDraft {
            date: NaiveDate::from_ymd_opt(2024, 6, 3).expect("valid date"),
            start_time: start,
            end_time: end,
            notes: notes.map(str::to_owned),
        }
    }

    #[rstest]
    #[case(time(9, 0), time(9, 0))]
    #[case(time(17, 0), time(9, 0))]
    fn end_must_follow_start(#[case] start: NaiveTime, #[case] end: NaiveTime) {
        let error = draft(start, end, None).validate().expect_err("invalid times");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }

    #[test]
    fn blank_notes_are_dropped() {
        let valid = draft(time(9, 0), time(12, 30), Some("   "))
            .validate()
            .expect("valid");
        assert_eq!(valid.notes, None);
    }
}
