//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions into domain types live next
//! to the repositories that load them.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{
    access_tokens, admin_audit_log, availability, bikes, profiles, rate_limit_attempts,
    repair_types, tv_announcements, work_registrations,
};

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

/// Profile joined with its role row.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = profiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProfileRow {
    pub user_id: Uuid,
    pub display_name: String,
    pub email: String,
    pub active: bool,
    pub approved: bool,
}

#[derive(Debug, Clone, Queryable)]
pub(crate) struct PermissionRow {
    pub user_id: Uuid,
    pub permission: String,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = access_tokens)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AccessTokenRow {
    pub user_id: Uuid,
    pub expires_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Rate limiting and audit
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Queryable, QueryableByName, Selectable)]
#[diesel(table_name = rate_limit_attempts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AttemptRow {
    pub attempts: i32,
    pub window_start: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = admin_audit_log)]
pub(crate) struct NewAuditRow<'a> {
    pub actor_id: Uuid,
    pub target_id: Uuid,
    pub purpose: &'a str,
    pub outcome: &'a str,
    pub ip_address: Option<&'a str>,
    pub user_agent: Option<&'a str>,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Workshop
// ---------------------------------------------------------------------------

/// Bike row, used for reads, inserts and full updates.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = bikes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct BikeRow {
    pub id: Uuid,
    pub frame_number: String,
    pub model: String,
    pub workflow_status: String,
    pub table_number: Option<String>,
    pub current_mechanic_id: Option<Uuid>,
    pub diagnosed_by_id: Option<Uuid>,
    pub customer_note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = work_registrations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct WorkRegistrationRow {
    pub id: Uuid,
    pub bike_id: Uuid,
    pub repair_type_id: Uuid,
    pub approval: String,
    pub completed: bool,
    pub proposed_by: Uuid,
    pub completed_by: Option<Uuid>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = repair_types)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RepairTypeRow {
    pub id: Uuid,
    pub name: String,
    pub price_cents: i32,
    pub points: i32,
    pub applicable_models: Vec<String>,
    pub active: bool,
}

// ---------------------------------------------------------------------------
// Schedule and TV
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = availability)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AvailabilityRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub notes: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = tv_announcements)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AnnouncementRow {
    pub id: Uuid,
    pub message: String,
    pub background_color: String,
    pub text_color: String,
    pub icon: Option<String>,
    pub fullscreen: bool,
    pub active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
