//! Shared validation helpers for inbound HTTP adapters.
//!
//! Request DTOs carry identifiers and enum values as strings; these helpers
//! turn them into domain types and report failures as `400` with a
//! `{field, code, value?}` details object.

use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde_json::json;
use uuid::Uuid;

use crate::domain::{
    BikeId, Error, RepairTypeId, TableLabel, UserId, WorkRegistrationId, WorkflowStatus,
};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    InvalidValue,
    InvalidDate,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::InvalidUuid => "invalid_uuid",
            Self::InvalidValue => "invalid_value",
            Self::InvalidDate => "invalid_date",
        }
    }
}

/// Newtype wrapper for HTTP field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

fn invalid(field: FieldName, message: String, code: ErrorCode, value: &str) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "value": value,
        "code": code.as_str(),
    }))
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let name = field.as_str();
    Error::invalid_request(format!("missing required field: {name}")).with_details(json!({
        "field": name,
        "code": ErrorCode::MissingField.as_str(),
    }))
}

pub(crate) fn parse_uuid(value: &str, field: FieldName) -> Result<Uuid, Error> {
    Uuid::parse_str(value.trim()).map_err(|_| {
        invalid(
            field,
            format!("{} must be a valid UUID", field.as_str()),
            ErrorCode::InvalidUuid,
            value,
        )
    })
}

pub(crate) fn parse_user_id(value: &str, field: FieldName) -> Result<UserId, Error> {
    parse_uuid(value, field).map(UserId::from_uuid)
}

pub(crate) fn parse_bike_id(value: &str) -> Result<BikeId, Error> {
    parse_uuid(value, FieldName::new("bikeId")).map(BikeId::from_uuid)
}

pub(crate) fn parse_repair_type_id(value: &str, field: FieldName) -> Result<RepairTypeId, Error> {
    parse_uuid(value, field).map(RepairTypeId::from_uuid)
}

pub(crate) fn parse_registration_id(value: &str) -> Result<WorkRegistrationId, Error> {
    parse_uuid(value, FieldName::new("registrationId")).map(WorkRegistrationId::from_uuid)
}

/// Parse a workflow status; unknown names are `400`.
pub(crate) fn parse_status(value: &str) -> Result<WorkflowStatus, Error> {
    WorkflowStatus::from_str(value).map_err(Error::from)
}

/// Parse an optional table label; blank means "no table".
pub(crate) fn parse_table(value: Option<&str>) -> Result<Option<TableLabel>, Error> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(Error::from),
    }
}

pub(crate) fn parse_date(value: &str, field: FieldName) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        invalid(
            field,
            format!("{} must be a date formatted YYYY-MM-DD", field.as_str()),
            ErrorCode::InvalidDate,
            value,
        )
    })
}

pub(crate) fn parse_time(value: &str, field: FieldName) -> Result<NaiveTime, Error> {
    let trimmed = value.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .map_err(|_| {
            invalid(
                field,
                format!("{} must be a time formatted HH:MM", field.as_str()),
                ErrorCode::InvalidDate,
                value,
            )
        })
}

/// Parse any `FromStr` value whose error is a plain message.
pub(crate) fn parse_value<T>(value: &str, field: FieldName) -> Result<T, Error>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|err: T::Err| {
        invalid(field, err.to_string(), ErrorCode::InvalidValue, value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Permission, Role};
    use rstest::rstest;
    use serde_json::Value;

    fn detail<'a>(error: &'a Error, key: &str) -> Option<&'a str> {
        error
            .details()
            .and_then(|details| details.get(key))
            .and_then(Value::as_str)
    }

    #[test]
    fn uuid_errors_name_the_field() {
        let error = parse_user_id("tafel", FieldName::new("mechanicId")).expect_err("invalid");
        assert_eq!(detail(&error, "field"), Some("mechanicId"));
        assert_eq!(detail(&error, "code"), Some("invalid_uuid"));
        assert_eq!(detail(&error, "value"), Some("tafel"));
    }

    #[rstest]
    #[case(None, None)]
    #[case(Some("  "), None)]
    #[case(Some("21"), Some("21"))]
    #[case(Some("f"), Some("F"))]
    fn tables_parse_or_clear(#[case] raw: Option<&str>, #[case] expected: Option<&str>) {
        let table = parse_table(raw).expect("valid table");
        assert_eq!(table.map(|t| t.to_string()).as_deref(), expected);
    }

    #[rstest]
    #[case("22")]
    #[case("G")]
    #[case("0")]
    fn tables_outside_the_workshop_are_rejected(#[case] raw: &str) {
        let error = parse_table(Some(raw)).expect_err("unknown table");
        assert_eq!(error.code(), crate::domain::ErrorCode::InvalidRequest);
    }

    #[test]
    fn unknown_status_is_invalid_request() {
        let error = parse_status("gerepareerd").expect_err("unknown status");
        assert_eq!(error.code(), crate::domain::ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[case("09:30")]
    #[case("09:30:00")]
    fn times_accept_minutes_and_seconds(#[case] raw: &str) {
        let time = parse_time(raw, FieldName::new("startTime")).expect("valid time");
        assert_eq!(time.format("%H:%M").to_string(), "09:30");
    }

    #[test]
    fn enum_values_use_their_own_messages() {
        let role: Role = parse_value("foh", FieldName::new("role")).expect("role");
        assert_eq!(role, Role::Foh);
        let error = parse_value::<Permission>("koffie", FieldName::new("permissions"))
            .expect_err("unknown permission");
        assert_eq!(detail(&error, "code"), Some("invalid_value"));
    }
}
