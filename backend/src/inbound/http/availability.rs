//! Staff availability handlers.
//!
//! ```text
//! POST /api/v1/availability {"date":"2024-05-06","startTime":"09:00","endTime":"13:00"}
//! GET  /api/v1/availability?from=2024-05-01&to=2024-05-31&everyone=true
//! POST /api/v1/availability/{id}/decision {"approved":true}
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Availability, AvailabilityDraft, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::registrations::DecisionRequest;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, missing_field_error, parse_date, parse_time, parse_uuid,
};

/// Submitted slot with times as `HH:MM` or `HH:MM:SS`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityRequest {
    #[schema(example = "2024-05-06")]
    pub date: Option<String>,
    #[schema(example = "09:00")]
    pub start_time: Option<String>,
    #[schema(example = "13:00")]
    pub end_time: Option<String>,
    pub notes: Option<String>,
}

impl TryFrom<AvailabilityRequest> for AvailabilityDraft {
    type Error = Error;

    fn try_from(request: AvailabilityRequest) -> Result<Self, Self::Error> {
        let required = |value: Option<String>, name: &'static str| {
            value.ok_or_else(|| missing_field_error(FieldName::new(name)))
        };
        let date = required(request.date, "date")?;
        let start_time = required(request.start_time, "startTime")?;
        let end_time = required(request.end_time, "endTime")?;
        Ok(Self {
            date: parse_date(&date, FieldName::new("date"))?,
            start_time: parse_time(&start_time, FieldName::new("startTime"))?,
            end_time: parse_time(&end_time, FieldName::new("endTime"))?,
            notes: request.notes,
        })
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AvailabilityListQuery {
    /// First date, inclusive (`YYYY-MM-DD`).
    pub from: String,
    /// Last date, inclusive (`YYYY-MM-DD`).
    pub to: String,
    /// List every staff member instead of only the caller.
    #[serde(default)]
    pub everyone: bool,
}

/// Submit an availability slot for the caller.
#[utoipa::path(
    post,
    path = "/api/v1/availability",
    request_body = AvailabilityRequest,
    responses(
        (status = 201, description = "Slot submitted", body = Availability),
        (status = 400, description = "Invalid date or times", body = Error),
        (status = 409, description = "Slot already submitted for that date", body = Error)
    ),
    tags = ["availability"],
    operation_id = "submitAvailability"
)]
#[post("/availability")]
pub async fn submit_availability(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    payload: web::Json<AvailabilityRequest>,
) -> ApiResult<HttpResponse> {
    let draft = AvailabilityDraft::try_from(payload.into_inner())?;
    let slot = state.availability.submit(caller.user_id(), draft).await?;
    Ok(HttpResponse::Created().json(slot))
}

/// Slots within a date range.
#[utoipa::path(
    get,
    path = "/api/v1/availability",
    params(AvailabilityListQuery),
    responses(
        (status = 200, description = "Slots", body = [Availability]),
        (status = 400, description = "Invalid range", body = Error),
        (status = 403, description = "Listing everyone requires the availability permission", body = Error)
    ),
    tags = ["availability"],
    operation_id = "listAvailability"
)]
#[get("/availability")]
pub async fn list_availability(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    query: web::Query<AvailabilityListQuery>,
) -> ApiResult<web::Json<Vec<Availability>>> {
    let from = parse_date(&query.from, FieldName::new("from"))?;
    let to = parse_date(&query.to, FieldName::new("to"))?;
    let slots = state
        .availability
        .list(caller.user_id(), from, to, query.everyone)
        .await?;
    Ok(web::Json(slots))
}

/// Approve or reject a slot.
#[utoipa::path(
    post,
    path = "/api/v1/availability/{id}/decision",
    params(("id" = String, Path, description = "Slot id")),
    request_body = DecisionRequest,
    responses(
        (status = 200, description = "Decision recorded", body = Availability),
        (status = 403, description = "Missing availability permission", body = Error),
        (status = 404, description = "Unknown slot", body = Error)
    ),
    tags = ["availability"],
    operation_id = "decideAvailability"
)]
#[post("/availability/{id}/decision")]
pub async fn decide_availability(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<DecisionRequest>,
) -> ApiResult<web::Json<Availability>> {
    let id = parse_uuid(&path, FieldName::new("id"))?;
    let slot = state
        .availability
        .decide(caller.user_id(), id, payload.approved)
        .await?;
    Ok(web::Json(slot))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(submit_availability)
        .service(list_availability)
        .service(decide_availability);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn request(start: &str, end: &str) -> AvailabilityRequest {
        AvailabilityRequest {
            date: Some("2024-05-06".to_owned()),
            start_time: Some(start.to_owned()),
            end_time: Some(end.to_owned()),
            notes: None,
        }
    }

    #[test]
    fn request_converts_to_draft() {
        let draft = AvailabilityDraft::try_from(request("09:00", "13:30:00")).expect("draft");
        assert_eq!(draft.date.to_string(), "2024-05-06");
        assert_eq!(draft.end_time.to_string(), "13:30:00");
    }

    #[rstest]
    #[case(None, Some("09:00"), "date")]
    #[case(Some("2024-05-06"), None, "startTime")]
    fn missing_fields_are_named(
        #[case] date: Option<&str>,
        #[case] start: Option<&str>,
        #[case] field: &str,
    ) {
        let error = AvailabilityDraft::try_from(AvailabilityRequest {
            date: date.map(str::to_owned),
            start_time: start.map(str::to_owned),
            end_time: Some("17:00".to_owned()),
            notes: None,
        })
        .expect_err("missing field");
        assert_eq!(
            error
                .details()
                .and_then(|d| d.get("field"))
                .and_then(serde_json::Value::as_str),
            Some(field)
        );
    }
}
