//! Work registration decisions and completion.
//!
//! ```text
//! POST /api/v1/registrations/{id}/decision {"approved":true}
//! POST /api/v1/registrations/{id}/complete
//! ```

use actix_web::{post, web};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::domain::{Error, WorkRegistration};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::parse_registration_id;

/// Approve or reject a proposed repair.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DecisionRequest {
    pub approved: bool,
}

/// Record the front office decision on a proposed repair.
#[utoipa::path(
    post,
    path = "/api/v1/registrations/{id}/decision",
    params(("id" = String, Path, description = "Registration id")),
    request_body = DecisionRequest,
    responses(
        (status = 200, description = "Decision recorded", body = WorkRegistration),
        (status = 403, description = "Caller is not front office", body = Error),
        (status = 409, description = "Registration already completed", body = Error)
    ),
    tags = ["registrations"],
    operation_id = "decideRegistration"
)]
#[post("/registrations/{id}/decision")]
pub async fn decide_registration(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<DecisionRequest>,
) -> ApiResult<web::Json<WorkRegistration>> {
    let id = parse_registration_id(&path)?;
    let registration = state
        .bikes
        .decide_registration(caller.user_id(), &id, payload.approved)
        .await?;
    Ok(web::Json(registration))
}

/// Mark an approved repair as done.
#[utoipa::path(
    post,
    path = "/api/v1/registrations/{id}/complete",
    params(("id" = String, Path, description = "Registration id")),
    responses(
        (status = 200, description = "Registration completed", body = WorkRegistration),
        (status = 403, description = "Caller is not a mechanic", body = Error),
        (status = 409, description = "Registration not approved", body = Error)
    ),
    tags = ["registrations"],
    operation_id = "completeRegistration"
)]
#[post("/registrations/{id}/complete")]
pub async fn complete_registration(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<WorkRegistration>> {
    let id = parse_registration_id(&path)?;
    let registration = state
        .bikes
        .complete_registration(caller.user_id(), &id)
        .await?;
    Ok(web::Json(registration))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(decide_registration)
        .service(complete_registration);
}
