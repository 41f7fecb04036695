//! Repair price list handlers.
//!
//! ```text
//! GET   /api/v1/repair-types?includeInactive=true
//! POST  /api/v1/repair-types {"name":"Band plakken","priceCents":750,"points":1,"applicableModels":[]}
//! PUT   /api/v1/repair-types/{id} {…}
//! PATCH /api/v1/repair-types/{id}/active {"active":false}
//! ```

use actix_web::{HttpResponse, get, patch, post, put, web};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Error, RepairType, RepairTypeDraft};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_repair_type_id};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PriceListQuery {
    /// Also return deactivated repair types.
    #[serde(default)]
    pub include_inactive: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ActiveRequest {
    pub active: bool,
}

/// List repair types.
#[utoipa::path(
    get,
    path = "/api/v1/repair-types",
    params(PriceListQuery),
    responses(
        (status = 200, description = "Price list", body = [RepairType]),
        (status = 401, description = "Missing or invalid token", body = Error)
    ),
    tags = ["price list"],
    operation_id = "listRepairTypes"
)]
#[get("/repair-types")]
pub async fn list_repair_types(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    query: web::Query<PriceListQuery>,
) -> ApiResult<web::Json<Vec<RepairType>>> {
    let list = state
        .price_list
        .list(caller.user_id(), query.include_inactive)
        .await?;
    Ok(web::Json(list))
}

/// Add a repair type.
#[utoipa::path(
    post,
    path = "/api/v1/repair-types",
    request_body = RepairTypeDraft,
    responses(
        (status = 201, description = "Created", body = RepairType),
        (status = 400, description = "Invalid draft", body = Error),
        (status = 403, description = "Missing pricelist permission", body = Error)
    ),
    tags = ["price list"],
    operation_id = "createRepairType"
)]
#[post("/repair-types")]
pub async fn create_repair_type(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    payload: web::Json<RepairTypeDraft>,
) -> ApiResult<HttpResponse> {
    let created = state
        .price_list
        .create(caller.user_id(), payload.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(created))
}

/// Replace a repair type's name, price, points and models.
#[utoipa::path(
    put,
    path = "/api/v1/repair-types/{id}",
    params(("id" = String, Path, description = "Repair type id")),
    request_body = RepairTypeDraft,
    responses(
        (status = 200, description = "Updated", body = RepairType),
        (status = 404, description = "Unknown repair type", body = Error)
    ),
    tags = ["price list"],
    operation_id = "updateRepairType"
)]
#[put("/repair-types/{id}")]
pub async fn update_repair_type(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<RepairTypeDraft>,
) -> ApiResult<web::Json<RepairType>> {
    let id = parse_repair_type_id(&path, FieldName::new("id"))?;
    let updated = state
        .price_list
        .update(caller.user_id(), &id, payload.into_inner())
        .await?;
    Ok(web::Json(updated))
}

/// Activate or deactivate a repair type.
#[utoipa::path(
    patch,
    path = "/api/v1/repair-types/{id}/active",
    params(("id" = String, Path, description = "Repair type id")),
    request_body = ActiveRequest,
    responses(
        (status = 200, description = "Updated", body = RepairType),
        (status = 404, description = "Unknown repair type", body = Error)
    ),
    tags = ["price list"],
    operation_id = "setRepairTypeActive"
)]
#[patch("/repair-types/{id}/active")]
pub async fn set_repair_type_active(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<ActiveRequest>,
) -> ApiResult<web::Json<RepairType>> {
    let id = parse_repair_type_id(&path, FieldName::new("id"))?;
    let updated = state
        .price_list
        .set_active(caller.user_id(), &id, payload.active)
        .await?;
    Ok(web::Json(updated))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_repair_types)
        .service(create_repair_type)
        .service(update_repair_type)
        .service(set_repair_type_active);
}
