//! Bike intake and workflow handlers.
//!
//! ```text
//! GET   /api/v1/bikes?status=in_reparatie&frameNumber=WBK&includeCompleted=false
//! POST  /api/v1/bikes {"frameNumber":"WBK123","model":"stadsfiets","table":"3"}
//! GET   /api/v1/bikes/{id}
//! PATCH /api/v1/bikes/{id}/status {"status":"diagnose_bezig"}
//! PUT   /api/v1/bikes/{id}/table {"table":"B"}
//! PUT   /api/v1/bikes/{id}/mechanic {"mechanicId":"…"}
//! GET   /api/v1/bikes/{id}/registrations
//! POST  /api/v1/bikes/{id}/registrations {"repairTypeId":"…"}
//! ```

use actix_web::{HttpResponse, get, patch, post, put, web};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::BikeIntake;
use crate::domain::{
    Bike, BikeFilter, BikeModel, Error, FrameNumber, UserId, WorkRegistration,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, missing_field_error, parse_bike_id, parse_repair_type_id, parse_status,
    parse_table, parse_user_id,
};

/// Query string for `GET /api/v1/bikes`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct BikeListQuery {
    /// Only bikes in this workflow status.
    pub status: Option<String>,
    /// Case-insensitive frame number substring.
    pub frame_number: Option<String>,
    /// Include bikes whose status is `afgerond`.
    #[serde(default)]
    pub include_completed: bool,
}

impl TryFrom<BikeListQuery> for BikeFilter {
    type Error = Error;

    fn try_from(query: BikeListQuery) -> Result<Self, Self::Error> {
        let status = query.status.as_deref().map(parse_status).transpose()?;
        let frame_number_contains = query
            .frame_number
            .map(|needle| needle.trim().to_owned())
            .filter(|needle| !needle.is_empty());
        Ok(Self {
            status,
            frame_number_contains,
            include_completed: query.include_completed,
        })
    }
}

/// Request body for bike intake.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BikeIntakeRequest {
    #[schema(example = "WBK554-12")]
    pub frame_number: Option<String>,
    #[schema(example = "stadsfiets")]
    pub model: Option<String>,
    #[schema(example = "3")]
    pub table: Option<String>,
    pub customer_note: Option<String>,
}

impl TryFrom<BikeIntakeRequest> for BikeIntake {
    type Error = Error;

    fn try_from(request: BikeIntakeRequest) -> Result<Self, Self::Error> {
        let frame_number = request
            .frame_number
            .ok_or_else(|| missing_field_error(FieldName::new("frameNumber")))?;
        let frame_number = FrameNumber::new(&frame_number)?;
        let model = request
            .model
            .ok_or_else(|| missing_field_error(FieldName::new("model")))?;
        let model: BikeModel = model.parse()?;
        Ok(Self {
            frame_number,
            model,
            table: parse_table(request.table.as_deref())?,
            customer_note: request.customer_note,
        })
    }
}

/// Request body for status changes.
#[derive(Debug, Deserialize, ToSchema)]
pub struct StatusChangeRequest {
    #[schema(example = "diagnose_bezig")]
    pub status: String,
}

/// Request body for table placement; `null` or blank clears the table.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TableAssignmentRequest {
    #[schema(example = "B")]
    pub table: Option<String>,
}

/// Request body for mechanic assignment; `null` unassigns.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MechanicAssignmentRequest {
    pub mechanic_id: Option<String>,
}

/// Request body for proposing a repair.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProposeRegistrationRequest {
    pub repair_type_id: String,
}

/// List bikes in the workshop.
#[utoipa::path(
    get,
    path = "/api/v1/bikes",
    params(BikeListQuery),
    responses(
        (status = 200, description = "Bikes matching the filter", body = [Bike]),
        (status = 400, description = "Unknown status", body = Error),
        (status = 401, description = "Missing or invalid token", body = Error)
    ),
    tags = ["bikes"],
    operation_id = "listBikes"
)]
#[get("/bikes")]
pub async fn list_bikes(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    query: web::Query<BikeListQuery>,
) -> ApiResult<web::Json<Vec<Bike>>> {
    let filter = BikeFilter::try_from(query.into_inner())?;
    let bikes = state.bikes.list(caller.user_id(), filter).await?;
    Ok(web::Json(bikes))
}

/// Register a bike arriving at the workshop.
#[utoipa::path(
    post,
    path = "/api/v1/bikes",
    request_body = BikeIntakeRequest,
    responses(
        (status = 201, description = "Bike registered", body = Bike),
        (status = 400, description = "Invalid frame number, model or table", body = Error),
        (status = 403, description = "Caller may not register bikes", body = Error),
        (status = 409, description = "Table already occupied", body = Error)
    ),
    tags = ["bikes"],
    operation_id = "intakeBike"
)]
#[post("/bikes")]
pub async fn intake_bike(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    payload: web::Json<BikeIntakeRequest>,
) -> ApiResult<HttpResponse> {
    let intake = BikeIntake::try_from(payload.into_inner())?;
    let bike = state.bikes.intake(caller.user_id(), intake).await?;
    Ok(HttpResponse::Created().json(bike))
}

/// Fetch one bike.
#[utoipa::path(
    get,
    path = "/api/v1/bikes/{id}",
    params(("id" = String, Path, description = "Bike id")),
    responses(
        (status = 200, description = "Bike", body = Bike),
        (status = 404, description = "Unknown bike", body = Error)
    ),
    tags = ["bikes"],
    operation_id = "getBike"
)]
#[get("/bikes/{id}")]
pub async fn get_bike(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<Bike>> {
    let id = parse_bike_id(&path)?;
    let bike = state.bikes.get(caller.user_id(), &id).await?;
    Ok(web::Json(bike))
}

/// Move a bike to another workflow status.
#[utoipa::path(
    patch,
    path = "/api/v1/bikes/{id}/status",
    params(("id" = String, Path, description = "Bike id")),
    request_body = StatusChangeRequest,
    responses(
        (status = 200, description = "Updated bike", body = Bike),
        (status = 400, description = "Unknown status", body = Error),
        (status = 409, description = "Transition not allowed", body = Error)
    ),
    tags = ["bikes"],
    operation_id = "updateBikeStatus"
)]
#[patch("/bikes/{id}/status")]
pub async fn update_status(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<StatusChangeRequest>,
) -> ApiResult<web::Json<Bike>> {
    let id = parse_bike_id(&path)?;
    let status = parse_status(payload.status.trim())?;
    let bike = state
        .bikes
        .update_status(caller.user_id(), &id, status)
        .await?;
    Ok(web::Json(bike))
}

/// Place a bike on a table or clear its table.
#[utoipa::path(
    put,
    path = "/api/v1/bikes/{id}/table",
    params(("id" = String, Path, description = "Bike id")),
    request_body = TableAssignmentRequest,
    responses(
        (status = 200, description = "Updated bike", body = Bike),
        (status = 400, description = "Unknown table", body = Error),
        (status = 409, description = "Table occupied or bike completed", body = Error)
    ),
    tags = ["bikes"],
    operation_id = "assignBikeTable"
)]
#[put("/bikes/{id}/table")]
pub async fn assign_table(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<TableAssignmentRequest>,
) -> ApiResult<web::Json<Bike>> {
    let id = parse_bike_id(&path)?;
    let table = parse_table(payload.table.as_deref())?;
    let bike = state.bikes.assign_table(caller.user_id(), &id, table).await?;
    Ok(web::Json(bike))
}

/// Assign or unassign the responsible mechanic.
#[utoipa::path(
    put,
    path = "/api/v1/bikes/{id}/mechanic",
    params(("id" = String, Path, description = "Bike id")),
    request_body = MechanicAssignmentRequest,
    responses(
        (status = 200, description = "Updated bike", body = Bike),
        (status = 400, description = "Mechanic unknown or disabled", body = Error)
    ),
    tags = ["bikes"],
    operation_id = "assignBikeMechanic"
)]
#[put("/bikes/{id}/mechanic")]
pub async fn assign_mechanic(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<MechanicAssignmentRequest>,
) -> ApiResult<web::Json<Bike>> {
    let id = parse_bike_id(&path)?;
    let mechanic: Option<UserId> = payload
        .mechanic_id
        .as_deref()
        .map(|raw| parse_user_id(raw, FieldName::new("mechanicId")))
        .transpose()?;
    let bike = state
        .bikes
        .assign_mechanic(caller.user_id(), &id, mechanic)
        .await?;
    Ok(web::Json(bike))
}

/// Work registrations of one bike.
#[utoipa::path(
    get,
    path = "/api/v1/bikes/{id}/registrations",
    params(("id" = String, Path, description = "Bike id")),
    responses(
        (status = 200, description = "Registrations", body = [WorkRegistration]),
        (status = 404, description = "Unknown bike", body = Error)
    ),
    tags = ["registrations"],
    operation_id = "listBikeRegistrations"
)]
#[get("/bikes/{id}/registrations")]
pub async fn list_registrations(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<WorkRegistration>>> {
    let id = parse_bike_id(&path)?;
    let registrations = state.bikes.registrations(caller.user_id(), &id).await?;
    Ok(web::Json(registrations))
}

/// Propose a repair for a bike.
#[utoipa::path(
    post,
    path = "/api/v1/bikes/{id}/registrations",
    params(("id" = String, Path, description = "Bike id")),
    request_body = ProposeRegistrationRequest,
    responses(
        (status = 201, description = "Registration proposed", body = WorkRegistration),
        (status = 400, description = "Repair type not applicable", body = Error),
        (status = 403, description = "Caller is not a mechanic", body = Error),
        (status = 409, description = "Repair type inactive or bike completed", body = Error)
    ),
    tags = ["registrations"],
    operation_id = "proposeRegistration"
)]
#[post("/bikes/{id}/registrations")]
pub async fn propose_registration(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<ProposeRegistrationRequest>,
) -> ApiResult<HttpResponse> {
    let id = parse_bike_id(&path)?;
    let repair_type = parse_repair_type_id(&payload.repair_type_id, FieldName::new("repairTypeId"))?;
    let registration = state
        .bikes
        .propose_registration(caller.user_id(), &id, &repair_type)
        .await?;
    Ok(HttpResponse::Created().json(registration))
}

/// Register bike endpoints on an `/api/v1` scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_bikes)
        .service(intake_bike)
        .service(get_bike)
        .service(update_status)
        .service(assign_table)
        .service(assign_mechanic)
        .service(list_registrations)
        .service(propose_registration);
}


#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::ports::MockBikeWorkflow;
    use crate::domain::{BikeId, TableLabel, WorkflowStatus};
    use crate::inbound::http::test_utils::{VALID_TOKEN, bearer, state_for};
    use crate::test_support::fixture_now;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use rstest::rstest;
    use serde_json::{Value, json};

    fn bike_from(intake: &BikeIntake) -> Bike {
        Bike {
            id: BikeId::random(),
            frame_number: intake.frame_number.clone(),
            model: intake.model,
            workflow_status: WorkflowStatus::DiagnoseNodig,
            table: intake.table,
            current_mechanic_id: None,
            diagnosed_by_id: None,
            customer_note: intake.customer_note.clone(),
            created_at: fixture_now(),
            updated_at: fixture_now(),
        }
    }

    async fn send(state: HttpState, req: test::TestRequest) -> actix_web::dev::ServiceResponse {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .service(web::scope("/api/v1").configure(configure)),
        )
        .await;
        test::call_service(&app, req.insert_header(bearer(VALID_TOKEN)).to_request()).await
    }

    #[actix_web::test]
    async fn intake_creates_the_bike() {
        let mut bikes = MockBikeWorkflow::new();
        bikes
            .expect_intake()
            .withf(|_, intake| {
                intake.frame_number.as_ref() == "WBK554-12"
                    && intake.model == BikeModel::Bakfiets
                    && intake.table == Some(TableLabel::Lettered('C'))
            })
            .returning(|_, intake| Ok(bike_from(&intake)));
        let state = HttpState {
            bikes: Arc::new(bikes),
            ..state_for(UserId::random())
        };

        let res = send(
            state,
            test::TestRequest::post().uri("/api/v1/bikes").set_json(json!({
                "frameNumber": " wbk554-12 ",
                "model": "bakfiets",
                "table": "c"
            })),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body.get("table"), Some(&json!("C")));
        assert_eq!(body.get("workflowStatus"), Some(&json!("diagnose_nodig")));
    }

    #[rstest]
    #[case(json!({ "frameNumber": "WBK1", "model": "stadsfiets", "table": "22" }), "table")]
    #[case(json!({ "frameNumber": "WBK1", "model": "tandem" }), "model")]
    #[case(json!({ "model": "stadsfiets" }), "frameNumber")]
    #[actix_web::test]
    async fn invalid_intake_never_reaches_the_service(#[case] body: Value, #[case] field: &str) {
        let mut bikes = MockBikeWorkflow::new();
        bikes.expect_intake().never();
        let state = HttpState {
            bikes: Arc::new(bikes),
            ..state_for(UserId::random())
        };

        let res = send(
            state,
            test::TestRequest::post().uri("/api/v1/bikes").set_json(body),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body.pointer("/details/field").and_then(Value::as_str), Some(field));
    }

    #[actix_web::test]
    async fn unknown_status_is_a_bad_request() {
        let mut bikes = MockBikeWorkflow::new();
        bikes.expect_update_status().never();
        let state = HttpState {
            bikes: Arc::new(bikes),
            ..state_for(UserId::random())
        };

        let res = send(
            state,
            test::TestRequest::patch()
                .uri(&format!("/api/v1/bikes/{}/status", BikeId::random()))
                .set_json(json!({ "status": "gerepareerd" })),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn list_passes_the_filter_through() {
        let mut bikes = MockBikeWorkflow::new();
        bikes
            .expect_list()
            .withf(|_, filter| {
                filter.status == Some(WorkflowStatus::InReparatie)
                    && filter.frame_number_contains.as_deref() == Some("wbk")
                    && !filter.include_completed
            })
            .returning(|_, _| Ok(Vec::new()));
        let state = HttpState {
            bikes: Arc::new(bikes),
            ..state_for(UserId::random())
        };

        let res = send(
            state,
            test::TestRequest::get().uri("/api/v1/bikes?status=in_reparatie&frameNumber=wbk"),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
    }
}
