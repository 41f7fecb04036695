//! Privileged RPC endpoints.
//!
//! ```text
//! POST /functions/v1/verify-admin-password {"password":"…","targetUserId":"…"}
//! POST /functions/v1/promote-to-admin {"password":"…"}
//! POST /functions/v1/hash-password {"password":"…"}
//! POST /functions/v1/delete-user {"userId":"…"}
//! POST /functions/v1/ocr-frame-number {"imageBase64":"…"}
//! ```
//!
//! The two password endpoints answer credential failures (`401` and `429`)
//! with their own response shape so clients can show the remaining attempt
//! budget. Every other failure uses the shared error payload.

use actix_web::body::BoxBody;
use actix_web::{HttpResponse, ResponseError, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;
use utoipa::ToSchema;
use zeroize::Zeroizing;

use crate::domain::ports::PromotionOutcome;
use crate::domain::{Error, ErrorCode, FrameNumberReading, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{AuthenticatedUser, RequestClient};
use crate::inbound::http::state::HttpState;

/// Request body for `verify-admin-password`.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyAdminPasswordRequest {
    #[serde(default)]
    pub password: String,
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub target_user_id: String,
}

/// Response body for `verify-admin-password`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyAdminPasswordResponse {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining_attempts: Option<u32>,
}

/// Request body for `promote-to-admin` and `hash-password`.
#[derive(Deserialize, ToSchema)]
pub struct PasswordRequest {
    #[serde(default)]
    pub password: String,
}

/// Response body for `promote-to-admin`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PromoteToAdminResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining_attempts: Option<u32>,
}

/// Response body for `hash-password`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HashPasswordResponse {
    pub hash: String,
}

/// Request body for `delete-user`.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteUserRequest {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub user_id: String,
}

/// Response body for `delete-user`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteUserResponse {
    pub success: bool,
}

/// Request body for `ocr-frame-number`.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OcrFrameNumberRequest {
    #[serde(default)]
    pub image_base64: String,
}

fn parse_user_id(raw: &str, field: &str) -> Result<UserId, Error> {
    UserId::new(raw).map_err(|err| {
        Error::invalid_request(err.to_string())
            .with_details(json!({ "field": field, "code": "invalid_user_id" }))
    })
}

fn remaining_attempts(error: &Error) -> Option<u32> {
    if !matches!(
        error.code(),
        ErrorCode::Unauthorized | ErrorCode::TooManyRequests
    ) {
        return None;
    }
    error
        .details()
        .and_then(|details| details.get("remainingAttempts"))
        .and_then(serde_json::Value::as_u64)
        .and_then(|n| u32::try_from(n).ok())
}

/// Re-shape a credential failure while keeping its status and headers.
fn credential_failure<T, F>(error: Error, shape: F) -> ApiResult<HttpResponse>
where
    T: Serialize,
    F: FnOnce(String, u32) -> T,
{
    let Some(remaining) = remaining_attempts(&error) else {
        return Err(error);
    };
    let body = serde_json::to_vec(&shape(error.message().to_owned(), remaining)).map_err(|err| {
        error!(error = %err, "failed to encode credential failure");
        Error::internal("failed to encode response")
    })?;
    Ok(error.error_response().set_body(BoxBody::new(body)))
}

/// Verify the promotion password and grant the target the admin role.
#[utoipa::path(
    post,
    path = "/functions/v1/verify-admin-password",
    request_body = VerifyAdminPasswordRequest,
    responses(
        (status = 200, description = "Password accepted; target is admin", body = VerifyAdminPasswordResponse),
        (status = 400, description = "Missing password or malformed user id", body = Error),
        (status = 401, description = "Wrong password or missing token", body = VerifyAdminPasswordResponse),
        (status = 403, description = "Caller is not an admin", body = Error),
        (status = 404, description = "Target account not found", body = Error),
        (status = 429, description = "Attempt budget exhausted", body = VerifyAdminPasswordResponse,
            headers(("Retry-After" = i64, description = "Seconds until the window resets"))),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["functions"],
    operation_id = "verifyAdminPassword"
)]
#[post("/verify-admin-password")]
pub async fn verify_admin_password(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    client: RequestClient,
    payload: web::Json<VerifyAdminPasswordRequest>,
) -> ApiResult<HttpResponse> {
    let VerifyAdminPasswordRequest {
        password,
        target_user_id,
    } = payload.into_inner();
    let password = Zeroizing::new(password);
    let target = parse_user_id(&target_user_id, "targetUserId")?;
    match state
        .promotion
        .verify_admin_password(caller.user_id(), &target, &password, &client.0)
        .await
    {
        Ok(outcome) => Ok(HttpResponse::Ok().json(VerifyAdminPasswordResponse {
            valid: true,
            message: Some(outcome_message(outcome).to_owned()),
            error: None,
            remaining_attempts: None,
        })),
        Err(error) => credential_failure(error, |message, remaining| {
            VerifyAdminPasswordResponse {
                valid: false,
                message: None,
                error: Some(message),
                remaining_attempts: Some(remaining),
            }
        }),
    }
}

fn outcome_message(outcome: PromotionOutcome) -> &'static str {
    match outcome {
        PromotionOutcome::Promoted => "user promoted to admin",
        PromotionOutcome::AlreadyAdmin => "already admin",
    }
}

/// Verify the promotion password and grant the caller the admin role.
#[utoipa::path(
    post,
    path = "/functions/v1/promote-to-admin",
    request_body = PasswordRequest,
    responses(
        (status = 200, description = "Caller is admin", body = PromoteToAdminResponse),
        (status = 400, description = "Missing password", body = Error),
        (status = 401, description = "Wrong password or missing token", body = PromoteToAdminResponse),
        (status = 403, description = "Account not approved", body = Error),
        (status = 429, description = "Attempt budget exhausted", body = PromoteToAdminResponse,
            headers(("Retry-After" = i64, description = "Seconds until the window resets"))),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["functions"],
    operation_id = "promoteToAdmin"
)]
#[post("/promote-to-admin")]
pub async fn promote_to_admin(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    client: RequestClient,
    payload: web::Json<PasswordRequest>,
) -> ApiResult<HttpResponse> {
    let password = Zeroizing::new(payload.into_inner().password);
    match state
        .promotion
        .promote_self(caller.user_id(), &password, &client.0)
        .await
    {
        Ok(outcome) => Ok(HttpResponse::Ok().json(PromoteToAdminResponse {
            success: Some(true),
            message: Some(outcome_message(outcome).to_owned()),
            error: None,
            remaining_attempts: None,
        })),
        Err(error) => credential_failure(error, |message, remaining| PromoteToAdminResponse {
            success: Some(false),
            message: None,
            error: Some(message),
            remaining_attempts: Some(remaining),
        }),
    }
}

/// Produce a bcrypt hash for seeding the promotion password.
#[utoipa::path(
    post,
    path = "/functions/v1/hash-password",
    request_body = PasswordRequest,
    responses(
        (status = 200, description = "Hash produced", body = HashPasswordResponse),
        (status = 400, description = "Missing password", body = Error),
        (status = 401, description = "Missing or invalid token", body = Error),
        (status = 403, description = "Caller is not the super admin", body = Error)
    ),
    tags = ["functions"],
    operation_id = "hashPassword"
)]
#[post("/hash-password")]
pub async fn hash_password(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    payload: web::Json<PasswordRequest>,
) -> ApiResult<web::Json<HashPasswordResponse>> {
    let password = Zeroizing::new(payload.into_inner().password);
    let hash = state
        .accounts
        .hash_password(caller.user_id(), &password)
        .await?;
    Ok(web::Json(HashPasswordResponse { hash }))
}

/// Delete a staff member's profile and identity.
#[utoipa::path(
    post,
    path = "/functions/v1/delete-user",
    request_body = DeleteUserRequest,
    responses(
        (status = 200, description = "User deleted (or already absent)", body = DeleteUserResponse),
        (status = 400, description = "Malformed user id", body = Error),
        (status = 401, description = "Missing or invalid token", body = Error),
        (status = 403, description = "Caller is not an admin or targets themselves", body = Error),
        (status = 503, description = "Identity store unavailable", body = Error)
    ),
    tags = ["functions"],
    operation_id = "deleteUser"
)]
#[post("/delete-user")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    payload: web::Json<DeleteUserRequest>,
) -> ApiResult<web::Json<DeleteUserResponse>> {
    let target = parse_user_id(&payload.user_id, "userId")?;
    state.accounts.delete_user(caller.user_id(), &target).await?;
    Ok(web::Json(DeleteUserResponse { success: true }))
}

/// Read a frame number from a photo of the bike frame.
#[utoipa::path(
    post,
    path = "/functions/v1/ocr-frame-number",
    request_body = OcrFrameNumberRequest,
    responses(
        (status = 200, description = "Model answer interpreted", body = FrameNumberReading),
        (status = 400, description = "Missing or invalid image", body = Error),
        (status = 401, description = "Missing or invalid token", body = Error),
        (status = 503, description = "Vision gateway unavailable", body = Error)
    ),
    tags = ["functions"],
    operation_id = "ocrFrameNumber"
)]
#[post("/ocr-frame-number")]
pub async fn ocr_frame_number(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    payload: web::Json<OcrFrameNumberRequest>,
) -> ApiResult<web::Json<FrameNumberReading>> {
    let reading = state
        .frame_numbers
        .recognise(caller.user_id(), &payload.image_base64)
        .await?;
    Ok(web::Json(reading))
}

/// Register the RPC endpoints under `/functions/v1`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/functions/v1")
            .service(verify_admin_password)
            .service(promote_to_admin)
            .service(hash_password)
            .service(delete_user)
            .service(ocr_frame_number),
    );
}

#[cfg(test)]
#[path = "functions_tests.rs"]
mod tests;
