//! Staff account handlers.
//!
//! ```text
//! GET   /api/v1/accounts/me
//! GET   /api/v1/accounts
//! PATCH /api/v1/accounts/{id} {"active":false}
//! PUT   /api/v1/accounts/{id}/role {"role":"foh"}
//! PUT   /api/v1/accounts/{id}/permissions {"permissions":["pricelist"]}
//! ```

use std::collections::BTreeSet;

use actix_web::{get, patch, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::AccountFlags;
use crate::domain::{Account, Error, Permission, Role};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_user_id, parse_value};

/// Account as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub user_id: String,
    #[schema(example = "Sanne de Vries")]
    pub display_name: String,
    #[schema(example = "sanne@werkplaats.nl")]
    pub email: String,
    pub active: bool,
    pub approved: bool,
    pub role: Role,
    pub permissions: Vec<Permission>,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        let Account {
            profile,
            role,
            permissions,
        } = account;
        Self {
            user_id: profile.user_id.to_string(),
            display_name: profile.display_name.into(),
            email: profile.email.into(),
            active: profile.active,
            approved: profile.approved,
            role,
            permissions: permissions.into_iter().collect(),
        }
    }
}

/// Partial update of the account flags.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct AccountFlagsRequest {
    pub active: Option<bool>,
    pub approved: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RoleRequest {
    #[schema(example = "monteur")]
    pub role: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PermissionsRequest {
    #[schema(example = json!(["pricelist", "tv_announcements"]))]
    pub permissions: Vec<String>,
}

/// The caller's own account.
#[utoipa::path(
    get,
    path = "/api/v1/accounts/me",
    responses(
        (status = 200, description = "Caller account", body = AccountResponse),
        (status = 401, description = "Missing or invalid token", body = Error),
        (status = 403, description = "No workshop account", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "currentAccount"
)]
#[get("/accounts/me")]
pub async fn current_account(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
) -> ApiResult<web::Json<AccountResponse>> {
    let account = state.accounts.me(caller.user_id()).await?;
    Ok(web::Json(account.into()))
}

/// Every staff account (admin only).
#[utoipa::path(
    get,
    path = "/api/v1/accounts",
    responses(
        (status = 200, description = "Accounts", body = [AccountResponse]),
        (status = 403, description = "Caller is not an admin", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "listAccounts"
)]
#[get("/accounts")]
pub async fn list_accounts(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
) -> ApiResult<web::Json<Vec<AccountResponse>>> {
    let accounts = state.accounts.list(caller.user_id()).await?;
    Ok(web::Json(accounts.into_iter().map(Into::into).collect()))
}

/// Approve, deactivate or reactivate an account.
#[utoipa::path(
    patch,
    path = "/api/v1/accounts/{id}",
    params(("id" = String, Path, description = "User id")),
    request_body = AccountFlagsRequest,
    responses(
        (status = 200, description = "Updated account", body = AccountResponse),
        (status = 404, description = "Unknown account", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "updateAccountFlags"
)]
#[patch("/accounts/{id}")]
pub async fn update_account_flags(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<AccountFlagsRequest>,
) -> ApiResult<web::Json<AccountResponse>> {
    let target = parse_user_id(&path, FieldName::new("id"))?;
    let flags = AccountFlags {
        active: payload.active,
        approved: payload.approved,
    };
    let account = state
        .accounts
        .update_flags(caller.user_id(), &target, flags)
        .await?;
    Ok(web::Json(account.into()))
}

/// Change an account's role to `monteur` or `foh`.
#[utoipa::path(
    put,
    path = "/api/v1/accounts/{id}/role",
    params(("id" = String, Path, description = "User id")),
    request_body = RoleRequest,
    responses(
        (status = 200, description = "Updated account", body = AccountResponse),
        (status = 400, description = "Unknown role", body = Error),
        (status = 403, description = "Admin role requested or caller not admin", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "setAccountRole"
)]
#[put("/accounts/{id}/role")]
pub async fn set_account_role(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<RoleRequest>,
) -> ApiResult<web::Json<AccountResponse>> {
    let target = parse_user_id(&path, FieldName::new("id"))?;
    let role: Role = parse_value(payload.role.trim(), FieldName::new("role"))?;
    let account = state
        .accounts
        .set_role(caller.user_id(), &target, role)
        .await?;
    Ok(web::Json(account.into()))
}

/// Replace an account's permission set.
#[utoipa::path(
    put,
    path = "/api/v1/accounts/{id}/permissions",
    params(("id" = String, Path, description = "User id")),
    request_body = PermissionsRequest,
    responses(
        (status = 200, description = "Updated account", body = AccountResponse),
        (status = 400, description = "Unknown permission", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "setAccountPermissions"
)]
#[put("/accounts/{id}/permissions")]
pub async fn set_account_permissions(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<PermissionsRequest>,
) -> ApiResult<web::Json<AccountResponse>> {
    let target = parse_user_id(&path, FieldName::new("id"))?;
    let permissions = payload
        .permissions
        .iter()
        .map(|raw| parse_value::<Permission>(raw.trim(), FieldName::new("permissions")))
        .collect::<Result<BTreeSet<_>, _>>()?;
    let account = state
        .accounts
        .set_permissions(caller.user_id(), &target, permissions)
        .await?;
    Ok(web::Json(account.into()))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(current_account)
        .service(list_accounts)
        .service(update_account_flags)
        .service(set_account_role)
        .service(set_account_permissions);
}
