//! TV announcement handlers.
//!
//! ```text
//! GET    /api/v1/tv/announcements          (public)
//! GET    /api/v1/announcements
//! POST   /api/v1/announcements {"message":"Vandaag tot 17:00 open"}
//! PATCH  /api/v1/announcements/{id} {"active":false}
//! DELETE /api/v1/announcements/{id}
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};

use crate::domain::{AnnouncementDraft, Error, TvAnnouncement};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::price_list::ActiveRequest;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_uuid};

/// Announcements currently on screen.
#[utoipa::path(
    get,
    path = "/api/v1/tv/announcements",
    responses((status = 200, description = "Visible announcements", body = [TvAnnouncement])),
    tags = ["tv"],
    operation_id = "visibleAnnouncements",
    security([])
)]
#[get("/tv/announcements")]
pub async fn visible_announcements(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<TvAnnouncement>>> {
    Ok(web::Json(state.announcements.visible().await?))
}

/// Every announcement, including inactive and expired ones.
#[utoipa::path(
    get,
    path = "/api/v1/announcements",
    responses(
        (status = 200, description = "Announcements", body = [TvAnnouncement]),
        (status = 403, description = "Missing tv_announcements permission", body = Error)
    ),
    tags = ["tv"],
    operation_id = "listAnnouncements"
)]
#[get("/announcements")]
pub async fn list_announcements(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
) -> ApiResult<web::Json<Vec<TvAnnouncement>>> {
    Ok(web::Json(state.announcements.list(caller.user_id()).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/announcements",
    request_body = AnnouncementDraft,
    responses(
        (status = 201, description = "Created", body = TvAnnouncement),
        (status = 400, description = "Empty message or invalid colour", body = Error),
        (status = 403, description = "Missing tv_announcements permission", body = Error)
    ),
    tags = ["tv"],
    operation_id = "createAnnouncement"
)]
#[post("/announcements")]
pub async fn create_announcement(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    payload: web::Json<AnnouncementDraft>,
) -> ApiResult<HttpResponse> {
    let created = state
        .announcements
        .create(caller.user_id(), payload.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(created))
}

#[utoipa::path(
    patch,
    path = "/api/v1/announcements/{id}",
    params(("id" = String, Path, description = "Announcement id")),
    request_body = ActiveRequest,
    responses(
        (status = 200, description = "Updated", body = TvAnnouncement),
        (status = 404, description = "Unknown announcement", body = Error)
    ),
    tags = ["tv"],
    operation_id = "setAnnouncementActive"
)]
#[patch("/announcements/{id}")]
pub async fn set_announcement_active(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<ActiveRequest>,
) -> ApiResult<web::Json<TvAnnouncement>> {
    let id = parse_uuid(&path, FieldName::new("id"))?;
    let updated = state
        .announcements
        .set_active(caller.user_id(), id, payload.active)
        .await?;
    Ok(web::Json(updated))
}

#[utoipa::path(
    delete,
    path = "/api/v1/announcements/{id}",
    params(("id" = String, Path, description = "Announcement id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Unknown announcement", body = Error)
    ),
    tags = ["tv"],
    operation_id = "deleteAnnouncement"
)]
#[delete("/announcements/{id}")]
pub async fn delete_announcement(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_uuid(&path, FieldName::new("id"))?;
    state.announcements.delete(caller.user_id(), id).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(visible_announcements)
        .service(list_announcements)
        .service(create_announcement)
        .service(set_announcement_active)
        .service(delete_announcement);
}
