use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use crate::{
    error::AppError,
    middleware::{query_params::QueryParams, teacher_auth::AuthenticatedTeacher},
    models::announcement::{
        Announcement, CreateAnnouncementRequest, ListAnnouncementsQuery,
        UpdateAnnouncementRequest,
    },
    services::{announcements::AnnouncementService, metrics},
    AppState,
};

/// GET /announcements — `?active_only=false` includes expired and scheduled ones.
pub async fn list_announcements(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<ListAnnouncementsQuery>,
) -> Result<Json<Vec<Announcement>>, AppError> {
    let result = AnnouncementService::list(state.announcements.as_ref(), params.active_only).await;
    metrics::record("list", &result);
    result.map(Json)
}

/// GET /announcements/{id}
pub async fn get_announcement(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Announcement>, AppError> {
    let result = AnnouncementService::get(state.announcements.as_ref(), &id).await;
    metrics::record("get", &result);
    result.map(Json)
}

/// POST /announcements?message=..&expiration_date=YYYY-MM-DD[&start_date=..]&teacher_username=..
pub async fn create_announcement(
    State(state): State<AppState>,
    AuthenticatedTeacher(teacher): AuthenticatedTeacher,
    QueryParams(body): QueryParams<CreateAnnouncementRequest>,
) -> Result<(StatusCode, Json<Announcement>), AppError> {
    let result = AnnouncementService::create(state.announcements.as_ref(), &teacher, body).await;
    metrics::record("create", &result);
    result.map(|a| (StatusCode::CREATED, Json(a)))
}

/// PUT /announcements/{id} — only supplied fields change; `start_date=` removes it.
pub async fn update_announcement(
    State(state): State<AppState>,
    AuthenticatedTeacher(teacher): AuthenticatedTeacher,
    Path(id): Path<String>,
    QueryParams(body): QueryParams<UpdateAnnouncementRequest>,
) -> Result<Json<Announcement>, AppError> {
    let result =
        AnnouncementService::update(state.announcements.as_ref(), &teacher, &id, body).await;
    metrics::record("update", &result);
    result.map(Json)
}

/// DELETE /announcements/{id}
pub async fn delete_announcement(
    State(state): State<AppState>,
    AuthenticatedTeacher(teacher): AuthenticatedTeacher,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let result = AnnouncementService::delete(state.announcements.as_ref(), &teacher, &id).await;
    metrics::record("delete", &result);
    result.map(|_| Json(json!({ "message": "Announcement deleted successfully" })))
}
