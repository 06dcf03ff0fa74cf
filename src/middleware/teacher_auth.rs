use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::Deserialize;

use crate::{error::AppError, models::teacher::Teacher, services::metrics, AppState};

#[derive(Deserialize)]
struct TeacherQuery {
    teacher_username: Option<String>,
}

/// Extractor that runs the configured credential check on the
/// `teacher_username` query parameter.
#[derive(Debug, Clone)]
pub struct AuthenticatedTeacher(pub Teacher);

impl FromRequestParts<AppState> for AuthenticatedTeacher {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let username = Query::<TeacherQuery>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|Query(q)| q.teacher_username);

        let result = state.credentials.verify(username.as_deref()).await;
        metrics::record("authenticate", &result);
        result.map(AuthenticatedTeacher)
    }
}
