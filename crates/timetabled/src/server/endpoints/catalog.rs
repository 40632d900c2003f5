//! Endpoints for the subject and teacher reference records the grid
//! annotates slots with.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};

use crate::error::TimetableError;
use crate::gate::{self, CallerClaims};
use crate::server::types::{error_to_response, CreateSubjectBody, CreateTeacherBody};
use crate::types::AppState;

/// POST /subjects
pub async fn post_subject(
    State(s): State<Arc<AppState>>,
    Extension(claims): Extension<CallerClaims>,
    Json(body): Json<CreateSubjectBody>,
) -> Response {
    info!("POST /subjects - {} ({})", body.name, body.code);

    if let Err(e) = gate::authorize_admin(&claims) {
        return error_to_response(e);
    }

    if body.name.trim().is_empty() || body.code.trim().is_empty() {
        return error_to_response(TimetableError::validation(
            "Subject name and code must not be empty",
        ));
    }

    match s.db.insert_subject(body.name.trim(), body.code.trim()) {
        Ok(id) => (
            StatusCode::CREATED,
            Json(json!({ "subject_id": id, "name": body.name.trim(), "code": body.code.trim() })),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to insert subject: {}", e);
            error_to_response(e)
        }
    }
}

/// POST /teachers
pub async fn post_teacher(
    State(s): State<Arc<AppState>>,
    Extension(claims): Extension<CallerClaims>,
    Json(body): Json<CreateTeacherBody>,
) -> Response {
    info!("POST /teachers - {}", body.name);

    if let Err(e) = gate::authorize_admin(&claims) {
        return error_to_response(e);
    }

    if body.name.trim().is_empty() {
        return error_to_response(TimetableError::validation("Teacher name must not be empty"));
    }

    match s.db.insert_teacher(body.name.trim()) {
        Ok(id) => (
            StatusCode::CREATED,
            Json(json!({ "teacher_id": id, "name": body.name.trim() })),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to insert teacher: {}", e);
            error_to_response(e)
        }
    }
}
