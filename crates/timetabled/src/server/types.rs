//! Shared request/response types for the HTTP surface.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::error::TimetableError;

/// A JSON error payload with an HTTP status.
pub struct ApiErrorType {
    status: StatusCode,
    error: String,
    detail: Option<String>,
}

impl From<(StatusCode, &str, Option<String>)> for ApiErrorType {
    fn from((status, error, detail): (StatusCode, &str, Option<String>)) -> Self {
        ApiErrorType {
            status,
            error: error.to_string(),
            detail,
        }
    }
}

impl IntoResponse for ApiErrorType {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({
                "error": self.error,
                "detail": self.detail,
            })),
        )
            .into_response()
    }
}

/// Maps a domain error onto the HTTP surface. Wrong role (403) and wrong
/// lifecycle state (409) stay distinct.
pub fn error_to_response(error: TimetableError) -> Response {
    let (status, message) = match &error {
        TimetableError::Validation { .. } => (StatusCode::BAD_REQUEST, "Invalid request"),
        TimetableError::Unauthenticated { .. } => {
            (StatusCode::UNAUTHORIZED, "Missing or invalid caller claims")
        }
        TimetableError::Forbidden { .. } => (
            StatusCode::FORBIDDEN,
            "Caller is not permitted to perform this operation",
        ),
        TimetableError::InvalidState { .. } => {
            (StatusCode::CONFLICT, "Timetable is published and locked")
        }
        TimetableError::NotFound { .. } => (StatusCode::NOT_FOUND, "Resource not found"),
        TimetableError::Db(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Database operation failed",
        ),
    };

    ApiErrorType::from((status, message, Some(error.to_string()))).into_response()
}

#[derive(Debug, Deserialize)]
pub struct CreateTimetableBody {
    pub course: String,
    pub semester: String,
    pub academic_year: String,
    pub department: String,
}

/// Body for slot create and update. Times are wall-clock "HH:MM".
#[derive(Debug, Deserialize)]
pub struct SlotBody {
    pub day: String,
    pub start_time: String,
    pub end_time: String,
    pub subject_id: i64,
    pub teacher_id: i64,
    #[serde(default)]
    pub room: Option<String>,
    pub slot_type: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateSubjectBody {
    pub name: String,
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateTeacherBody {
    pub name: String,
}
