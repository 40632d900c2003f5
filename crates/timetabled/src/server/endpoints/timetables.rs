//! Endpoints for timetable lifecycle and the weekly grid view.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};

use crate::db::types::DbTimetable;
use crate::error::TimetableError;
use crate::gate::{self, CallerClaims};
use crate::grid::{self, GridSlot, WeeklyGrid};
use crate::server::types::{error_to_response, CreateTimetableBody};
use crate::types::AppState;

fn timetable_json(t: &DbTimetable) -> serde_json::Value {
    json!({
        "timetable_id": t.timetable_id,
        "course": t.course,
        "semester": t.semester,
        "academic_year": t.academic_year,
        "department": t.department,
        "state": t.state,
    })
}

/// GET /timetables
///
/// Lists all timetables with their lifecycle state.
pub async fn get_timetables(State(s): State<Arc<AppState>>) -> Response {
    info!("GET /timetables");

    match s.db.list_timetables() {
        Ok(timetables) => {
            let response: Vec<_> = timetables.iter().map(timetable_json).collect();
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to list timetables: {}", e);
            error_to_response(e)
        }
    }
}

/// POST /timetables
///
/// Creates a timetable in the DRAFT state. Admin capability required.
pub async fn post_timetable(
    State(s): State<Arc<AppState>>,
    Extension(claims): Extension<CallerClaims>,
    Json(body): Json<CreateTimetableBody>,
) -> Response {
    info!(
        "POST /timetables - {} sem {} ({})",
        body.course, body.semester, body.department
    );

    if let Err(e) = gate::authorize_admin(&claims) {
        return error_to_response(e);
    }

    if let Err(e) = validate_timetable_body(&body) {
        return error_to_response(e);
    }

    match s.db.create_timetable(
        body.course.trim(),
        body.semester.trim(),
        body.academic_year.trim(),
        body.department.trim(),
    ) {
        Ok(id) => match s.db.get_timetable(id) {
            Ok(timetable) => {
                (StatusCode::CREATED, Json(timetable_json(&timetable))).into_response()
            }
            Err(e) => error_to_response(e),
        },
        Err(e) => {
            error!("Failed to create timetable: {}", e);
            error_to_response(e)
        }
    }
}

fn validate_timetable_body(body: &CreateTimetableBody) -> Result<(), TimetableError> {
    for (field, value) in [
        ("course", &body.course),
        ("semester", &body.semester),
        ("academic_year", &body.academic_year),
        ("department", &body.department),
    ] {
        if value.trim().is_empty() {
            return Err(TimetableError::validation(format!(
                "Field {field} must not be empty"
            )));
        }
    }
    Ok(())
}

/// GET /timetables/:id/grid
///
/// Returns timetable metadata, the canonical row labels, and the week's
/// slots grouped by day (every teaching day present, empty or not).
pub async fn get_weekly_grid(
    Path(timetable_id): Path<i64>,
    State(s): State<Arc<AppState>>,
) -> Response {
    info!("GET /timetables/{}/grid", timetable_id);

    let timetable = match s.db.get_timetable(timetable_id) {
        Ok(t) => t,
        Err(e) => return error_to_response(e),
    };

    match s.db.annotated_slots(timetable_id) {
        Ok(records) => {
            let slots: Vec<GridSlot> = records
                .iter()
                .map(|(slot, subject, teacher)| GridSlot::from_record(slot, subject, teacher))
                .collect();
            let week = WeeklyGrid::assemble(slots);

            let response = json!({
                "timetable": timetable_json(&timetable),
                "rows": grid::row_labels(),
                "days": week.days,
            });

            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to fetch slots for timetable {}: {}", timetable_id, e);
            error_to_response(e)
        }
    }
}

/// PUT /timetables/:id/publish
///
/// Moves a DRAFT timetable to PUBLISHED, locking its slots. Admin
/// capability required. Publishing twice is a conflict.
pub async fn put_publish(
    Path(timetable_id): Path<i64>,
    State(s): State<Arc<AppState>>,
    Extension(claims): Extension<CallerClaims>,
) -> Response {
    info!("PUT /timetables/{}/publish", timetable_id);

    if let Err(e) = gate::authorize_admin(&claims) {
        return error_to_response(e);
    }

    match s.db.publish_timetable(timetable_id) {
        Ok(timetable) => (StatusCode::OK, Json(timetable_json(&timetable))).into_response(),
        Err(e) => {
            error!("Failed to publish timetable {}: {}", timetable_id, e);
            error_to_response(e)
        }
    }
}
