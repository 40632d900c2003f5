//! Endpoints for slot mutations. Every handler here goes through the
//! mutation gate: HOD capability for the timetable's department, and the
//! timetable still in DRAFT.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};

use crate::db::types::{DbSlot, SlotFields, SlotType};
use crate::error::TimetableError;
use crate::gate::{self, CallerClaims};
use crate::grid::{self, DayOfWeek};
use crate::server::types::{error_to_response, SlotBody};
use crate::types::AppState;

fn slot_json(slot: &DbSlot) -> serde_json::Value {
    json!({
        "slot_id": slot.slot_id,
        "timetable_id": slot.timetable_id,
        "day": slot.day,
        "start_time": grid::minutes_label(slot.start_min),
        "end_time": grid::minutes_label(slot.end_min),
        "subject_id": slot.subject_id,
        "teacher_id": slot.teacher_id,
        "room": slot.room,
        "slot_type": slot.slot_type,
    })
}

/// Validates a slot body into storable fields. Times must parse as HH:MM
/// and match one of the canonical grid rows exactly; anything else would
/// be invisible in the grid, so it is rejected up front.
fn slot_fields_from_body(body: &SlotBody) -> Result<SlotFields, TimetableError> {
    let day = DayOfWeek::parse(&body.day)
        .ok_or_else(|| TimetableError::validation(format!("Unknown day of week: {}", body.day)))?;

    let start_min = grid::parse_wall_clock(&body.start_time)?;
    let end_min = grid::parse_wall_clock(&body.end_time)?;

    if grid::canonical_row(start_min, end_min).is_none() {
        return Err(TimetableError::validation(format!(
            "Time range {}-{} does not match any canonical grid row",
            body.start_time, body.end_time
        )));
    }

    let slot_type = SlotType::parse(&body.slot_type).ok_or_else(|| {
        TimetableError::validation(format!("Unknown slot type: {}", body.slot_type))
    })?;

    Ok(SlotFields {
        day,
        start_min,
        end_min,
        subject_id: body.subject_id,
        teacher_id: body.teacher_id,
        room: body.room.clone(),
        slot_type,
    })
}

/// POST /timetables/:id/slots
pub async fn post_slot(
    Path(timetable_id): Path<i64>,
    State(s): State<Arc<AppState>>,
    Extension(claims): Extension<CallerClaims>,
    Json(body): Json<SlotBody>,
) -> Response {
    info!("POST /timetables/{}/slots", timetable_id);

    let timetable = match s.db.get_timetable(timetable_id) {
        Ok(t) => t,
        Err(e) => return error_to_response(e),
    };

    if let Err(e) = gate::authorize_slot_mutation(&claims, &timetable) {
        return error_to_response(e);
    }

    let fields = match slot_fields_from_body(&body) {
        Ok(f) => f,
        Err(e) => return error_to_response(e),
    };

    match s.db.create_slot(timetable_id, &fields) {
        Ok(slot_id) => match s.db.get_slot(slot_id) {
            Ok(slot) => (StatusCode::CREATED, Json(slot_json(&slot))).into_response(),
            Err(e) => error_to_response(e),
        },
        Err(e) => {
            error!("Failed to create slot in timetable {}: {}", timetable_id, e);
            error_to_response(e)
        }
    }
}

/// PUT /slots/:id
pub async fn put_slot(
    Path(slot_id): Path<i64>,
    State(s): State<Arc<AppState>>,
    Extension(claims): Extension<CallerClaims>,
    Json(body): Json<SlotBody>,
) -> Response {
    info!("PUT /slots/{}", slot_id);

    let (timetable, fields) = match mutation_context(&s, slot_id, &claims, &body) {
        Ok(v) => v,
        Err(e) => return error_to_response(e),
    };

    match s.db.update_slot(slot_id, &fields) {
        Ok(slot) => (StatusCode::OK, Json(slot_json(&slot))).into_response(),
        Err(e) => {
            error!(
                "Failed to update slot {} in timetable {}: {}",
                slot_id, timetable.timetable_id, e
            );
            error_to_response(e)
        }
    }
}

/// DELETE /slots/:id
pub async fn delete_slot(
    Path(slot_id): Path<i64>,
    State(s): State<Arc<AppState>>,
    Extension(claims): Extension<CallerClaims>,
) -> Response {
    info!("DELETE /slots/{}", slot_id);

    let slot = match s.db.get_slot(slot_id) {
        Ok(slot) => slot,
        Err(e) => return error_to_response(e),
    };

    let timetable = match s.db.get_timetable(slot.timetable_id) {
        Ok(t) => t,
        Err(e) => return error_to_response(e),
    };

    if let Err(e) = gate::authorize_slot_mutation(&claims, &timetable) {
        return error_to_response(e);
    }

    match s.db.delete_slot(slot_id) {
        Ok(()) => (StatusCode::OK, Json(json!({ "deleted": slot_id }))).into_response(),
        Err(e) => {
            error!("Failed to delete slot {}: {}", slot_id, e);
            error_to_response(e)
        }
    }
}

/// Resolves the slot's parent timetable, runs the mutation gate, and
/// validates the new fields, in that order.
fn mutation_context(
    s: &Arc<AppState>,
    slot_id: i64,
    claims: &CallerClaims,
    body: &SlotBody,
) -> Result<(crate::db::types::DbTimetable, SlotFields), TimetableError> {
    let slot = s.db.get_slot(slot_id)?;
    let timetable = s.db.get_timetable(slot.timetable_id)?;
    gate::authorize_slot_mutation(claims, &timetable)?;
    let fields = slot_fields_from_body(body)?;
    Ok((timetable, fields))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(day: &str, start: &str, end: &str, slot_type: &str) -> SlotBody {
        SlotBody {
            day: day.to_string(),
            start_time: start.to_string(),
            end_time: end.to_string(),
            subject_id: 1,
            teacher_id: 1,
            room: None,
            slot_type: slot_type.to_string(),
        }
    }

    #[test]
    fn test_valid_body_maps_to_fields() {
        let fields = slot_fields_from_body(&body("MONDAY", "09:00", "10:00", "lecture")).unwrap();
        assert_eq!(fields.day, DayOfWeek::Monday);
        assert_eq!(fields.start_min, 540);
        assert_eq!(fields.end_min, 600);
        assert_eq!(fields.slot_type, SlotType::Lecture);
    }

    #[test]
    fn test_non_canonical_range_rejected() {
        let err = slot_fields_from_body(&body("MONDAY", "09:15", "10:15", "LECTURE")).unwrap_err();
        assert!(matches!(err, TimetableError::Validation { .. }));

        // Two rows wide is not a cell either.
        let err = slot_fields_from_body(&body("MONDAY", "09:00", "11:00", "LECTURE")).unwrap_err();
        assert!(matches!(err, TimetableError::Validation { .. }));
    }

    #[test]
    fn test_bad_day_time_and_type_rejected() {
        assert!(slot_fields_from_body(&body("SUNDAY", "09:00", "10:00", "LECTURE")).is_err());
        assert!(slot_fields_from_body(&body("MONDAY", "9 o'clock", "10:00", "LECTURE")).is_err());
        assert!(slot_fields_from_body(&body("MONDAY", "09:00", "10:00", "SEMINAR")).is_err());
    }
}
