//! Weekly grid assembly for timetable slots.
//!
//! The grid is a fixed 6-day by 8-row matrix. Slots are grouped by day and
//! rendered against the canonical hourly rows; slot times are validated
//! against those rows at write time, so every stored slot is visible in
//! exactly one cell.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveTime, Timelike};
use serde::Serialize;

use crate::db::types::{DbSlot, SlotType};
use crate::error::TimetableError;

/// Teaching days, Monday through Saturday. No Sunday lectures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 6] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DayOfWeek::Monday => "MONDAY",
            DayOfWeek::Tuesday => "TUESDAY",
            DayOfWeek::Wednesday => "WEDNESDAY",
            DayOfWeek::Thursday => "THURSDAY",
            DayOfWeek::Friday => "FRIDAY",
            DayOfWeek::Saturday => "SATURDAY",
        }
    }

    /// Parses a day name, case-insensitively. Returns `None` for Sunday or
    /// anything else outside the teaching week.
    pub fn parse(s: &str) -> Option<DayOfWeek> {
        match s.to_ascii_uppercase().as_str() {
            "MONDAY" => Some(DayOfWeek::Monday),
            "TUESDAY" => Some(DayOfWeek::Tuesday),
            "WEDNESDAY" => Some(DayOfWeek::Wednesday),
            "THURSDAY" => Some(DayOfWeek::Thursday),
            "FRIDAY" => Some(DayOfWeek::Friday),
            "SATURDAY" => Some(DayOfWeek::Saturday),
            _ => None,
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One canonical time row of the grid, as minutes since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRow {
    pub start_min: u16,
    pub end_min: u16,
}

impl TimeRow {
    const fn new(start_min: u16, end_min: u16) -> Self {
        TimeRow { start_min, end_min }
    }

    /// Row label in the form "09:00-10:00".
    pub fn label(&self) -> String {
        format!(
            "{}-{}",
            minutes_label(self.start_min),
            minutes_label(self.end_min)
        )
    }
}

/// The 8 hourly rows the grid is built against, 09:00 through 17:00.
pub const CANONICAL_ROWS: [TimeRow; 8] = [
    TimeRow::new(9 * 60, 10 * 60),
    TimeRow::new(10 * 60, 11 * 60),
    TimeRow::new(11 * 60, 12 * 60),
    TimeRow::new(12 * 60, 13 * 60),
    TimeRow::new(13 * 60, 14 * 60),
    TimeRow::new(14 * 60, 15 * 60),
    TimeRow::new(15 * 60, 16 * 60),
    TimeRow::new(16 * 60, 17 * 60),
];

/// Finds the canonical row exactly matching the given time range, if any.
pub fn canonical_row(start_min: u16, end_min: u16) -> Option<TimeRow> {
    CANONICAL_ROWS
        .iter()
        .copied()
        .find(|row| row.start_min == start_min && row.end_min == end_min)
}

/// Labels for all canonical rows, in order.
pub fn row_labels() -> Vec<String> {
    CANONICAL_ROWS.iter().map(|r| r.label()).collect()
}

/// Parses a wall-clock "HH:MM" string into minutes since midnight.
pub fn parse_wall_clock(s: &str) -> Result<u16, TimetableError> {
    let time = NaiveTime::parse_from_str(s, "%H:%M")
        .map_err(|_| TimetableError::validation(format!("Malformed time (expected HH:MM): {s}")))?;
    Ok((time.hour() * 60 + time.minute()) as u16)
}

/// Formats minutes since midnight as "HH:MM".
pub fn minutes_label(min: u16) -> String {
    format!("{:02}:{:02}", min / 60, min % 60)
}

/// A slot annotated with subject and teacher names, ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridSlot {
    pub slot_id: i64,
    pub day: DayOfWeek,
    pub start: String,
    pub end: String,
    pub subject_id: i64,
    pub subject: String,
    pub teacher_id: i64,
    pub teacher: String,
    pub room: Option<String>,
    pub slot_type: SlotType,
}

impl GridSlot {
    pub fn from_record(slot: &DbSlot, subject: &str, teacher: &str) -> Self {
        GridSlot {
            slot_id: slot.slot_id,
            day: slot.day,
            start: minutes_label(slot.start_min),
            end: minutes_label(slot.end_min),
            subject_id: slot.subject_id,
            subject: subject.to_string(),
            teacher_id: slot.teacher_id,
            teacher: teacher.to_string(),
            room: slot.room.clone(),
            slot_type: slot.slot_type,
        }
    }
}

/// A week of slots grouped by day, every teaching day present as a key.
#[derive(Debug, Serialize)]
pub struct WeeklyGrid {
    pub days: BTreeMap<DayOfWeek, Vec<GridSlot>>,
}

impl WeeklyGrid {
    /// Groups the given slots by day. Each day's slots are sorted by start
    /// time; days with no slots map to an empty list.
    pub fn assemble(slots: Vec<GridSlot>) -> Self {
        let mut days: BTreeMap<DayOfWeek, Vec<GridSlot>> = DayOfWeek::ALL
            .iter()
            .map(|&d| (d, Vec::new()))
            .collect();

        for slot in slots {
            days.entry(slot.day).or_default().push(slot);
        }

        for entries in days.values_mut() {
            entries.sort_by(|a, b| a.start.cmp(&b.start));
        }

        WeeklyGrid { days }
    }

    /// Returns the slots scheduled on one day.
    pub fn day(&self, day: DayOfWeek) -> &[GridSlot] {
        self.days.get(&day).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Flattens the grouping back into a single list, Monday first.
    pub fn flatten(&self) -> Vec<&GridSlot> {
        self.days.values().flatten().collect()
    }

    /// Total number of slots across all days.
    pub fn len(&self) -> usize {
        self.days.values().map(|v| v.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
