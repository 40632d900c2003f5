/// Database types for timetable and slot data
use std::fmt;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use rusqlite::ToSql;
use serde::Serialize;

use crate::grid::DayOfWeek;

/// Timetable lifecycle. `publish` is the only transition and it is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TimetableState {
    Draft,
    Published,
}

impl TimetableState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimetableState::Draft => "DRAFT",
            TimetableState::Published => "PUBLISHED",
        }
    }

    pub fn parse(s: &str) -> Option<TimetableState> {
        match s {
            "DRAFT" => Some(TimetableState::Draft),
            "PUBLISHED" => Some(TimetableState::Published),
            _ => None,
        }
    }
}

impl fmt::Display for TimetableState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SlotType {
    Lecture,
    Lab,
}

impl SlotType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotType::Lecture => "LECTURE",
            SlotType::Lab => "LAB",
        }
    }

    pub fn parse(s: &str) -> Option<SlotType> {
        match s.to_ascii_uppercase().as_str() {
            "LECTURE" => Some(SlotType::Lecture),
            "LAB" => Some(SlotType::Lab),
            _ => None,
        }
    }
}

impl fmt::Display for SlotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DbTimetable {
    pub timetable_id: i64,
    pub course: String,
    pub semester: String,
    pub academic_year: String,
    pub department: String,
    pub state: TimetableState,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DbSlot {
    pub slot_id: i64,
    pub timetable_id: i64,
    pub day: DayOfWeek,
    pub start_min: u16,
    pub end_min: u16,
    pub subject_id: i64,
    pub teacher_id: i64,
    pub room: Option<String>,
    pub slot_type: SlotType,
}

/// The mutable attributes of a slot, as accepted by create and update.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotFields {
    pub day: DayOfWeek,
    pub start_min: u16,
    pub end_min: u16,
    pub subject_id: i64,
    pub teacher_id: i64,
    pub room: Option<String>,
    pub slot_type: SlotType,
}

// Enum columns are stored as their canonical TEXT spellings.

impl ToSql for TimetableState {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TimetableState {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        TimetableState::parse(value.as_str()?).ok_or(FromSqlError::InvalidType)
    }
}

impl ToSql for SlotType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for SlotType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        SlotType::parse(value.as_str()?).ok_or(FromSqlError::InvalidType)
    }
}

impl ToSql for DayOfWeek {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for DayOfWeek {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        DayOfWeek::parse(value.as_str()?).ok_or(FromSqlError::InvalidType)
    }
}
