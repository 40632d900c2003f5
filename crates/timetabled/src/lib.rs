//! Timetable slot grid service.
//!
//! Serves a week-at-a-time view of lecture/lab slots for college timetables
//! and gates all mutations on caller role and timetable lifecycle state.

pub mod config;
pub mod db;
pub mod error;
pub mod gate;
pub mod grid;
pub mod server;
pub mod types;
