pub mod catalog;
pub mod slots;
pub mod status;
pub mod timetables;
