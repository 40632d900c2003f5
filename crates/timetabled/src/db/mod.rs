/// Database module for managing timetables, slots, and reference records

pub mod types;

pub use types::{DbSlot, DbTimetable, SlotFields, SlotType, TimetableState};

use rusqlite::{Connection, OptionalExtension};
use std::sync::Mutex;

use crate::error::TimetableError;

const SCHEMA_SQL: &str = include_str!("../../sql/init_timetables.sql");

const SLOT_COLUMNS: &str = "slot_id, timetable_id, day, start_min, end_min, \
                            subject_id, teacher_id, room, slot_type";

pub struct TimetableDbManager {
    db: Mutex<Connection>,
}

impl TimetableDbManager {
    /// Creates a new TimetableDbManager and initializes the database schema
    pub fn new(db_path: &str) -> Self {
        let conn = Connection::open(db_path).expect("Failed to open database");

        conn.execute_batch(SCHEMA_SQL)
            .expect("Failed to initialize database schema");

        Self {
            db: Mutex::new(conn),
        }
    }

    /// Opens an in-memory database, used by tests.
    pub fn in_memory() -> Self {
        Self::new(":memory:")
    }

    /// Creates a timetable in the DRAFT state and returns its id
    pub fn create_timetable(
        &self,
        course: &str,
        semester: &str,
        academic_year: &str,
        department: &str,
    ) -> Result<i64, TimetableError> {
        let db = self.db.lock().unwrap();
        db.execute(
            "INSERT INTO timetables (course, semester, academic_year, department, state, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, datetime('now'))",
            (course, semester, academic_year, department, TimetableState::Draft),
        )?;
        Ok(db.last_insert_rowid())
    }

    pub fn get_timetable(&self, timetable_id: i64) -> Result<DbTimetable, TimetableError> {
        let db = self.db.lock().unwrap();
        Self::get_timetable_locked(&db, timetable_id)
    }

    fn get_timetable_locked(
        db: &Connection,
        timetable_id: i64,
    ) -> Result<DbTimetable, TimetableError> {
        db.query_row(
            "SELECT timetable_id, course, semester, academic_year, department, state
             FROM timetables WHERE timetable_id = ?",
            [timetable_id],
            |row| {
                Ok(DbTimetable {
                    timetable_id: row.get(0)?,
                    course: row.get(1)?,
                    semester: row.get(2)?,
                    academic_year: row.get(3)?,
                    department: row.get(4)?,
                    state: row.get(5)?,
                })
            },
        )
        .optional()?
        .ok_or_else(|| TimetableError::not_found("Timetable", timetable_id))
    }

    pub fn list_timetables(&self) -> Result<Vec<DbTimetable>, TimetableError> {
        let db = self.db.lock().unwrap();
        let mut stmt = db.prepare(
            "SELECT timetable_id, course, semester, academic_year, department, state
             FROM timetables ORDER BY timetable_id",
        )?;

        let timetables = stmt
            .query_map([], |row| {
                Ok(DbTimetable {
                    timetable_id: row.get(0)?,
                    course: row.get(1)?,
                    semester: row.get(2)?,
                    academic_year: row.get(3)?,
                    department: row.get(4)?,
                    state: row.get(5)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(timetables)
    }

    /// Moves a DRAFT timetable to PUBLISHED. Publishing an already published
    /// timetable is an InvalidState error; there is no reverse transition.
    pub fn publish_timetable(&self, timetable_id: i64) -> Result<DbTimetable, TimetableError> {
        let db = self.db.lock().unwrap();
        let mut timetable = Self::get_timetable_locked(&db, timetable_id)?;

        if timetable.state == TimetableState::Published {
            return Err(TimetableError::InvalidState {
                state: timetable.state,
            });
        }

        db.execute(
            "UPDATE timetables SET state = ?1 WHERE timetable_id = ?2",
            (TimetableState::Published, timetable_id),
        )?;

        timetable.state = TimetableState::Published;
        Ok(timetable)
    }

    /// Registers a subject and returns its id
    pub fn insert_subject(&self, name: &str, code: &str) -> Result<i64, TimetableError> {
        let db = self.db.lock().unwrap();
        db.execute(
            "INSERT INTO subjects (name, code, created_at) VALUES (?1, ?2, datetime('now'))",
            (name, code),
        )?;
        Ok(db.last_insert_rowid())
    }

    /// Registers a teacher and returns its id
    pub fn insert_teacher(&self, name: &str) -> Result<i64, TimetableError> {
        let db = self.db.lock().unwrap();
        db.execute(
            "INSERT INTO teachers (name, created_at) VALUES (?1, datetime('now'))",
            [name],
        )?;
        Ok(db.last_insert_rowid())
    }

    /// Creates a slot in the given timetable and returns its id.
    ///
    /// The referenced subject and teacher must exist, and the (day, start,
    /// end) cell must be free within the timetable. Lifecycle and role
    /// checks happen in the mutation gate, not here.
    pub fn create_slot(
        &self,
        timetable_id: i64,
        fields: &SlotFields,
    ) -> Result<i64, TimetableError> {
        let db = self.db.lock().unwrap();

        Self::check_references_locked(&db, fields)?;
        Self::check_cell_free_locked(&db, timetable_id, fields, None)?;

        db.execute(
            "INSERT INTO slots (
                timetable_id, day, start_min, end_min,
                subject_id, teacher_id, room, slot_type, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, datetime('now'))",
            (
                timetable_id,
                fields.day,
                fields.start_min,
                fields.end_min,
                fields.subject_id,
                fields.teacher_id,
                &fields.room,
                fields.slot_type,
            ),
        )?;

        Ok(db.last_insert_rowid())
    }

    /// Replaces a slot's mutable attributes
    pub fn update_slot(&self, slot_id: i64, fields: &SlotFields) -> Result<DbSlot, TimetableError> {
        let db = self.db.lock().unwrap();
        let existing = Self::get_slot_locked(&db, slot_id)?;

        Self::check_references_locked(&db, fields)?;
        Self::check_cell_free_locked(&db, existing.timetable_id, fields, Some(slot_id))?;

        db.execute(
            "UPDATE slots SET day = ?1, start_min = ?2, end_min = ?3,
                subject_id = ?4, teacher_id = ?5, room = ?6, slot_type = ?7
             WHERE slot_id = ?8",
            (
                fields.day,
                fields.start_min,
                fields.end_min,
                fields.subject_id,
                fields.teacher_id,
                &fields.room,
                fields.slot_type,
                slot_id,
            ),
        )?;

        Self::get_slot_locked(&db, slot_id)
    }

    pub fn delete_slot(&self, slot_id: i64) -> Result<(), TimetableError> {
        let db = self.db.lock().unwrap();
        let affected = db.execute("DELETE FROM slots WHERE slot_id = ?", [slot_id])?;
        if affected == 0 {
            return Err(TimetableError::not_found("Slot", slot_id));
        }
        Ok(())
    }

    pub fn get_slot(&self, slot_id: i64) -> Result<DbSlot, TimetableError> {
        let db = self.db.lock().unwrap();
        Self::get_slot_locked(&db, slot_id)
    }

    /// Gets all slots for a timetable, each with its subject and teacher
    /// names for grid annotation
    pub fn annotated_slots(
        &self,
        timetable_id: i64,
    ) -> Result<Vec<(DbSlot, String, String)>, TimetableError> {
        let db = self.db.lock().unwrap();
        let mut stmt = db.prepare(
            "SELECT s.slot_id, s.timetable_id, s.day, s.start_min, s.end_min,
                    s.subject_id, s.teacher_id, s.room, s.slot_type,
                    sub.name, t.name
             FROM slots s
             JOIN subjects sub ON s.subject_id = sub.subject_id
             JOIN teachers t ON s.teacher_id = t.teacher_id
             WHERE s.timetable_id = ?",
        )?;

        let slots = stmt
            .query_map([timetable_id], |row| {
                Ok((
                    DbSlot {
                        slot_id: row.get(0)?,
                        timetable_id: row.get(1)?,
                        day: row.get(2)?,
                        start_min: row.get(3)?,
                        end_min: row.get(4)?,
                        subject_id: row.get(5)?,
                        teacher_id: row.get(6)?,
                        room: row.get(7)?,
                        slot_type: row.get(8)?,
                    },
                    row.get::<_, String>(9)?,
                    row.get::<_, String>(10)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(slots)
    }

    fn get_slot_locked(db: &Connection, slot_id: i64) -> Result<DbSlot, TimetableError> {
        let query = format!("SELECT {SLOT_COLUMNS} FROM slots WHERE slot_id = ?");
        db.query_row(&query, [slot_id], |row| {
            Ok(DbSlot {
                slot_id: row.get(0)?,
                timetable_id: row.get(1)?,
                day: row.get(2)?,
                start_min: row.get(3)?,
                end_min: row.get(4)?,
                subject_id: row.get(5)?,
                teacher_id: row.get(6)?,
                room: row.get(7)?,
                slot_type: row.get(8)?,
            })
        })
        .optional()?
        .ok_or_else(|| TimetableError::not_found("Slot", slot_id))
    }

    fn check_references_locked(db: &Connection, fields: &SlotFields) -> Result<(), TimetableError> {
        let subject_count: i64 = db.query_row(
            "SELECT COUNT(*) FROM subjects WHERE subject_id = ?",
            [fields.subject_id],
            |row| row.get(0),
        )?;
        if subject_count == 0 {
            return Err(TimetableError::not_found("Subject", fields.subject_id));
        }

        let teacher_count: i64 = db.query_row(
            "SELECT COUNT(*) FROM teachers WHERE teacher_id = ?",
            [fields.teacher_id],
            |row| row.get(0),
        )?;
        if teacher_count == 0 {
            return Err(TimetableError::not_found("Teacher", fields.teacher_id));
        }

        Ok(())
    }

    /// At most one slot per (day, start, end) cell within a timetable.
    fn check_cell_free_locked(
        db: &Connection,
        timetable_id: i64,
        fields: &SlotFields,
        exclude_slot: Option<i64>,
    ) -> Result<(), TimetableError> {
        let occupied: i64 = db.query_row(
            "SELECT COUNT(*) FROM slots
             WHERE timetable_id = ?1 AND day = ?2 AND start_min = ?3 AND end_min = ?4
               AND slot_id != ?5",
            (
                timetable_id,
                fields.day,
                fields.start_min,
                fields.end_min,
                exclude_slot.unwrap_or(-1),
            ),
            |row| row.get(0),
        )?;

        if occupied > 0 {
            return Err(TimetableError::validation(format!(
                "Cell {} {}-{} is already occupied in this timetable",
                fields.day.as_str(),
                crate::grid::minutes_label(fields.start_min),
                crate::grid::minutes_label(fields.end_min),
            )));
        }

        Ok(())
    }

    /// Number of slots currently stored for a timetable
    pub fn slot_count(&self, timetable_id: i64) -> Result<i64, TimetableError> {
        let db = self.db.lock().unwrap();
        let count = db.query_row(
            "SELECT COUNT(*) FROM slots WHERE timetable_id = ?",
            [timetable_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::DayOfWeek;

    fn fields(day: DayOfWeek, start_min: u16, subject_id: i64, teacher_id: i64) -> SlotFields {
        SlotFields {
            day,
            start_min,
            end_min: start_min + 60,
            subject_id,
            teacher_id,
            room: Some("A1".to_string()),
            slot_type: SlotType::Lecture,
        }
    }

    fn seeded() -> (TimetableDbManager, i64, i64, i64) {
        let db = TimetableDbManager::in_memory();
        let tt = db.create_timetable("BCA", "3", "2025-26", "CSE").unwrap();
        let subject = db.insert_subject("Data Structures", "DS").unwrap();
        let teacher = db.insert_teacher("Prof. X").unwrap();
        (db, tt, subject, teacher)
    }

    #[test]
    fn test_timetable_starts_as_draft() {
        let (db, tt, _, _) = seeded();
        let timetable = db.get_timetable(tt).unwrap();
        assert_eq!(timetable.state, TimetableState::Draft);
        assert_eq!(timetable.department, "CSE");
    }

    #[test]
    fn test_get_unknown_timetable_is_not_found() {
        let db = TimetableDbManager::in_memory();
        let err = db.get_timetable(42).unwrap_err();
        assert!(matches!(err, TimetableError::NotFound { .. }));
    }

    #[test]
    fn test_publish_then_publish_again_fails() {
        let (db, tt, _, _) = seeded();
        let published = db.publish_timetable(tt).unwrap();
        assert_eq!(published.state, TimetableState::Published);

        let err = db.publish_timetable(tt).unwrap_err();
        assert!(matches!(
            err,
            TimetableError::InvalidState {
                state: TimetableState::Published
            }
        ));
    }

    #[test]
    fn test_slot_crud_roundtrip() {
        let (db, tt, subject, teacher) = seeded();
        let slot_id = db
            .create_slot(tt, &fields(DayOfWeek::Monday, 540, subject, teacher))
            .unwrap();

        let slot = db.get_slot(slot_id).unwrap();
        assert_eq!(slot.day, DayOfWeek::Monday);
        assert_eq!(slot.start_min, 540);
        assert_eq!(slot.end_min, 600);
        assert_eq!(slot.slot_type, SlotType::Lecture);

        let updated = db
            .update_slot(slot_id, &fields(DayOfWeek::Tuesday, 600, subject, teacher))
            .unwrap();
        assert_eq!(updated.day, DayOfWeek::Tuesday);
        assert_eq!(updated.start_min, 600);

        db.delete_slot(slot_id).unwrap();
        assert!(matches!(
            db.get_slot(slot_id).unwrap_err(),
            TimetableError::NotFound { .. }
        ));
    }

    #[test]
    fn test_occupied_cell_rejected() {
        let (db, tt, subject, teacher) = seeded();
        db.create_slot(tt, &fields(DayOfWeek::Monday, 540, subject, teacher))
            .unwrap();

        let err = db
            .create_slot(tt, &fields(DayOfWeek::Monday, 540, subject, teacher))
            .unwrap_err();
        assert!(matches!(err, TimetableError::Validation { .. }));

        // Same cell in a different timetable is fine.
        let other = db.create_timetable("BBA", "1", "2025-26", "MGMT").unwrap();
        db.create_slot(other, &fields(DayOfWeek::Monday, 540, subject, teacher))
            .unwrap();
    }

    #[test]
    fn test_update_keeping_own_cell_is_allowed() {
        let (db, tt, subject, teacher) = seeded();
        let slot_id = db
            .create_slot(tt, &fields(DayOfWeek::Monday, 540, subject, teacher))
            .unwrap();

        // Same cell, different room: must not collide with itself.
        let mut f = fields(DayOfWeek::Monday, 540, subject, teacher);
        f.room = Some("B2".to_string());
        let updated = db.update_slot(slot_id, &f).unwrap();
        assert_eq!(updated.room.as_deref(), Some("B2"));
    }

    #[test]
    fn test_unknown_subject_or_teacher_rejected() {
        let (db, tt, subject, teacher) = seeded();

        let err = db
            .create_slot(tt, &fields(DayOfWeek::Monday, 540, 999, teacher))
            .unwrap_err();
        assert!(matches!(err, TimetableError::NotFound { what: "Subject", .. }));

        let err = db
            .create_slot(tt, &fields(DayOfWeek::Monday, 540, subject, 999))
            .unwrap_err();
        assert!(matches!(err, TimetableError::NotFound { what: "Teacher", .. }));
    }

    #[test]
    fn test_annotated_slots_carry_names() {
        let (db, tt, subject, teacher) = seeded();
        db.create_slot(tt, &fields(DayOfWeek::Friday, 600, subject, teacher))
            .unwrap();

        let slots = db.annotated_slots(tt).unwrap();
        assert_eq!(slots.len(), 1);
        let (slot, subject_name, teacher_name) = &slots[0];
        assert_eq!(slot.day, DayOfWeek::Friday);
        assert_eq!(subject_name, "Data Structures");
        assert_eq!(teacher_name, "Prof. X");
    }
}
