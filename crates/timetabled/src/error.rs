//! Error types for the timetable slot grid service.

use thiserror::Error;

use crate::db::types::TimetableState;

/// Errors that can occur during timetable operations.
#[derive(Debug, Error)]
pub enum TimetableError {
    /// Request payload failed validation (missing field, malformed time,
    /// non-canonical time range, occupied grid cell)
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// No caller claims were supplied, or they could not be parsed
    #[error("Unauthenticated: {message}")]
    Unauthenticated { message: String },

    /// Caller's role or department does not permit the operation
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    /// The timetable lifecycle state does not allow the operation
    #[error("Timetable is {state}; slots can only change while it is DRAFT")]
    InvalidState { state: TimetableState },

    /// Referenced entity does not exist
    #[error("{what} not found: {id}")]
    NotFound { what: &'static str, id: String },

    /// Underlying storage failure
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),
}

impl TimetableError {
    pub fn validation(message: impl Into<String>) -> Self {
        TimetableError::Validation {
            message: message.into(),
        }
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        TimetableError::Unauthenticated {
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        TimetableError::Forbidden {
            message: message.into(),
        }
    }

    pub fn not_found(what: &'static str, id: impl ToString) -> Self {
        TimetableError::NotFound {
            what,
            id: id.to_string(),
        }
    }

    /// Returns true if the error is caused by the caller (bad input, bad
    /// claims, wrong lifecycle state) rather than by the service.
    pub fn is_caller_fault(&self) -> bool {
        !matches!(self, TimetableError::Db(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_state_names_the_state() {
        let err = TimetableError::InvalidState {
            state: TimetableState::Published,
        };
        assert!(err.to_string().contains("PUBLISHED"));
    }

    #[test]
    fn test_caller_fault_classification() {
        assert!(TimetableError::validation("bad time").is_caller_fault());
        assert!(TimetableError::forbidden("wrong role").is_caller_fault());
        assert!(!TimetableError::Db(rusqlite::Error::InvalidQuery).is_caller_fault());
    }
}
