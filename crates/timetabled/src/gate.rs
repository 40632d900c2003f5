//! The mutation gate: role and lifecycle authorization for timetable
//! operations.
//!
//! Claims are an explicit value passed into each check, extracted from the
//! request by server middleware. Wrong role and wrong lifecycle state are
//! distinct failures (`Forbidden` vs `InvalidState`) so API consumers can
//! react appropriately.

use crate::db::types::{DbTimetable, TimetableState};
use crate::error::TimetableError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallerRole {
    Admin,
    Hod,
    Teacher,
    Student,
}

impl CallerRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallerRole::Admin => "admin",
            CallerRole::Hod => "hod",
            CallerRole::Teacher => "teacher",
            CallerRole::Student => "student",
        }
    }

    pub fn parse(s: &str) -> Option<CallerRole> {
        match s.to_ascii_lowercase().as_str() {
            "admin" => Some(CallerRole::Admin),
            "hod" => Some(CallerRole::Hod),
            "teacher" => Some(CallerRole::Teacher),
            "student" => Some(CallerRole::Student),
            _ => None,
        }
    }
}

/// The capability claim accompanying a request. Issued externally; this
/// service consumes it, it never mints one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerClaims {
    pub role: CallerRole,
    /// Department code the claim covers. Required for the HOD role.
    pub department: Option<String>,
}

impl CallerClaims {
    pub fn admin() -> Self {
        CallerClaims {
            role: CallerRole::Admin,
            department: None,
        }
    }

    pub fn hod(department: impl Into<String>) -> Self {
        CallerClaims {
            role: CallerRole::Hod,
            department: Some(department.into()),
        }
    }

    pub fn member(role: CallerRole) -> Self {
        CallerClaims {
            role,
            department: None,
        }
    }
}

/// Authorizes a slot create/update/delete against the given timetable.
///
/// Preconditions, checked in order:
/// 1. caller holds the HOD capability for the timetable's department;
/// 2. the timetable is still DRAFT.
pub fn authorize_slot_mutation(
    claims: &CallerClaims,
    timetable: &DbTimetable,
) -> Result<(), TimetableError> {
    match (claims.role, claims.department.as_deref()) {
        (CallerRole::Hod, Some(dept)) if dept == timetable.department => {}
        (CallerRole::Hod, _) => {
            return Err(TimetableError::forbidden(format!(
                "HOD capability does not cover department {}",
                timetable.department
            )))
        }
        _ => {
            return Err(TimetableError::forbidden(
                "Only the department HOD can modify timetable slots",
            ))
        }
    }

    if timetable.state != TimetableState::Draft {
        return Err(TimetableError::InvalidState {
            state: timetable.state,
        });
    }

    Ok(())
}

/// Authorizes operations reserved for college admins: creating and
/// publishing timetables, registering subjects and teachers.
pub fn authorize_admin(claims: &CallerClaims) -> Result<(), TimetableError> {
    if claims.role == CallerRole::Admin {
        Ok(())
    } else {
        Err(TimetableError::forbidden(
            "Only a college admin can perform this operation",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timetable(state: TimetableState) -> DbTimetable {
        DbTimetable {
            timetable_id: 1,
            course: "BCA".to_string(),
            semester: "3".to_string(),
            academic_year: "2025-26".to_string(),
            department: "CSE".to_string(),
            state,
        }
    }

    #[test]
    fn test_hod_of_department_can_mutate_draft() {
        let tt = timetable(TimetableState::Draft);
        assert!(authorize_slot_mutation(&CallerClaims::hod("CSE"), &tt).is_ok());
    }

    #[test]
    fn test_non_hod_rejected_regardless_of_state() {
        for state in [TimetableState::Draft, TimetableState::Published] {
            let tt = timetable(state);
            for role in [CallerRole::Admin, CallerRole::Teacher, CallerRole::Student] {
                let err =
                    authorize_slot_mutation(&CallerClaims::member(role), &tt).unwrap_err();
                assert!(matches!(err, TimetableError::Forbidden { .. }), "{role:?}");
            }
        }
    }

    #[test]
    fn test_hod_of_other_department_rejected() {
        let tt = timetable(TimetableState::Draft);
        let err = authorize_slot_mutation(&CallerClaims::hod("MECH"), &tt).unwrap_err();
        assert!(matches!(err, TimetableError::Forbidden { .. }));
    }

    #[test]
    fn test_hod_without_department_claim_rejected() {
        let tt = timetable(TimetableState::Draft);
        let claims = CallerClaims {
            role: CallerRole::Hod,
            department: None,
        };
        let err = authorize_slot_mutation(&claims, &tt).unwrap_err();
        assert!(matches!(err, TimetableError::Forbidden { .. }));
    }

    #[test]
    fn test_published_rejected_even_for_the_right_hod() {
        let tt = timetable(TimetableState::Published);
        let err = authorize_slot_mutation(&CallerClaims::hod("CSE"), &tt).unwrap_err();
        assert!(matches!(
            err,
            TimetableError::InvalidState {
                state: TimetableState::Published
            }
        ));
    }

    #[test]
    fn test_admin_gate() {
        assert!(authorize_admin(&CallerClaims::admin()).is_ok());
        let err = authorize_admin(&CallerClaims::hod("CSE")).unwrap_err();
        assert!(matches!(err, TimetableError::Forbidden { .. }));
    }

    #[test]
    fn test_role_parse() {
        assert_eq!(CallerRole::parse("HOD"), Some(CallerRole::Hod));
        assert_eq!(CallerRole::parse("admin"), Some(CallerRole::Admin));
        assert_eq!(CallerRole::parse("principal"), None);
    }
}
