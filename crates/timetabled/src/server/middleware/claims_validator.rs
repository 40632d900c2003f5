//! Extracts caller claims from externally-issued headers.
//!
//! Authentication itself lives outside this service; by the time a request
//! arrives here, a trusted front-end has attached `x-caller-role` and,
//! for HODs, `x-caller-department`. This middleware turns those headers
//! into an explicit `CallerClaims` value for the handlers.

use axum::extract::Request;
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use crate::error::TimetableError;
use crate::gate::{CallerClaims, CallerRole};
use crate::server::types::ApiErrorType;

pub const ROLE_HEADER: &str = "x-caller-role";
pub const DEPARTMENT_HEADER: &str = "x-caller-department";

pub async fn extract_claims(mut req: Request, next: Next) -> Response {
    match claims_from_headers(req.headers()) {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Err(e) => {
            warn!("Rejected request without valid claims: {}", e);
            ApiErrorType::from((
                StatusCode::UNAUTHORIZED,
                "Missing or invalid caller claims",
                Some(e.to_string()),
            ))
            .into_response()
        }
    }
}

fn claims_from_headers(headers: &HeaderMap) -> Result<CallerClaims, TimetableError> {
    let role_value = headers
        .get(ROLE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            TimetableError::unauthenticated(format!("Missing {ROLE_HEADER} header"))
        })?;

    let role = CallerRole::parse(role_value)
        .ok_or_else(|| TimetableError::unauthenticated(format!("Unknown role: {role_value}")))?;

    let department = headers
        .get(DEPARTMENT_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    if role == CallerRole::Hod && department.is_none() {
        return Err(TimetableError::unauthenticated(format!(
            "HOD claims require the {DEPARTMENT_HEADER} header"
        )));
    }

    Ok(CallerClaims { role, department })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderName, HeaderValue};

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in pairs {
            map.insert(
                HeaderName::from_bytes(k.as_bytes()).unwrap(),
                HeaderValue::from_str(v).unwrap(),
            );
        }
        map
    }

    #[test]
    fn test_admin_claims() {
        let claims = claims_from_headers(&headers(&[(ROLE_HEADER, "admin")])).unwrap();
        assert_eq!(claims.role, CallerRole::Admin);
        assert_eq!(claims.department, None);
    }

    #[test]
    fn test_hod_requires_department() {
        let err = claims_from_headers(&headers(&[(ROLE_HEADER, "hod")])).unwrap_err();
        assert!(matches!(err, TimetableError::Unauthenticated { .. }));

        let claims = claims_from_headers(&headers(&[
            (ROLE_HEADER, "hod"),
            (DEPARTMENT_HEADER, "CSE"),
        ]))
        .unwrap();
        assert_eq!(claims, CallerClaims::hod("CSE"));
    }

    #[test]
    fn test_missing_or_unknown_role_rejected() {
        assert!(claims_from_headers(&HeaderMap::new()).is_err());
        assert!(claims_from_headers(&headers(&[(ROLE_HEADER, "registrar")])).is_err());
    }
}
