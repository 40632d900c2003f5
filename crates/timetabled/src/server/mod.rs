use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::{middleware as mw, Router};

use crate::server::endpoints::{catalog, slots, status, timetables};
use crate::server::middleware::*;
use crate::types::AppState;

mod endpoints;
mod middleware;
mod types;

/// Creates a router that can be used by `axum`.
///
/// # Parameters
/// - `app_state`: The app server state.
///
/// # Returns
/// The router.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    // Everything except the health probe requires caller claims.
    let claims_router = Router::new()
        .route(
            "/timetables",
            get(timetables::get_timetables).post(timetables::post_timetable),
        )
        .route("/timetables/:id/grid", get(timetables::get_weekly_grid))
        .route("/timetables/:id/publish", put(timetables::put_publish))
        .route("/timetables/:id/slots", post(slots::post_slot))
        .route(
            "/slots/:id",
            put(slots::put_slot).delete(slots::delete_slot),
        )
        .route("/subjects", post(catalog::post_subject))
        .route("/teachers", post(catalog::post_teacher))
        .layer(mw::from_fn(claims_validator::extract_claims));

    Router::new()
        .route("/health", get(status::get_health))
        .merge(claims_router)
        .with_state(app_state)
}
