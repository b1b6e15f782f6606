use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{any, post},
};

/// Authenticated Router Module
///
/// JSON endpoints used by the console screens. The whole router sits behind the
/// `require_session` layer, so every handler here runs for a signed-in session with a
/// recognised role. Narrower role checks (e.g. HR/admin) happen inside the handler.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // POST /api/salary/breakdown
        // EPF/ETF and net salary for the salary form. HR or admin only.
        .route("/api/salary/breakdown", post(handlers::salary_breakdown))
        // POST /api/leave/days
        // Inclusive day count for leave applications.
        .route("/api/leave/days", post(handlers::leave_days))
        // ANY /api/backend/{*path}
        // Relays CRUD calls to the EMS backend. A backend 401 ends the session.
        .route("/api/backend/{*path}", any(handlers::proxy_backend))
}
