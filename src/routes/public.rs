use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Endpoints reachable without a session. Console pages are not listed here: they reach
/// `handlers::console_page` through the router fallback, where the route table decides.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for load balancers.
        .route("/health", get(|| async { "ok" }))
        // GET /login renders the login view; POST /login signs in.
        .route("/login", get(handlers::console_page).post(handlers::login))
        // GET|POST /logout
        // Destroys the session cookie and redirects to /login.
        .route("/logout", get(handlers::logout).post(handlers::logout))
        // GET /api/session
        // Session snapshot for the client bundle (anonymous when signed out).
        .route("/api/session", get(handlers::get_session_info))
}
