//! Router Module Index
//!
//! The declarative console route table plus the HTTP routers, split by access level.
//! Console pages are gated by the table and the guard; the JSON API is gated by the
//! `require_session` layer applied in `create_router`.

/// The console's path -> capability -> view table.
pub mod table;

/// Login, logout, health and session info. No session required.
pub mod public;

/// The JSON API. Requires an authenticated session with a recognised role.
pub mod authenticated;
