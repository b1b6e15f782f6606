//! Authorization guard.
//!
//! A single pure function decides, for a session and the capability a route requires, whether
//! the route may be mounted or where the visitor has to be sent instead. Every route in the
//! console goes through it; there are no per-route role checks anywhere else.

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::models::{Role, Session};

pub const LOGIN_PATH: &str = "/login";
pub const ACCESS_DENIED_PATH: &str = "/access-denied";
pub const DASHBOARD_PATH: &str = "/dashboard";
pub const EMPLOYEE_DASHBOARD_PATH: &str = "/employee-dashboard";

/// Capability
///
/// The access level a route requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Capability {
    Public,
    Authenticated,
    Admin,
    HrOrAdmin,
    Employee,
}

impl Capability {
    pub const ALL: [Capability; 5] = [
        Capability::Public,
        Capability::Authenticated,
        Capability::Admin,
        Capability::HrOrAdmin,
        Capability::Employee,
    ];
}

/// AuthDecision
///
/// Outcome of a single guard evaluation. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthDecision {
    Allow,
    RedirectTo(&'static str),
}

impl AuthDecision {
    pub fn is_allowed(self) -> bool {
        matches!(self, AuthDecision::Allow)
    }

    /// into_api_result
    ///
    /// JSON endpoints cannot follow a page redirect, so the decision is expressed as a status:
    /// a login redirect becomes 401 and any other redirect 403.
    pub fn into_api_result(self) -> Result<(), StatusCode> {
        match self {
            AuthDecision::Allow => Ok(()),
            AuthDecision::RedirectTo(LOGIN_PATH) => Err(StatusCode::UNAUTHORIZED),
            AuthDecision::RedirectTo(_) => Err(StatusCode::FORBIDDEN),
        }
    }
}

/// authorize
///
/// Evaluates the policy table top to bottom, first match wins:
///
/// 1. public routes are always allowed;
/// 2. an unauthenticated session goes to the login page;
/// 3. an authenticated session without a recognised role is denied (fail closed);
/// 4. `Authenticated` allows any remaining session;
/// 5. `Admin`, `HrOrAdmin` and `Employee` compare the role and deny on mismatch.
pub fn authorize(session: &Session, capability: Capability) -> AuthDecision {
    if capability == Capability::Public {
        return AuthDecision::Allow;
    }
    if !session.is_authenticated {
        return AuthDecision::RedirectTo(LOGIN_PATH);
    }
    if session.is_malformed() {
        return AuthDecision::RedirectTo(ACCESS_DENIED_PATH);
    }

    let granted = match capability {
        Capability::Public | Capability::Authenticated => true,
        Capability::Admin => session.role == Role::Admin,
        Capability::HrOrAdmin => matches!(session.role, Role::Hr | Role::Admin),
        Capability::Employee => session.role == Role::Employee,
    };

    if granted {
        AuthDecision::Allow
    } else {
        AuthDecision::RedirectTo(ACCESS_DENIED_PATH)
    }
}
