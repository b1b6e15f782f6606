use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

// --- Session Schemas ---

/// Role
///
/// The closed set of console roles. `None` stands for "no recognised role" and is what any
/// unknown or empty role string normalises to. The guard never grants a non-public route to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    Admin,
    Hr,
    Employee,
    #[default]
    None,
}

impl Role {
    /// The roles a session can legitimately carry.
    pub const KNOWN: [Role; 3] = [Role::Admin, Role::Hr, Role::Employee];

    /// parse
    ///
    /// Normalises a free-form role string coming from the backend or a session token.
    /// Matching is done on the trimmed, lower-cased value; anything else maps to `Role::None`.
    pub fn parse(raw: &str) -> Role {
        match raw.trim().to_ascii_lowercase().as_str() {
            "admin" => Role::Admin,
            "hr" => Role::Hr,
            "employee" => Role::Employee,
            _ => Role::None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Hr => "hr",
            Role::Employee => "employee",
            Role::None => "none",
        }
    }

    pub fn is_known(self) -> bool {
        self != Role::None
    }
}

/// Session
///
/// The console's current authentication snapshot. Built fresh from the request on every
/// navigation by the session adapter in `auth.rs`, then handed by value/reference to the guard.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    pub is_authenticated: bool,
    pub role: Role,
    /// The backend's employee id (`eid`).
    pub user_id: Option<String>,
    pub email: Option<String>,
    pub full_name: Option<String>,
}

impl Session {
    /// The session of a visitor who has not logged in.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn signed_in(role: Role, user_id: impl Into<String>) -> Self {
        Self {
            is_authenticated: true,
            role,
            user_id: Some(user_id.into()),
            email: None,
            full_name: None,
        }
    }

    /// True when the session breaks the "authenticated implies a known role" invariant.
    pub fn is_malformed(&self) -> bool {
        self.is_authenticated && !self.role.is_known()
    }
}

/// SessionInfo
///
/// JSON view of the session served at `GET /api/session` for the client bundle.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SessionInfo {
    pub authenticated: bool,
    pub role: Role,
    pub user_id: Option<String>,
    pub email: Option<String>,
    pub full_name: Option<String>,
    /// Landing path for this session.
    pub home: String,
}

// --- Login Payloads ---

/// LoginForm
///
/// Credentials posted by the login page (`application/x-www-form-urlencoded`).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// LoginUser
///
/// The user record returned by the backend's `/login/` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginUser {
    pub email: String,
    pub eid: String,
    pub role: String,
    #[serde(rename = "fullName", default)]
    pub full_name: String,
}

// --- Payroll Payloads ---

/// SalaryInput
///
/// The editable salary components of the salary form.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct SalaryInput {
    #[ts(type = "string")]
    #[schema(value_type = String, example = "100000.00")]
    pub basic_salary: Decimal,
    #[ts(type = "string")]
    #[schema(value_type = String, example = "2500.00")]
    pub internet_charges: Decimal,
    #[ts(type = "string")]
    #[schema(value_type = String, example = "15000.00")]
    pub allowances: Decimal,
    #[ts(type = "string")]
    #[schema(value_type = String, example = "1000.00")]
    pub deductions: Decimal,
}

/// SalaryBreakdown
///
/// Derived contribution and net figures, each rounded to two decimal places.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SalaryBreakdown {
    #[ts(type = "string")]
    #[schema(value_type = String)]
    pub epf_employee: Decimal,
    #[ts(type = "string")]
    #[schema(value_type = String)]
    pub epf_employer: Decimal,
    #[ts(type = "string")]
    #[schema(value_type = String)]
    pub etf_employer: Decimal,
    #[ts(type = "string")]
    #[schema(value_type = String)]
    pub net_salary: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LeaveDaysRequest {
    #[ts(type = "string")]
    pub from_date: NaiveDate,
    #[ts(type = "string")]
    pub to_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LeaveDaysResponse {
    pub days: u32,
}

/// ErrorBody
///
/// Uniform JSON error payload for the `/api` endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
