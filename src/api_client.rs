use async_trait::async_trait;
use axum::http::{Method, StatusCode};
use serde::Deserialize;
use std::{collections::HashMap, sync::Arc, time::Duration};
use thiserror::Error;
use tracing::warn;

use crate::models::LoginUser;

/// ApiError
///
/// Failures talking to the EMS REST backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend answered 401. Callers tear the session down.
    #[error("backend rejected the credentials or session")]
    Unauthorized,
    #[error("backend resource not found")]
    NotFound,
    #[error("backend returned {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("backend unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed backend response: {0}")]
    Decode(String),
}

impl ApiError {
    /// login_message
    ///
    /// The message the login page shows for this failure.
    pub fn login_message(&self) -> String {
        match self {
            ApiError::Unauthorized => "Invalid email or password".to_string(),
            ApiError::NotFound => "User not found".to_string(),
            ApiError::Rejected { message, .. } if !message.is_empty() => message.clone(),
            ApiError::Transport(_) => "Network error. Please check your connection.".to_string(),
            _ => "Login failed. Please try again.".to_string(),
        }
    }

    /// Status the login page is rendered with for this failure.
    pub fn login_status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            // A 2xx envelope with `success: false` is still a refusal.
            ApiError::Rejected { status, .. } => StatusCode::from_u16(*status)
                .ok()
                .filter(|s| s.is_client_error() || s.is_server_error())
                .unwrap_or(StatusCode::BAD_REQUEST),
            ApiError::Transport(_) | ApiError::Decode(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

/// ForwardRequest
///
/// A console API call relayed to the backend by the proxy route.
#[derive(Debug, Clone)]
pub struct ForwardRequest {
    pub method: Method,
    /// Backend path without leading slash, e.g. `departments/`.
    pub path: String,
    pub query: Option<String>,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

/// ForwardResponse
///
/// The backend's answer, relayed verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

/// BackendApi
///
/// Contract for every call the console makes to the EMS REST backend. The HTTP client is used
/// at runtime; `MockBackendApi` stands in for it in tests.
#[async_trait]
pub trait BackendApi: Send + Sync {
    /// Authenticates the credentials against `POST /login/`.
    async fn login(&self, email: &str, password: &str) -> Result<LoginUser, ApiError>;

    /// Relays a request. A 401 from the backend is returned as `ApiError::Unauthorized`;
    /// every other status is returned as a `ForwardResponse`.
    async fn forward(&self, request: ForwardRequest) -> Result<ForwardResponse, ApiError>;
}

/// ApiState
///
/// The type shared through the application state.
pub type ApiState = Arc<dyn BackendApi>;

// --- Backend wire format ---

#[derive(Deserialize)]
struct LoginEnvelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
    user: Option<BackendUser>,
}

#[derive(Deserialize)]
struct BackendUser {
    email: String,
    eid: EmployeeId,
    role: String,
    #[serde(rename = "fullName", default)]
    full_name: Option<String>,
}

/// The backend serialises `eid` as a number; older endpoints used strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum EmployeeId {
    Number(i64),
    Text(String),
}

impl EmployeeId {
    fn into_string(self) -> String {
        match self {
            EmployeeId::Number(n) => n.to_string(),
            EmployeeId::Text(s) => s,
        }
    }
}

impl From<BackendUser> for LoginUser {
    fn from(user: BackendUser) -> Self {
        let full_name = user
            .full_name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| user.email.split('@').next().unwrap_or_default().to_string());
        LoginUser {
            email: user.email,
            eid: user.eid.into_string(),
            role: user.role,
            full_name,
        }
    }
}

// --- The real implementation ---

/// HttpBackendApi
///
/// `reqwest` client bound to the backend base URL.
#[derive(Clone)]
pub struct HttpBackendApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackendApi {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl BackendApi for HttpBackendApi {
    async fn login(&self, email: &str, password: &str) -> Result<LoginUser, ApiError> {
        let response = self
            .client
            .post(self.url("login/"))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        let status = response.status();
        let envelope = response.json::<LoginEnvelope>().await;

        match status {
            StatusCode::UNAUTHORIZED => return Err(ApiError::Unauthorized),
            StatusCode::NOT_FOUND => return Err(ApiError::NotFound),
            s if !s.is_success() => {
                let message = envelope.ok().and_then(|e| e.message).unwrap_or_default();
                return Err(ApiError::Rejected {
                    status: s.as_u16(),
                    message,
                });
            }
            _ => {}
        }

        let envelope = envelope.map_err(|e| ApiError::Decode(e.to_string()))?;
        match (envelope.success, envelope.user) {
            (true, Some(user)) => Ok(user.into()),
            _ => Err(ApiError::Rejected {
                status: status.as_u16(),
                message: envelope.message.unwrap_or_default(),
            }),
        }
    }

    async fn forward(&self, request: ForwardRequest) -> Result<ForwardResponse, ApiError> {
        let mut url = self.url(&request.path);
        if let Some(query) = request.query.as_deref().filter(|q| !q.is_empty()) {
            url.push('?');
            url.push_str(query);
        }

        let mut builder = self.client.request(request.method.clone(), url);
        if let Some(content_type) = &request.content_type {
            builder = builder.header(reqwest::header::CONTENT_TYPE, content_type);
        }
        if !request.body.is_empty() {
            builder = builder.body(request.body);
        }

        let response = builder.send().await?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            warn!(path = %request.path, "backend answered 401");
            return Err(ApiError::Unauthorized);
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?.to_vec();

        Ok(ForwardResponse {
            status: status.as_u16(),
            content_type,
            body,
        })
    }
}

// --- The mock implementation (for tests) ---

/// MockBackendApi
///
/// In-memory backend used by the integration tests. Accounts are keyed by email; forwarded
/// requests answer with `forward_status` and echo the requested path.
#[derive(Clone, Default)]
pub struct MockBackendApi {
    accounts: HashMap<String, (String, LoginUser)>,
    /// Status returned by `forward`. Defaults to 200.
    pub forward_status: Option<u16>,
    /// When true, every call fails as if the backend were down.
    pub unreachable: bool,
}

impl MockBackendApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(mut self, email: &str, password: &str, eid: &str, role: &str) -> Self {
        let user = LoginUser {
            email: email.to_string(),
            eid: eid.to_string(),
            role: role.to_string(),
            full_name: email.split('@').next().unwrap_or_default().to_string(),
        };
        self.accounts
            .insert(email.to_string(), (password.to_string(), user));
        self
    }

    pub fn with_forward_status(mut self, status: u16) -> Self {
        self.forward_status = Some(status);
        self
    }

    pub fn new_unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl BackendApi for MockBackendApi {
    async fn login(&self, email: &str, password: &str) -> Result<LoginUser, ApiError> {
        if self.unreachable {
            return Err(ApiError::Rejected {
                status: StatusCode::BAD_GATEWAY.as_u16(),
                message: String::new(),
            });
        }
        match self.accounts.get(email) {
            None => Err(ApiError::NotFound),
            Some((expected, _)) if expected != password => Err(ApiError::Unauthorized),
            Some((_, user)) => Ok(user.clone()),
        }
    }

    async fn forward(&self, request: ForwardRequest) -> Result<ForwardResponse, ApiError> {
        if self.unreachable {
            return Err(ApiError::Decode("mock backend unreachable".to_string()));
        }
        let status = self.forward_status.unwrap_or(200);
        if status == StatusCode::UNAUTHORIZED.as_u16() {
            return Err(ApiError::Unauthorized);
        }
        let body = serde_json::json!({
            "method": request.method.as_str(),
            "path": request.path,
            "query": request.query,
        });
        Ok(ForwardResponse {
            status,
            content_type: Some("application/json".to_string()),
            body: body.to_string().into_bytes(),
        })
    }
}
