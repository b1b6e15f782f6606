use std::convert::Infallible;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, HeaderValue, header, request::Parts},
};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    config::{AppConfig, Env, MAX_SESSION_TTL_SECS},
    models::{LoginUser, Role, Session},
};

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "ems_session";

/// SessionClaims
///
/// Payload of the signed session token written at login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (sub): the backend's employee id.
    pub sub: String,
    /// Lower-cased role as written at login.
    pub role: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    /// Expiration Time (exp). Expired tokens read as signed out.
    pub exp: usize,
    /// Issued At (iat).
    pub iat: usize,
}

impl From<SessionClaims> for Session {
    fn from(claims: SessionClaims) -> Self {
        Session {
            is_authenticated: true,
            // Unknown role strings become Role::None here; the guard denies them.
            role: Role::parse(&claims.role),
            user_id: Some(claims.sub),
            email: non_empty(claims.email),
            full_name: non_empty(claims.name),
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

/// issue_session_token
///
/// Signs a session token for a user the backend has just authenticated.
/// The caller is responsible for having normalised the role.
pub fn issue_session_token(
    user: &LoginUser,
    role: Role,
    config: &AppConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now().timestamp().max(0) as usize;
    let ttl = config.session_ttl_secs.min(MAX_SESSION_TTL_SECS) as usize;
    let claims = SessionClaims {
        sub: user.eid.clone(),
        role: role.as_str().to_string(),
        email: user.email.clone(),
        name: user.full_name.clone(),
        iat: now,
        exp: now.saturating_add(ttl),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.session_secret.as_bytes()),
    )
}

/// decode_session_token
///
/// Verifies signature and expiry. Any failure reads as the anonymous session.
pub fn decode_session_token(token: &str, config: &AppConfig) -> Session {
    let decoding_key = DecodingKey::from_secret(config.session_secret.as_bytes());
    let mut validation = Validation::default();
    validation.validate_exp = true;
    validation.leeway = 0;

    match decode::<SessionClaims>(token, &decoding_key, &validation) {
        Ok(data) => Session::from(data.claims),
        Err(e) => {
            debug!(error = %e, "session token rejected");
            Session::anonymous()
        }
    }
}

/// get_session
///
/// The session store read. Looks at, in order: the local development bypass headers, a bearer
/// token, then the session cookie. Never fails; an absent or invalid session is anonymous.
pub fn get_session(headers: &HeaderMap, config: &AppConfig) -> Session {
    if config.env == Env::Local {
        if let Some(session) = local_bypass(headers) {
            return session;
        }
    }

    if let Some(token) = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
    {
        return decode_session_token(token.trim(), config);
    }

    match session_cookie_value(headers) {
        Some(token) => decode_session_token(&token, config),
        None => Session::anonymous(),
    }
}

/// Development bypass: `x-user-id` + `x-user-role` stand in for a token.
fn local_bypass(headers: &HeaderMap) -> Option<Session> {
    let user_id = headers.get("x-user-id")?.to_str().ok()?.trim();
    let role = headers.get("x-user-role")?.to_str().ok()?;
    if user_id.is_empty() {
        return None;
    }
    Some(Session::signed_in(Role::parse(role), user_id))
}

fn session_cookie_value(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// session_cookie
///
/// `Set-Cookie` value installing a freshly issued token.
pub fn session_cookie(token: &str, config: &AppConfig) -> Option<HeaderValue> {
    let mut cookie = format!(
        "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        config.session_ttl_secs.min(MAX_SESSION_TTL_SECS)
    );
    if config.cookie_secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie).ok()
}

/// cleared_session_cookie
///
/// `Set-Cookie` value tearing the session down.
pub fn cleared_session_cookie(config: &AppConfig) -> HeaderValue {
    if config.cookie_secure {
        HeaderValue::from_static("ems_session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0; Secure")
    } else {
        HeaderValue::from_static("ems_session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
    }
}

/// Session Extractor Implementation
///
/// Makes `Session` usable as a handler argument. It never rejects: navigation must always reach
/// the guard, which turns a missing session into a login redirect.
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
    AppConfig: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = AppConfig::from_ref(state);
        Ok(get_session(&parts.headers, &config))
    }
}
