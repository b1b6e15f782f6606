use crate::{
    AppState,
    api_client::{ApiError, ForwardRequest},
    auth,
    guard::{self, Capability, LOGIN_PATH},
    models::{
        ErrorBody, LeaveDaysRequest, LeaveDaysResponse, LoginForm, Role, SalaryBreakdown,
        SalaryInput, Session, SessionInfo,
    },
    navigator::{self, MountedView, Navigation},
    payroll, views,
    views::ViewRef,
};
use axum::{
    Form, Json,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, Method, StatusCode, Uri, header},
    response::{IntoResponse, Redirect, Response},
};
use tracing::{error, info, warn};

// --- Console Navigation ---

/// console_page
///
/// [All Console Paths] Resolves the requested path through the route table and the guard, then
/// renders the view or the redirect. Registered as the router fallback and on `GET /login`.
pub async fn console_page(session: Session, State(state): State<AppState>, uri: Uri) -> Response {
    let navigation = navigator::navigate(&session, uri.path());
    views::render(navigation, &state.config)
}

// --- Login / Logout ---

fn login_page(session: &Session, state: &AppState, status: StatusCode, notice: &str) -> Response {
    let mounted = MountedView::new(ViewRef::Login, session).with_notice(status, notice);
    views::render(Navigation::Mount(mounted), &state.config)
}

/// login
///
/// [Public Route] Checks the credentials with the backend, writes the session cookie and sends
/// the user to their landing page. Failures re-render the login view with a message.
#[utoipa::path(
    post,
    path = "/login",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Signed in; redirected to the landing page"),
        (status = 400, description = "Missing credentials"),
        (status = 401, description = "Invalid credentials"),
        (status = 403, description = "Account has no console role"),
        (status = 404, description = "Unknown user")
    )
)]
pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    let anonymous = Session::anonymous();
    let email = form.email.trim();

    if email.is_empty() || form.password.is_empty() {
        return login_page(
            &anonymous,
            &state,
            StatusCode::BAD_REQUEST,
            "Email and password are required",
        );
    }

    let user = match state.api.login(email, &form.password).await {
        Ok(user) => user,
        Err(e) => {
            warn!(error = %e, "login rejected");
            return login_page(&anonymous, &state, e.login_status(), &e.login_message());
        }
    };

    let role = Role::parse(&user.role);
    if !role.is_known() {
        warn!(eid = %user.eid, role = %user.role, "login refused: unrecognised role");
        return login_page(
            &anonymous,
            &state,
            StatusCode::FORBIDDEN,
            "Your account has no console role",
        );
    }

    let token = match auth::issue_session_token(&user, role, &state.config) {
        Ok(token) => token,
        Err(e) => {
            error!(error = %e, "failed to sign session token");
            return login_page(
                &anonymous,
                &state,
                StatusCode::INTERNAL_SERVER_ERROR,
                "Login failed. Please try again.",
            );
        }
    };
    let Some(cookie) = auth::session_cookie(&token, &state.config) else {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };

    let session = Session::signed_in(role, user.eid.clone());
    info!(eid = %user.eid, role = role.as_str(), "login succeeded");

    (
        [(header::SET_COOKIE, cookie)],
        Redirect::to(navigator::resolve_root(&session)),
    )
        .into_response()
}

/// logout
///
/// [Public Route] Destroys the session and returns to the login page.
pub async fn logout(session: Session, State(state): State<AppState>) -> Response {
    if let Some(user_id) = &session.user_id {
        info!(eid = %user_id, "logout");
    }
    teardown(&state)
}

/// Session teardown: clear the cookie, force the login page.
fn teardown(state: &AppState) -> Response {
    (
        [(header::SET_COOKIE, auth::cleared_session_cookie(&state.config))],
        Redirect::to(LOGIN_PATH),
    )
        .into_response()
}

// --- JSON API ---

/// get_session_info
///
/// [Public Route] The current session as the client bundle sees it.
#[utoipa::path(
    get,
    path = "/api/session",
    responses((status = 200, description = "Current session", body = SessionInfo))
)]
pub async fn get_session_info(session: Session) -> Json<SessionInfo> {
    Json(SessionInfo {
        authenticated: session.is_authenticated,
        role: session.role,
        home: navigator::resolve_root(&session).to_string(),
        user_id: session.user_id,
        email: session.email,
        full_name: session.full_name,
    })
}

/// salary_breakdown
///
/// [HR/Admin Route] EPF/ETF contributions and net salary for the salary form.
#[utoipa::path(
    post,
    path = "/api/salary/breakdown",
    request_body = SalaryInput,
    responses(
        (status = 200, description = "Derived salary fields", body = SalaryBreakdown),
        (status = 400, description = "Invalid component", body = ErrorBody),
        (status = 403, description = "Not HR or admin")
    )
)]
pub async fn salary_breakdown(
    session: Session,
    Json(payload): Json<SalaryInput>,
) -> Result<Json<SalaryBreakdown>, Response> {
    guard::authorize(&session, Capability::HrOrAdmin)
        .into_api_result()
        .map_err(IntoResponse::into_response)?;

    payroll::salary_breakdown(&payload)
        .map(Json)
        .map_err(|e| (StatusCode::BAD_REQUEST, Json(ErrorBody::new(e.to_string()))).into_response())
}

/// leave_days
///
/// [Authenticated Route] Inclusive day count for a leave application.
#[utoipa::path(
    post,
    path = "/api/leave/days",
    request_body = LeaveDaysRequest,
    responses(
        (status = 200, description = "Number of days", body = LeaveDaysResponse),
        (status = 400, description = "Inverted range", body = ErrorBody)
    )
)]
pub async fn leave_days(
    Json(payload): Json<LeaveDaysRequest>,
) -> Result<Json<LeaveDaysResponse>, (StatusCode, Json<ErrorBody>)> {
    payroll::leave_days(payload.from_date, payload.to_date)
        .map(|days| Json(LeaveDaysResponse { days }))
        .map_err(|e| (StatusCode::BAD_REQUEST, Json(ErrorBody::new(e.to_string()))))
}

/// proxy_backend
///
/// [Authenticated Route] Relays a console API call to the EMS backend. A 401 from the backend
/// ends the session.
pub async fn proxy_backend(
    State(state): State<AppState>,
    method: Method,
    Path(path): Path<String>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request = ForwardRequest {
        method,
        path,
        query: uri.query().map(str::to_string),
        content_type: headers
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
        body: body.to_vec(),
    };

    match state.api.forward(request).await {
        Ok(forwarded) => {
            let status =
                StatusCode::from_u16(forwarded.status).unwrap_or(StatusCode::BAD_GATEWAY);
            let mut response = (status, forwarded.body).into_response();
            if let Some(content_type) = forwarded
                .content_type
                .and_then(|value| value.parse().ok())
            {
                response
                    .headers_mut()
                    .insert(header::CONTENT_TYPE, content_type);
            }
            response
        }
        Err(ApiError::Unauthorized) => {
            info!("backend ended the session");
            teardown(&state)
        }
        Err(e) => {
            error!(error = %e, "backend call failed");
            (StatusCode::BAD_GATEWAY, Json(ErrorBody::new(e.to_string()))).into_response()
        }
    }
}
