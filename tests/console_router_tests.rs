use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
};
use ems_console::{
    AppConfig, AppState, MockBackendApi, create_router,
    auth::{self, SESSION_COOKIE},
    config::Env,
    models::{LoginUser, Role, SalaryBreakdown, SessionInfo},
};
use std::sync::Arc;
use tower::util::ServiceExt;

// --- Helpers ---

fn config() -> AppConfig {
    AppConfig {
        env: Env::Production,
        ..AppConfig::default()
    }
}

fn app(api: MockBackendApi) -> Router {
    create_router(AppState {
        api: Arc::new(api),
        config: config(),
    })
}

fn backend() -> MockBackendApi {
    MockBackendApi::new()
        .with_account("admin@ems.lk", "admin-pass", "1", "Admin")
        .with_account("hr@ems.lk", "hr-pass", "2", "HR")
        .with_account("kamal@ems.lk", "emp-pass", "3", "Employee")
        .with_account("intern@ems.lk", "intern-pass", "4", "Intern")
}

fn token_for(role: Role, eid: &str) -> String {
    let user = LoginUser {
        email: format!("{eid}@ems.lk"),
        eid: eid.to_string(),
        role: role.as_str().to_string(),
        full_name: eid.to_string(),
    };
    auth::issue_session_token(&user, role, &config()).unwrap()
}

fn cookie(token: &str) -> String {
    format!("theme=dark; {SESSION_COOKIE}={token}")
}

async fn get(app: Router, path: &str, token: Option<&str>) -> Response {
    let mut builder = Request::builder().uri(path);
    if let Some(token) = token {
        builder = builder.header(header::COOKIE, cookie(token));
    }
    app.oneshot(builder.body(Body::empty()).unwrap()).await.unwrap()
}

async fn body_string(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

fn set_cookie(response: &Response) -> &str {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

async fn post_login(app: Router, body: &str) -> Response {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri("/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

// --- Console navigation ---

#[tokio::test]
async fn test_health_check() {
    let response = get(app(backend()), "/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ok");
}

#[tokio::test]
async fn test_protected_page_redirects_to_login() {
    let response = get(app(backend()), "/dashboard", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_hr_mounts_dashboard() {
    let token = token_for(Role::Hr, "2");
    let response = get(app(backend()), "/dashboard", Some(&token)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        "no-store"
    );
    let html = body_string(response).await;
    assert!(html.contains("data-view=\"dashboard\""));
    assert!(html.contains("data-layout=\"main\""));
}

#[tokio::test]
async fn test_bearer_token_is_accepted() {
    let token = token_for(Role::Employee, "3");
    let response = app(backend())
        .oneshot(
            Request::builder()
                .uri("/employee-leaves")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_employee_is_denied_settings() {
    let token = token_for(Role::Employee, "3");
    let response = get(app(backend()), "/settings", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/access-denied");
}

#[tokio::test]
async fn test_access_denied_page_links_home() {
    let token = token_for(Role::Employee, "3");
    let response = get(app(backend()), "/access-denied", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.contains("href=\"/employee-dashboard\""));
}

#[tokio::test]
async fn test_root_redirects_to_role_landing() {
    let admin = token_for(Role::Admin, "1");
    let response = get(app(backend()), "/", Some(&admin)).await;
    assert_eq!(location(&response), "/dashboard");

    let employee = token_for(Role::Employee, "3");
    let response = get(app(backend()), "/", Some(&employee)).await;
    assert_eq!(location(&response), "/employee-dashboard");

    let response = get(app(backend()), "/", None).await;
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_unknown_page_renders_not_found() {
    let response = get(app(backend()), "/does-not-exist", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_string(response).await.contains("data-view=\"not-found\""));
}

#[tokio::test]
async fn test_route_params_in_shell() {
    let token = token_for(Role::Admin, "1");
    let response = get(app(backend()), "/profile/E-12", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.contains("data-view=\"employee-profile-view\""));
    assert!(html.contains("data-params=\"{&quot;eid&quot;:&quot;E-12&quot;}\""));
}

#[tokio::test]
async fn test_tampered_token_reads_as_signed_out() {
    let token = token_for(Role::Admin, "1");
    let tampered = format!("{}x", token);
    let response = get(app(backend()), "/settings", Some(&tampered)).await;
    assert_eq!(location(&response), "/login");
}

// --- Login collaborator ---

#[tokio::test]
async fn test_login_success_sets_cookie_and_redirects() {
    let response = post_login(app(backend()), "email=hr%40ems.lk&password=hr-pass").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/dashboard");
    let cookie = set_cookie(&response);
    assert!(cookie.starts_with("ems_session="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Secure"));
}

#[tokio::test]
async fn test_login_cookie_opens_employee_area() {
    let response = post_login(app(backend()), "email=kamal%40ems.lk&password=emp-pass").await;
    assert_eq!(location(&response), "/employee-dashboard");

    let token = set_cookie(&response)
        .split(';')
        .next()
        .and_then(|pair| pair.split_once('='))
        .map(|(_, value)| value.to_string())
        .unwrap();

    let response = get(app(backend()), "/employee-dashboard", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_login_wrong_password() {
    let response = post_login(app(backend()), "email=hr%40ems.lk&password=nope").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(body_string(response).await.contains("Invalid email or password"));
}

#[tokio::test]
async fn test_login_unknown_user() {
    let response = post_login(app(backend()), "email=ghost%40ems.lk&password=x").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_string(response).await.contains("User not found"));
}

#[tokio::test]
async fn test_login_missing_fields() {
    let response = post_login(app(backend()), "email=&password=").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_string(response).await.contains("Email and password are required"));
}

#[tokio::test]
async fn test_login_refuses_unrecognised_role() {
    let response = post_login(app(backend()), "email=intern%40ems.lk&password=intern-pass").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn test_login_backend_down() {
    let response = post_login(
        app(MockBackendApi::new_unreachable()),
        "email=hr%40ems.lk&password=hr-pass",
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert!(body_string(response).await.contains("Login failed. Please try again."));
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let token = token_for(Role::Hr, "2");
    let response = get(app(backend()), "/logout", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
    assert!(set_cookie(&response).contains("Max-Age=0"));
}

// --- JSON API ---

#[tokio::test]
async fn test_session_info() {
    let response = get(app(backend()), "/api/session", None).await;
    let info: SessionInfo = serde_json::from_str(&body_string(response).await).unwrap();
    assert!(!info.authenticated);
    assert_eq!(info.home, "/login");

    let token = token_for(Role::Employee, "3");
    let response = get(app(backend()), "/api/session", Some(&token)).await;
    let info: SessionInfo = serde_json::from_str(&body_string(response).await).unwrap();
    assert!(info.authenticated);
    assert_eq!(info.role, Role::Employee);
    assert_eq!(info.user_id.as_deref(), Some("3"));
    assert_eq!(info.home, "/employee-dashboard");
}

async fn post_json(app: Router, path: &str, token: Option<&str>, body: &str) -> Response {
    let mut builder = Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::COOKIE, cookie(token));
    }
    app.oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap()
}

const SALARY: &str = r#"{"basic_salary":"100000","internet_charges":"2500","allowances":"15000","deductions":"1000"}"#;

#[tokio::test]
async fn test_salary_breakdown_for_hr() {
    let token = token_for(Role::Hr, "2");
    let response = post_json(app(backend()), "/api/salary/breakdown", Some(&token), SALARY).await;
    assert_eq!(response.status(), StatusCode::OK);

    let breakdown: SalaryBreakdown =
        serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(breakdown.epf_employee.to_string(), "8000.00");
    assert_eq!(breakdown.net_salary.to_string(), "108500.00");
}

#[tokio::test]
async fn test_salary_breakdown_out_of_range_amounts() {
    let token = token_for(Role::Admin, "1");
    let body = r#"{"basic_salary":"79228162514264337593543950335","internet_charges":"1","allowances":"0","deductions":"0"}"#;
    let response = post_json(app(backend()), "/api/salary/breakdown", Some(&token), body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(
        body_string(response)
            .await
            .contains("Salary amounts are too large")
    );
}

#[tokio::test]
async fn test_salary_breakdown_forbidden_for_employee() {
    let token = token_for(Role::Employee, "3");
    let response = post_json(app(backend()), "/api/salary/breakdown", Some(&token), SALARY).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_api_requires_session() {
    let response = post_json(app(backend()), "/api/salary/breakdown", None, SALARY).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_leave_days_endpoint() {
    let token = token_for(Role::Employee, "3");
    let response = post_json(
        app(backend()),
        "/api/leave/days",
        Some(&token),
        r#"{"from_date":"2025-03-10","to_date":"2025-03-14"}"#,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, r#"{"days":5}"#);

    let response = post_json(
        app(backend()),
        "/api/leave/days",
        Some(&token),
        r#"{"from_date":"2025-03-14","to_date":"2025-03-10"}"#,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_string(response).await.contains("From date cannot be later than to date"));
}

// --- API client collaborator ---

#[tokio::test]
async fn test_proxy_relays_backend_response() {
    let token = token_for(Role::Hr, "2");
    let response = get(app(backend()), "/api/backend/departments/?page=2", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/json"
    );

    let echoed: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(echoed["method"], "GET");
    assert_eq!(echoed["path"], "departments/");
    assert_eq!(echoed["query"], "page=2");
}

#[tokio::test]
async fn test_proxy_relays_backend_errors() {
    let token = token_for(Role::Hr, "2");
    let response = get(
        app(backend().with_forward_status(404)),
        "/api/backend/employees/999/",
        Some(&token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_backend_401_tears_session_down() {
    let token = token_for(Role::Hr, "2");
    let response = get(
        app(backend().with_forward_status(401)),
        "/api/backend/users_management/",
        Some(&token),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
    assert!(set_cookie(&response).starts_with("ems_session=;"));
    assert!(set_cookie(&response).contains("Max-Age=0"));
}

#[tokio::test]
async fn test_proxy_requires_session() {
    let response = get(app(backend()), "/api/backend/departments/", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
