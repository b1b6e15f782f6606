use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::{IntoResponse, Response},
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Session adapter, guard and navigation core.
pub mod auth;
pub mod guard;
pub mod models;
pub mod navigator;
pub mod views;

// Backend collaborator, calculators, configuration, HTTP handlers.
pub mod api_client;
pub mod config;
pub mod handlers;
pub mod payroll;

// Route table and the access-level routers.
pub mod routes;
use models::Session;
use routes::{authenticated, public};

// --- Public Re-exports ---

pub use api_client::{ApiState, BackendApi, HttpBackendApi, MockBackendApi};
pub use config::AppConfig;

/// ApiDoc
///
/// OpenAPI document for the JSON endpoints, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::login, handlers::get_session_info, handlers::salary_breakdown,
        handlers::leave_days
    ),
    components(
        schemas(
            models::Role, models::SessionInfo, models::LoginForm, models::SalaryInput,
            models::SalaryBreakdown, models::LeaveDaysRequest, models::LeaveDaysResponse,
            models::ErrorBody,
        )
    ),
    tags(
        (name = "ems-console", description = "EMS Console Gateway API")
    )
)]
struct ApiDoc;

/// AppState
///
/// Shared, cheaply clonable state: the backend client and the immutable configuration.
#[derive(Clone)]
pub struct AppState {
    /// Backend collaborator: login and the API proxy.
    pub api: ApiState,
    pub config: AppConfig,
}

impl FromRef<AppState> for ApiState {
    fn from_ref(app_state: &AppState) -> ApiState {
        app_state.api.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// require_session
///
/// Layer for the authenticated JSON API. Runs the guard with the `Authenticated` capability and
/// answers 401 (signed out) or 403 (malformed session) instead of a page redirect.
async fn require_session(session: Session, request: Request, next: Next) -> Response {
    match guard::authorize(&session, guard::Capability::Authenticated).into_api_result() {
        Ok(()) => next.run(request).await,
        Err(status) => status.into_response(),
    }
}

/// create_router
///
/// Assembles the routers, the console fallback, and the observability layers.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                require_session,
            )),
        )
        // Every other path is a console page, resolved by the route table and the guard.
        .fallback(handlers::console_page)
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span for `TraceLayer` carrying method, uri and the `x-request-id` so every log line of a
/// request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
