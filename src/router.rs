use axum::http::{HeaderValue, Method, header};
use axum::{Json, Router, middleware, routing::get};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use utoipa::{OpenApi, ToSchema};
use utoipa_scalar::{Scalar, Servable as _};
use utoipa_swagger_ui::SwaggerUi;

use crate::docs::ApiDoc;
use crate::logging::logging_middleware;
use crate::metrics::metrics_middleware;
use crate::middleware::auth::USER_EMAIL_HEADER;
use crate::middleware::rate_limit::{AuthRateLimiter, rate_limit_middleware};
use crate::modules::auth::init_auth_router;
use crate::modules::courses::init_courses_router;
use crate::modules::departments::init_departments_router;
use crate::modules::students::init_students_router;
use crate::modules::teachers::init_teachers_router;
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse)),
    tag = "Health"
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

fn cors_layer(state: &AppState) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
            USER_EMAIL_HEADER,
        ]);

    // Credentials cannot be combined with a wildcard origin.
    if state.cors_config.allows_any() {
        return layer.allow_origin(Any);
    }

    let allowed_origins: Vec<HeaderValue> = state
        .cors_config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    layer.allow_origin(allowed_origins).allow_credentials(true)
}

/// Builds the full application router.
///
/// | Prefix             | Module      |
/// |--------------------|-------------|
/// | `/api/auth`        | auth (rate limited) |
/// | `/api/departments` | departments |
/// | `/api/courses`     | courses     |
/// | `/api/teachers`    | teachers    |
/// | `/api/students`    | students    |
pub fn init_router(state: AppState) -> Router {
    let mut auth_router = init_auth_router();
    if let Some(limiter) = AuthRateLimiter::from_config(&state.rate_limit_config) {
        limiter.spawn_upkeep();
        auth_router =
            auth_router.route_layer(middleware::from_fn_with_state(limiter, rate_limit_middleware));
    }

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .route("/health", get(health))
        .nest(
            "/api",
            Router::new()
                .nest("/auth", auth_router)
                .nest("/departments", init_departments_router())
                .nest("/courses", init_courses_router())
                .nest("/teachers", init_teachers_router())
                .nest("/students", init_students_router()),
        )
        .with_state(state.clone())
        .layer(cors_layer(&state))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
}
