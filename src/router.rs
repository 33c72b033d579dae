use crate::docs::ApiDoc;
use crate::logging::logging_middleware;
use crate::middleware::auth::require_auth;
use crate::modules::auth::router::init_auth_router;
use crate::modules::events::router::init_events_router;
use crate::modules::expenses::router::init_expenses_router;
use crate::modules::families::router::init_families_router;
use crate::modules::medicines::router::init_medicines_router;
use crate::modules::schedules::router::init_schedules_router;
use crate::modules::users::router::init_users_router;
use crate::state::AppState;
use axum::extract::State;
use axum::http::{HeaderName, HeaderValue, Method, StatusCode};
use axum::routing::get;
use axum::{Json, Router, middleware};
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};

pub fn init_router(state: AppState) -> Router {
    let protected = |router: Router<AppState>| {
        router.route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
    };

    Router::new()
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .route("/api-docs/openapi.json", get(openapi_json))
        .route("/health", get(health))
        .nest(
            "/api",
            Router::new()
                .nest("/auth", init_auth_router(state.clone()))
                .nest("/usuarios", protected(init_users_router()))
                .nest("/familias", protected(init_families_router()))
                .nest("/horarios", protected(init_schedules_router()))
                .nest("/medicamentos", protected(init_medicines_router()))
                .nest("/gastos", protected(init_expenses_router()))
                .nest("/eventos", protected(init_events_router())),
        )
        .with_state(state.clone())
        .layer({
            let allowed_origins: Vec<HeaderValue> = state
                .cors_config
                .allowed_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(allowed_origins)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([
                    axum::http::header::AUTHORIZATION,
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::ACCEPT,
                    HeaderName::from_static("x-access-token"),
                ])
                .allow_credentials(true)
        })
        .layer(middleware::from_fn(logging_middleware))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match sqlx::query("SELECT 1").execute(&state.db).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({ "exito": true, "estado": "ok", "base_de_datos": "ok" })),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Health check failed to reach the database");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "exito": false, "estado": "degradado", "base_de_datos": "error" })),
            )
        }
    }
}
