use axum::{Json, extract::State, http::StatusCode};
use tracing::instrument;

use cuidame_core::{ApiResponse, AppError, ErrorBody};

use crate::middleware::context::AuthContext;
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::model::{AuthResponse, LoginRequest, RegisterRequest};
use super::service::AuthService;

/// Register a new account
#[utoipa::path(
    post,
    path = "/api/auth/registro",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created, token issued", body = AuthResponse),
        (status = 400, description = "Malformed body", body = ErrorBody),
        (status = 409, description = "Email already registered", body = ErrorBody),
        (status = 422, description = "Validation failed", body = ErrorBody)
    ),
    tag = "Autenticación"
)]
#[instrument(skip(state, dto))]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponse>>), AppError> {
    let response = AuthService::register(&state.db, dto, &state.jwt_config).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message("Usuario registrado correctamente", response)),
    ))
}

/// Log in with email and password
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = ErrorBody),
        (status = 422, description = "Validation failed", body = ErrorBody)
    ),
    tag = "Autenticación"
)]
#[instrument(skip(state, dto))]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, AppError> {
    let response = AuthService::login(&state.db, dto, &state.jwt_config).await?;
    Ok(Json(ApiResponse::with_message("Inicio de sesión exitoso", response)))
}

/// Return the authenticated context for the presented token
#[utoipa::path(
    get,
    path = "/api/auth/verificar",
    responses(
        (status = 200, description = "Token is valid", body = AuthContext),
        (status = 401, description = "Missing, invalid or expired token", body = ErrorBody),
        (status = 500, description = "Authentication unavailable", body = ErrorBody)
    ),
    tag = "Autenticación",
    security(("bearer_auth" = []))
)]
#[instrument(skip(auth), fields(user_id = auth.user_id()))]
pub async fn verify(auth: AuthContext) -> Json<ApiResponse<AuthContext>> {
    Json(ApiResponse::ok(auth))
}
