use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use tracing::instrument;

use cuidame_core::{ApiResponse, AppError, ErrorBody, MessageResponse, Paginated};

use crate::middleware::context::{AuthContext, Principal};
use crate::state::AppState;
use crate::utils::db::query_params;
use crate::validator::ValidatedJson;

use super::model::{ChangePasswordRequest, UpdateProfileRequest, UserFilterParams};
use super::service::UserService;

/// Get the authenticated user's profile and family group
#[utoipa::path(
    get,
    path = "/api/usuarios/perfil",
    responses(
        (status = 200, description = "Current profile", body = AuthContext),
        (status = 401, description = "Unauthorized", body = ErrorBody)
    ),
    tag = "Usuarios",
    security(("bearer_auth" = []))
)]
#[instrument(skip(auth), fields(user_id = auth.user_id()))]
pub async fn get_profile(auth: AuthContext) -> Json<ApiResponse<AuthContext>> {
    Json(ApiResponse::ok(auth))
}

/// Update the authenticated user's profile
#[utoipa::path(
    put,
    path = "/api/usuarios/perfil",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = Principal),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 422, description = "Validation failed", body = ErrorBody)
    ),
    tag = "Usuarios",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth, dto), fields(user_id = auth.user_id()))]
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthContext,
    ValidatedJson(dto): ValidatedJson<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<Principal>>, AppError> {
    let principal = UserService::update_profile(&state.db, auth.principal, dto).await?;
    Ok(Json(ApiResponse::with_message(
        "Perfil actualizado correctamente",
        principal,
    )))
}

/// Change the authenticated user's password
#[utoipa::path(
    put,
    path = "/api/usuarios/perfil/password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Current password is wrong", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 422, description = "Validation failed", body = ErrorBody)
    ),
    tag = "Usuarios",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth, dto), fields(user_id = auth.user_id()))]
pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthContext,
    ValidatedJson(dto): ValidatedJson<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    UserService::change_password(&state.db, auth.user_id(), dto).await?;
    Ok(Json(MessageResponse::new("Contraseña actualizada correctamente")))
}

/// List all accounts (administrators only)
#[utoipa::path(
    get,
    path = "/api/usuarios",
    params(UserFilterParams),
    responses(
        (status = 200, description = "Paginated accounts", body = Vec<Principal>),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 403, description = "Administrators only", body = ErrorBody)
    ),
    tag = "Usuarios",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, filters))]
pub async fn list_users(
    State(state): State<AppState>,
    filters: Result<Query<UserFilterParams>, QueryRejection>,
) -> Result<Json<ApiResponse<Paginated<Principal>>>, AppError> {
    let filters = query_params(filters)?;
    let page = UserService::list_users(&state.db, filters).await?;
    Ok(Json(ApiResponse::ok(page)))
}
