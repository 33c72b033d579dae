use axum::{Json, extract::State, http::StatusCode};
use tracing::instrument;

use cuidame_core::{ApiResponse, AppError, ErrorBody, MessageResponse};

use crate::middleware::context::{AuthContext, GroupMember, MembershipRole};
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::model::{CreateFamilyRequest, FamilyDetails, JoinFamilyRequest};
use super::service::FamilyService;

/// Create a family group; the caller becomes its administrator
#[utoipa::path(
    post,
    path = "/api/familias",
    request_body = CreateFamilyRequest,
    responses(
        (status = 201, description = "Group created", body = FamilyDetails),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 409, description = "Caller already belongs to a group", body = ErrorBody),
        (status = 422, description = "Validation failed", body = ErrorBody)
    ),
    tag = "Familias",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth, dto), fields(user_id = auth.user_id()))]
pub async fn create_family(
    State(state): State<AppState>,
    auth: AuthContext,
    ValidatedJson(dto): ValidatedJson<CreateFamilyRequest>,
) -> Result<(StatusCode, Json<ApiResponse<FamilyDetails>>), AppError> {
    let details = FamilyService::create(&state.db, &auth, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            "Grupo familiar creado correctamente",
            details,
        )),
    ))
}

/// Join a family group by its code
#[utoipa::path(
    post,
    path = "/api/familias/unirse",
    request_body = JoinFamilyRequest,
    responses(
        (status = 200, description = "Joined the group", body = FamilyDetails),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "No active group with that code", body = ErrorBody),
        (status = 409, description = "Caller already belongs to a group", body = ErrorBody)
    ),
    tag = "Familias",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth, dto), fields(user_id = auth.user_id()))]
pub async fn join_family(
    State(state): State<AppState>,
    auth: AuthContext,
    ValidatedJson(dto): ValidatedJson<JoinFamilyRequest>,
) -> Result<Json<ApiResponse<FamilyDetails>>, AppError> {
    let details = FamilyService::join(&state.db, &auth, dto).await?;
    Ok(Json(ApiResponse::with_message(
        "Te has unido al grupo familiar",
        details,
    )))
}

/// The caller's family group and its active members
#[utoipa::path(
    get,
    path = "/api/familias/mi-familia",
    responses(
        (status = 200, description = "Group details", body = FamilyDetails),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 403, description = "Caller has no family group", body = ErrorBody)
    ),
    tag = "Familias",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, member), fields(user_id = member.auth.user_id()))]
pub async fn my_family(
    State(state): State<AppState>,
    member: GroupMember,
) -> Result<Json<ApiResponse<FamilyDetails>>, AppError> {
    let mi_rol = member
        .auth
        .grupo_familiar
        .as_ref()
        .map(|m| m.rol)
        .unwrap_or(MembershipRole::Miembro);
    let details = FamilyService::details(&state.db, member.grupo_id, mi_rol).await?;
    Ok(Json(ApiResponse::ok(details)))
}

/// Leave the current family group
#[utoipa::path(
    post,
    path = "/api/familias/salir",
    responses(
        (status = 200, description = "Left the group", body = MessageResponse),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 403, description = "Caller has no family group", body = ErrorBody)
    ),
    tag = "Familias",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth), fields(user_id = auth.user_id()))]
pub async fn leave_family(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<MessageResponse>, AppError> {
    FamilyService::leave(&state.db, &auth).await?;
    Ok(Json(MessageResponse::new("Has salido del grupo familiar")))
}
