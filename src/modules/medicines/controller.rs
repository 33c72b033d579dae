use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::StatusCode,
};
use tracing::instrument;

use cuidame_core::{ApiResponse, AppError, ErrorBody, MessageResponse};

use crate::middleware::context::GroupMember;
use crate::state::AppState;
use crate::utils::db::query_params;
use crate::validator::ValidatedJson;

use super::model::{
    CreateMedicineRequest, Medicine, MedicineFilterParams, UpdateMedicineRequest,
};
use super::service::MedicineService;

/// List the group's medicines
#[utoipa::path(
    get,
    path = "/api/medicamentos",
    params(MedicineFilterParams),
    responses(
        (status = 200, description = "Medicines, active first", body = Vec<Medicine>),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 403, description = "Caller has no family group", body = ErrorBody)
    ),
    tag = "Medicamentos",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, member, filters), fields(grupo_id = member.grupo_id))]
pub async fn list_medicines(
    State(state): State<AppState>,
    member: GroupMember,
    filters: Result<Query<MedicineFilterParams>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<Medicine>>>, AppError> {
    let filters = query_params(filters)?;
    let medicines = MedicineService::list(&state.db, member.grupo_id, filters).await?;
    Ok(Json(ApiResponse::ok(medicines)))
}

#[utoipa::path(
    get,
    path = "/api/medicamentos/{id}",
    params(("id" = i64, Path, description = "Medicine ID")),
    responses(
        (status = 200, description = "Medicine", body = Medicine),
        (status = 404, description = "Not found in the caller's group", body = ErrorBody)
    ),
    tag = "Medicamentos",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, member), fields(grupo_id = member.grupo_id))]
pub async fn get_medicine(
    State(state): State<AppState>,
    member: GroupMember,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Medicine>>, AppError> {
    let medicine = MedicineService::get(&state.db, member.grupo_id, id).await?;
    Ok(Json(ApiResponse::ok(medicine)))
}

#[utoipa::path(
    post,
    path = "/api/medicamentos",
    request_body = CreateMedicineRequest,
    responses(
        (status = 201, description = "Medicine created", body = Medicine),
        (status = 403, description = "Caller has no family group", body = ErrorBody),
        (status = 422, description = "Validation failed", body = ErrorBody)
    ),
    tag = "Medicamentos",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, member, dto), fields(grupo_id = member.grupo_id))]
pub async fn create_medicine(
    State(state): State<AppState>,
    member: GroupMember,
    ValidatedJson(dto): ValidatedJson<CreateMedicineRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Medicine>>), AppError> {
    let medicine = MedicineService::create(&state.db, &member, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            "Medicamento creado correctamente",
            medicine,
        )),
    ))
}

#[utoipa::path(
    put,
    path = "/api/medicamentos/{id}",
    params(("id" = i64, Path, description = "Medicine ID")),
    request_body = UpdateMedicineRequest,
    responses(
        (status = 200, description = "Medicine updated", body = Medicine),
        (status = 404, description = "Not found in the caller's group", body = ErrorBody),
        (status = 422, description = "Validation failed", body = ErrorBody)
    ),
    tag = "Medicamentos",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, member, dto), fields(grupo_id = member.grupo_id))]
pub async fn update_medicine(
    State(state): State<AppState>,
    member: GroupMember,
    Path(id): Path<i64>,
    ValidatedJson(dto): ValidatedJson<UpdateMedicineRequest>,
) -> Result<Json<ApiResponse<Medicine>>, AppError> {
    let medicine = MedicineService::update(&state.db, &member, id, dto).await?;
    Ok(Json(ApiResponse::with_message(
        "Medicamento actualizado correctamente",
        medicine,
    )))
}

#[utoipa::path(
    delete,
    path = "/api/medicamentos/{id}",
    params(("id" = i64, Path, description = "Medicine ID")),
    responses(
        (status = 200, description = "Medicine deleted", body = MessageResponse),
        (status = 404, description = "Not found in the caller's group", body = ErrorBody)
    ),
    tag = "Medicamentos",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, member), fields(grupo_id = member.grupo_id))]
pub async fn delete_medicine(
    State(state): State<AppState>,
    member: GroupMember,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    MedicineService::delete(&state.db, member.grupo_id, id).await?;
    Ok(Json(MessageResponse::new("Medicamento eliminado correctamente")))
}
