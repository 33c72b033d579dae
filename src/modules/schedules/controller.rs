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
    CreateScheduleRequest, Schedule, ScheduleFilterParams, UpdateScheduleRequest,
};
use super::service::ScheduleService;

/// List the group's caregiving shifts
#[utoipa::path(
    get,
    path = "/api/horarios",
    params(ScheduleFilterParams),
    responses(
        (status = 200, description = "Shifts ordered by date and start time", body = Vec<Schedule>),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 403, description = "Caller has no family group", body = ErrorBody)
    ),
    tag = "Horarios",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, member, filters), fields(grupo_id = member.grupo_id))]
pub async fn list_schedules(
    State(state): State<AppState>,
    member: GroupMember,
    filters: Result<Query<ScheduleFilterParams>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<Schedule>>>, AppError> {
    let filters = query_params(filters)?;
    let schedules = ScheduleService::list(&state.db, member.grupo_id, filters).await?;
    Ok(Json(ApiResponse::ok(schedules)))
}

#[utoipa::path(
    get,
    path = "/api/horarios/{id}",
    params(("id" = i64, Path, description = "Shift ID")),
    responses(
        (status = 200, description = "Shift", body = Schedule),
        (status = 404, description = "Not found in the caller's group", body = ErrorBody)
    ),
    tag = "Horarios",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, member), fields(grupo_id = member.grupo_id))]
pub async fn get_schedule(
    State(state): State<AppState>,
    member: GroupMember,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Schedule>>, AppError> {
    let schedule = ScheduleService::get(&state.db, member.grupo_id, id).await?;
    Ok(Json(ApiResponse::ok(schedule)))
}

#[utoipa::path(
    post,
    path = "/api/horarios",
    request_body = CreateScheduleRequest,
    responses(
        (status = 201, description = "Shift created", body = Schedule),
        (status = 403, description = "Caller has no family group", body = ErrorBody),
        (status = 422, description = "Invalid time range or caregiver", body = ErrorBody)
    ),
    tag = "Horarios",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, member, dto), fields(grupo_id = member.grupo_id))]
pub async fn create_schedule(
    State(state): State<AppState>,
    member: GroupMember,
    ValidatedJson(dto): ValidatedJson<CreateScheduleRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Schedule>>), AppError> {
    let schedule = ScheduleService::create(&state.db, &member, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message("Horario creado correctamente", schedule)),
    ))
}

#[utoipa::path(
    put,
    path = "/api/horarios/{id}",
    params(("id" = i64, Path, description = "Shift ID")),
    request_body = UpdateScheduleRequest,
    responses(
        (status = 200, description = "Shift updated", body = Schedule),
        (status = 404, description = "Not found in the caller's group", body = ErrorBody),
        (status = 422, description = "Invalid time range or caregiver", body = ErrorBody)
    ),
    tag = "Horarios",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, member, dto), fields(grupo_id = member.grupo_id))]
pub async fn update_schedule(
    State(state): State<AppState>,
    member: GroupMember,
    Path(id): Path<i64>,
    ValidatedJson(dto): ValidatedJson<UpdateScheduleRequest>,
) -> Result<Json<ApiResponse<Schedule>>, AppError> {
    let schedule = ScheduleService::update(&state.db, &member, id, dto).await?;
    Ok(Json(ApiResponse::with_message(
        "Horario actualizado correctamente",
        schedule,
    )))
}

#[utoipa::path(
    delete,
    path = "/api/horarios/{id}",
    params(("id" = i64, Path, description = "Shift ID")),
    responses(
        (status = 200, description = "Shift deleted", body = MessageResponse),
        (status = 404, description = "Not found in the caller's group", body = ErrorBody)
    ),
    tag = "Horarios",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, member), fields(grupo_id = member.grupo_id))]
pub async fn delete_schedule(
    State(state): State<AppState>,
    member: GroupMember,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    ScheduleService::delete(&state.db, member.grupo_id, id).await?;
    Ok(Json(MessageResponse::new("Horario eliminado correctamente")))
}
