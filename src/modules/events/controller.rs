use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::StatusCode,
};
use tracing::instrument;

use cuidame_core::{ApiResponse, AppError, ErrorBody, MessageResponse, Paginated};

use crate::middleware::context::GroupMember;
use crate::state::AppState;
use crate::utils::db::query_params;
use crate::validator::ValidatedJson;

use super::model::{CreateEventRequest, Event, EventFilterParams, UpdateEventRequest};
use super::service::EventService;

/// List the group's calendar events in start order
#[utoipa::path(
    get,
    path = "/api/eventos",
    params(EventFilterParams),
    responses(
        (status = 200, description = "Paginated events", body = Vec<Event>),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 403, description = "Caller has no family group", body = ErrorBody)
    ),
    tag = "Eventos",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, member, filters), fields(grupo_id = member.grupo_id))]
pub async fn list_events(
    State(state): State<AppState>,
    member: GroupMember,
    filters: Result<Query<EventFilterParams>, QueryRejection>,
) -> Result<Json<ApiResponse<Paginated<Event>>>, AppError> {
    let filters = query_params(filters)?;
    let page = EventService::list(&state.db, member.grupo_id, filters).await?;
    Ok(Json(ApiResponse::ok(page)))
}

#[utoipa::path(
    get,
    path = "/api/eventos/{id}",
    params(("id" = i64, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event", body = Event),
        (status = 404, description = "Not found in the caller's group", body = ErrorBody)
    ),
    tag = "Eventos",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, member), fields(grupo_id = member.grupo_id))]
pub async fn get_event(
    State(state): State<AppState>,
    member: GroupMember,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Event>>, AppError> {
    let event = EventService::get(&state.db, member.grupo_id, id).await?;
    Ok(Json(ApiResponse::ok(event)))
}

#[utoipa::path(
    post,
    path = "/api/eventos",
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Event created", body = Event),
        (status = 403, description = "Caller has no family group", body = ErrorBody),
        (status = 422, description = "Validation failed", body = ErrorBody)
    ),
    tag = "Eventos",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, member, dto), fields(grupo_id = member.grupo_id))]
pub async fn create_event(
    State(state): State<AppState>,
    member: GroupMember,
    ValidatedJson(dto): ValidatedJson<CreateEventRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Event>>), AppError> {
    let event = EventService::create(&state.db, &member, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message("Evento creado correctamente", event)),
    ))
}

#[utoipa::path(
    put,
    path = "/api/eventos/{id}",
    params(("id" = i64, Path, description = "Event ID")),
    request_body = UpdateEventRequest,
    responses(
        (status = 200, description = "Event updated", body = Event),
        (status = 404, description = "Not found in the caller's group", body = ErrorBody),
        (status = 422, description = "Validation failed", body = ErrorBody)
    ),
    tag = "Eventos",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, member, dto), fields(grupo_id = member.grupo_id))]
pub async fn update_event(
    State(state): State<AppState>,
    member: GroupMember,
    Path(id): Path<i64>,
    ValidatedJson(dto): ValidatedJson<UpdateEventRequest>,
) -> Result<Json<ApiResponse<Event>>, AppError> {
    let event = EventService::update(&state.db, &member, id, dto).await?;
    Ok(Json(ApiResponse::with_message(
        "Evento actualizado correctamente",
        event,
    )))
}

#[utoipa::path(
    delete,
    path = "/api/eventos/{id}",
    params(("id" = i64, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event deleted", body = MessageResponse),
        (status = 404, description = "Not found in the caller's group", body = ErrorBody)
    ),
    tag = "Eventos",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, member), fields(grupo_id = member.grupo_id))]
pub async fn delete_event(
    State(state): State<AppState>,
    member: GroupMember,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    EventService::delete(&state.db, member.grupo_id, id).await?;
    Ok(Json(MessageResponse::new("Evento eliminado correctamente")))
}
