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

use super::model::{
    CreateExpenseRequest, Expense, ExpenseFilterParams, ExpenseSummary, SummaryParams,
    UpdateExpenseRequest,
};
use super::service::ExpenseService;

/// List the group's expenses, newest first
#[utoipa::path(
    get,
    path = "/api/gastos",
    params(ExpenseFilterParams),
    responses(
        (status = 200, description = "Paginated expenses", body = Vec<Expense>),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 403, description = "Caller has no family group", body = ErrorBody)
    ),
    tag = "Gastos",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, member, filters), fields(grupo_id = member.grupo_id))]
pub async fn list_expenses(
    State(state): State<AppState>,
    member: GroupMember,
    filters: Result<Query<ExpenseFilterParams>, QueryRejection>,
) -> Result<Json<ApiResponse<Paginated<Expense>>>, AppError> {
    let filters = query_params(filters)?;
    let page = ExpenseService::list(&state.db, member.grupo_id, filters).await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// Totals per category over an optional date range
#[utoipa::path(
    get,
    path = "/api/gastos/resumen",
    params(SummaryParams),
    responses(
        (status = 200, description = "Expense summary", body = ExpenseSummary),
        (status = 403, description = "Caller has no family group", body = ErrorBody)
    ),
    tag = "Gastos",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, member, params), fields(grupo_id = member.grupo_id))]
pub async fn expense_summary(
    State(state): State<AppState>,
    member: GroupMember,
    params: Result<Query<SummaryParams>, QueryRejection>,
) -> Result<Json<ApiResponse<ExpenseSummary>>, AppError> {
    let params = query_params(params)?;
    let summary = ExpenseService::summary(&state.db, member.grupo_id, params).await?;
    Ok(Json(ApiResponse::ok(summary)))
}

#[utoipa::path(
    get,
    path = "/api/gastos/{id}",
    params(("id" = i64, Path, description = "Expense ID")),
    responses(
        (status = 200, description = "Expense", body = Expense),
        (status = 404, description = "Not found in the caller's group", body = ErrorBody)
    ),
    tag = "Gastos",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, member), fields(grupo_id = member.grupo_id))]
pub async fn get_expense(
    State(state): State<AppState>,
    member: GroupMember,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Expense>>, AppError> {
    let expense = ExpenseService::get(&state.db, member.grupo_id, id).await?;
    Ok(Json(ApiResponse::ok(expense)))
}

#[utoipa::path(
    post,
    path = "/api/gastos",
    request_body = CreateExpenseRequest,
    responses(
        (status = 201, description = "Expense recorded", body = Expense),
        (status = 403, description = "Caller has no family group", body = ErrorBody),
        (status = 422, description = "Validation failed", body = ErrorBody)
    ),
    tag = "Gastos",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, member, dto), fields(grupo_id = member.grupo_id))]
pub async fn create_expense(
    State(state): State<AppState>,
    member: GroupMember,
    ValidatedJson(dto): ValidatedJson<CreateExpenseRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Expense>>), AppError> {
    let expense = ExpenseService::create(&state.db, &member, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message("Gasto registrado correctamente", expense)),
    ))
}

#[utoipa::path(
    put,
    path = "/api/gastos/{id}",
    params(("id" = i64, Path, description = "Expense ID")),
    request_body = UpdateExpenseRequest,
    responses(
        (status = 200, description = "Expense updated", body = Expense),
        (status = 404, description = "Not found in the caller's group", body = ErrorBody),
        (status = 422, description = "Validation failed", body = ErrorBody)
    ),
    tag = "Gastos",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, member, dto), fields(grupo_id = member.grupo_id))]
pub async fn update_expense(
    State(state): State<AppState>,
    member: GroupMember,
    Path(id): Path<i64>,
    ValidatedJson(dto): ValidatedJson<UpdateExpenseRequest>,
) -> Result<Json<ApiResponse<Expense>>, AppError> {
    let expense = ExpenseService::update(&state.db, &member, id, dto).await?;
    Ok(Json(ApiResponse::with_message(
        "Gasto actualizado correctamente",
        expense,
    )))
}

#[utoipa::path(
    delete,
    path = "/api/gastos/{id}",
    params(("id" = i64, Path, description = "Expense ID")),
    responses(
        (status = 200, description = "Expense deleted", body = MessageResponse),
        (status = 404, description = "Not found in the caller's group", body = ErrorBody)
    ),
    tag = "Gastos",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, member), fields(grupo_id = member.grupo_id))]
pub async fn delete_expense(
    State(state): State<AppState>,
    member: GroupMember,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    ExpenseService::delete(&state.db, member.grupo_id, id).await?;
    Ok(Json(MessageResponse::new("Gasto eliminado correctamente")))
}
