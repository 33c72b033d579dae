use axum::extract::{Query, rejection::QueryRejection};
use sqlx::PgPool;

use cuidame_core::AppError;

/// Whether `err` is a unique violation, optionally on a specific constraint.
pub fn is_unique_violation(err: &sqlx::Error, constraint: Option<&str>) -> bool {
    if let sqlx::Error::Database(db_err) = err
        && db_err.is_unique_violation()
    {
        return constraint.is_none() || db_err.constraint() == constraint;
    }
    false
}

/// Whether `err` is a CHECK constraint violation.
pub fn is_check_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_check_violation())
}

/// Unwraps a query extractor, turning rejections into `400 SOLICITUD_INVALIDA`.
pub fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    let Query(params) = query.map_err(|e| {
        AppError::bad_request(format!("Parámetros de consulta inválidos: {}", e.body_text()))
    })?;
    Ok(params)
}

/// Deletes a group-scoped row. A row of another group is reported as missing.
pub async fn delete_scoped(
    db: &PgPool,
    table: &'static str,
    grupo_id: i64,
    id: i64,
    what: &str,
) -> Result<(), AppError> {
    let result = sqlx::query(&format!(
        "DELETE FROM {table} WHERE id = $1 AND grupo_id = $2"
    ))
    .bind(id)
    .bind(grupo_id)
    .execute(db)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found(format!("{what} no encontrado")));
    }
    Ok(())
}

/// Maps a missing row to `404 NO_ENCONTRADO`.
pub fn found<T>(row: Option<T>, what: &str) -> Result<T, AppError> {
    row.ok_or_else(|| AppError::not_found(format!("{what} no encontrado")))
}
