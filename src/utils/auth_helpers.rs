use sqlx::PgPool;

use cuidame_core::AppError;

/// Resolves the user a record is assigned to (a caregiver, a payer).
///
/// Defaults to `caller_id`. Anyone else must be an active member of `grupo_id`.
pub async fn assignee_in_group(
    db: &PgPool,
    grupo_id: i64,
    caller_id: i64,
    requested: Option<i64>,
    field: &str,
) -> Result<i64, AppError> {
    let Some(user_id) = requested.filter(|id| *id != caller_id) else {
        return Ok(caller_id);
    };

    let is_member = sqlx::query_scalar::<_, bool>(
        r#"SELECT EXISTS(
               SELECT 1 FROM miembros_grupo
               WHERE grupo_id = $1 AND usuario_id = $2 AND estado = 'activo'
           )"#,
    )
    .bind(grupo_id)
    .bind(user_id)
    .fetch_one(db)
    .await?;

    if !is_member {
        return Err(AppError::unprocessable(format!(
            "{field} debe ser un miembro activo del grupo familiar"
        )));
    }
    Ok(user_id)
}
