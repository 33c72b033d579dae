use axum::http::StatusCode;
use sqlx::PgPool;
use tracing::{info, instrument};

use cuidame_core::{AppError, ErrorCode, Paginated, hash_password, verify_password};

use crate::middleware::context::{PRINCIPAL_COLUMNS, Principal};
use crate::utils::patch::{merge_required, merge_text};

use super::model::{
    ChangePasswordRequest, UpdateProfileRequest, UserFilterParams, is_profile_complete,
};

pub struct UserService;

impl UserService {
    #[instrument(skip(db, current, dto), fields(user_id = current.id))]
    pub async fn update_profile(
        db: &PgPool,
        current: Principal,
        dto: UpdateProfileRequest,
    ) -> Result<Principal, AppError> {
        let nombre = merge_required(dto.nombre, current.nombre);
        let telefono = merge_text(dto.telefono, current.telefono);
        let avatar = merge_text(dto.avatar, current.avatar);
        let perfil_completo = is_profile_complete(&nombre, telefono.as_deref());

        let principal = sqlx::query_as::<_, Principal>(&format!(
            r#"UPDATE usuarios
               SET nombre = $2, telefono = $3, avatar = $4,
                   notificaciones_email = $5, notificaciones_push = $6,
                   perfil_completo = $7, fecha_actualizacion = NOW()
               WHERE id = $1
               RETURNING {PRINCIPAL_COLUMNS}"#
        ))
        .bind(current.id)
        .bind(&nombre)
        .bind(&telefono)
        .bind(&avatar)
        .bind(dto.notificaciones_email.unwrap_or(current.notificaciones_email))
        .bind(dto.notificaciones_push.unwrap_or(current.notificaciones_push))
        .bind(perfil_completo)
        .fetch_one(db)
        .await?;

        Ok(principal)
    }

    #[instrument(skip(db, dto))]
    pub async fn change_password(
        db: &PgPool,
        user_id: i64,
        dto: ChangePasswordRequest,
    ) -> Result<(), AppError> {
        let stored_hash =
            sqlx::query_scalar::<_, String>("SELECT password_hash FROM usuarios WHERE id = $1")
                .bind(user_id)
                .fetch_optional(db)
                .await?
                .ok_or_else(|| AppError::not_found("Usuario no encontrado"))?;

        if !verify_password(&dto.password_actual, &stored_hash)? {
            return Err(AppError::new(
                StatusCode::BAD_REQUEST,
                ErrorCode::InvalidCredentials,
                "La contraseña actual es incorrecta",
            ));
        }

        let new_hash = hash_password(&dto.password_nuevo)?;
        sqlx::query(
            "UPDATE usuarios SET password_hash = $2, fecha_actualizacion = NOW() WHERE id = $1",
        )
        .bind(user_id)
        .bind(&new_hash)
        .execute(db)
        .await?;

        info!("Password changed");
        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn list_users(
        db: &PgPool,
        filters: UserFilterParams,
    ) -> Result<Paginated<Principal>, AppError> {
        let busqueda = filters
            .busqueda
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{s}%"));
        let estado = filters.status().map(|s| s.as_str());
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        const WHERE_CLAUSE: &str = r#"
            WHERE ($1::text IS NULL OR nombre ILIKE $1 OR email ILIKE $1)
              AND ($2::text IS NULL OR estado = $2)"#;

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM usuarios {WHERE_CLAUSE}"
        ))
        .bind(&busqueda)
        .bind(estado)
        .fetch_one(db)
        .await?;

        let elementos = sqlx::query_as::<_, Principal>(&format!(
            "SELECT {PRINCIPAL_COLUMNS} FROM usuarios {WHERE_CLAUSE}
             ORDER BY fecha_creacion DESC, id DESC
             LIMIT $3 OFFSET $4"
        ))
        .bind(&busqueda)
        .bind(estado)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;

        Ok(Paginated {
            elementos,
            meta: filters.pagination.meta(total),
        })
    }
}
