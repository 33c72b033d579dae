use rand::{Rng, distributions::Alphanumeric};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{info, instrument, warn};

use cuidame_core::{AppError, ErrorCode};

use crate::middleware::context::{AuthContext, MembershipRole};
use crate::utils::db::is_unique_violation;

use super::model::{
    CreateFamilyRequest, FAMILY_GROUP_COLUMNS, FamilyDetails, FamilyGroup, FamilyMember,
    JoinFamilyRequest,
};

pub const FAMILY_CODE_PREFIX: &str = "FAM-";
const FAMILY_CODE_LEN: usize = 6;
const MAX_CODE_ATTEMPTS: usize = 5;
const ACTIVE_MEMBERSHIP_INDEX: &str = "miembros_grupo_un_activo_por_usuario";

/// A fresh `FAM-XXXXXX` code with uppercase alphanumerics.
pub fn generate_family_code() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(FAMILY_CODE_LEN)
        .map(char::from)
        .collect();
    format!("{FAMILY_CODE_PREFIX}{}", suffix.to_uppercase())
}

pub fn normalize_family_code(code: &str) -> String {
    code.trim().to_uppercase()
}

fn already_in_group() -> AppError {
    AppError::conflict(
        ErrorCode::AlreadyInGroup,
        "Ya perteneces a un grupo familiar",
    )
}

fn membership_error(err: sqlx::Error) -> AppError {
    if is_unique_violation(&err, Some(ACTIVE_MEMBERSHIP_INDEX)) {
        return already_in_group();
    }
    AppError::from(err)
}

pub struct FamilyService;

impl FamilyService {
    /// Memberships in deactivated groups no longer count but still hold the one-active index.
    async fn release_stale_memberships(
        tx: &mut Transaction<'_, Postgres>,
        user_id: i64,
    ) -> Result<(), AppError> {
        let released = sqlx::query(
            r#"UPDATE miembros_grupo mg SET estado = 'inactivo'
               FROM grupos_familiares g
               WHERE g.id = mg.grupo_id AND mg.usuario_id = $1
                 AND mg.estado = 'activo' AND g.activo = FALSE"#,
        )
        .bind(user_id)
        .execute(&mut **tx)
        .await?
        .rows_affected();

        if released > 0 {
            info!(user_id, released, "Released memberships in inactive groups");
        }
        Ok(())
    }

    async fn insert_group(
        tx: &mut Transaction<'_, Postgres>,
        creator_id: i64,
        dto: &CreateFamilyRequest,
    ) -> Result<FamilyGroup, AppError> {
        let descripcion = dto
            .descripcion
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty());

        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = generate_family_code();
            let inserted = sqlx::query_as::<_, FamilyGroup>(&format!(
                r#"INSERT INTO grupos_familiares (codigo_familia, nombre, descripcion, creado_por)
                   VALUES ($1, $2, $3, $4)
                   ON CONFLICT (codigo_familia) DO NOTHING
                   RETURNING {FAMILY_GROUP_COLUMNS}"#
            ))
            .bind(&code)
            .bind(dto.nombre.trim())
            .bind(descripcion)
            .bind(creator_id)
            .fetch_optional(&mut **tx)
            .await?;

            if let Some(group) = inserted {
                return Ok(group);
            }
            warn!(code = %code, "Family code collision, retrying");
        }

        Err(AppError::internal(anyhow::anyhow!(
            "could not generate a unique family code after {MAX_CODE_ATTEMPTS} attempts"
        )))
    }

    #[instrument(skip(db, auth, dto), fields(user_id = auth.user_id()))]
    pub async fn create(
        db: &PgPool,
        auth: &AuthContext,
        dto: CreateFamilyRequest,
    ) -> Result<FamilyDetails, AppError> {
        if auth.grupo_familiar.is_some() {
            return Err(already_in_group());
        }

        let mut tx = db.begin().await?;
        Self::release_stale_memberships(&mut tx, auth.user_id()).await?;
        let group = Self::insert_group(&mut tx, auth.user_id(), &dto).await?;

        sqlx::query(
            r#"INSERT INTO miembros_grupo (grupo_id, usuario_id, rol, estado)
               VALUES ($1, $2, 'administrador', 'activo')"#,
        )
        .bind(group.id)
        .bind(auth.user_id())
        .execute(&mut *tx)
        .await
        .map_err(membership_error)?;

        tx.commit().await?;

        info!(grupo_id = group.id, codigo = %group.codigo_familia, "Family group created");
        Self::details(db, group.id, MembershipRole::Administrador).await
    }

    #[instrument(skip(db, auth, dto), fields(user_id = auth.user_id()))]
    pub async fn join(
        db: &PgPool,
        auth: &AuthContext,
        dto: JoinFamilyRequest,
    ) -> Result<FamilyDetails, AppError> {
        if auth.grupo_familiar.is_some() {
            return Err(already_in_group());
        }

        let group = sqlx::query_as::<_, FamilyGroup>(&format!(
            "SELECT {FAMILY_GROUP_COLUMNS} FROM grupos_familiares
             WHERE codigo_familia = $1 AND activo = TRUE"
        ))
        .bind(normalize_family_code(&dto.codigo_familia))
        .fetch_optional(db)
        .await?
        .ok_or_else(|| {
            AppError::not_found("No existe un grupo familiar activo con ese código")
                .with_code(ErrorCode::GroupNotFound)
        })?;

        let mut tx = db.begin().await?;
        Self::release_stale_memberships(&mut tx, auth.user_id()).await?;

        // A former member rejoins with their previous role.
        let rol = sqlx::query_scalar::<_, String>(
            r#"INSERT INTO miembros_grupo (grupo_id, usuario_id, rol, estado)
               VALUES ($1, $2, 'miembro', 'activo')
               ON CONFLICT (grupo_id, usuario_id)
               DO UPDATE SET estado = 'activo', fecha_union = NOW()
               RETURNING rol"#,
        )
        .bind(group.id)
        .bind(auth.user_id())
        .fetch_one(&mut *tx)
        .await
        .map_err(membership_error)?;

        tx.commit().await?;

        let rol = MembershipRole::try_from(rol).map_err(AppError::internal)?;
        info!(grupo_id = group.id, "Joined family group");
        Self::details(db, group.id, rol).await
    }

    #[instrument(skip(db))]
    pub async fn details(
        db: &PgPool,
        grupo_id: i64,
        mi_rol: MembershipRole,
    ) -> Result<FamilyDetails, AppError> {
        let grupo = sqlx::query_as::<_, FamilyGroup>(&format!(
            "SELECT {FAMILY_GROUP_COLUMNS} FROM grupos_familiares WHERE id = $1"
        ))
        .bind(grupo_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| {
            AppError::not_found("Grupo familiar no encontrado").with_code(ErrorCode::GroupNotFound)
        })?;

        let miembros = sqlx::query_as::<_, FamilyMember>(
            r#"SELECT u.id AS usuario_id, u.nombre, u.email, u.telefono, u.avatar,
                      mg.rol, mg.estado, mg.fecha_union
               FROM miembros_grupo mg
               JOIN usuarios u ON u.id = mg.usuario_id
               WHERE mg.grupo_id = $1 AND mg.estado = 'activo' AND u.estado = 'activo'
               ORDER BY mg.rol = 'administrador' DESC, mg.fecha_union ASC"#,
        )
        .bind(grupo_id)
        .fetch_all(db)
        .await?;

        Ok(FamilyDetails {
            grupo,
            miembros,
            mi_rol,
        })
    }

    #[instrument(skip(db, auth), fields(user_id = auth.user_id()))]
    pub async fn leave(db: &PgPool, auth: &AuthContext) -> Result<(), AppError> {
        let grupo_id = auth.family_group_id()?;

        let result = sqlx::query(
            r#"UPDATE miembros_grupo SET estado = 'inactivo'
               WHERE grupo_id = $1 AND usuario_id = $2 AND estado = 'activo'"#,
        )
        .bind(grupo_id)
        .bind(auth.user_id())
        .execute(db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::forbidden(
                ErrorCode::NoFamilyGroup,
                "No perteneces a ningún grupo familiar",
            ));
        }

        info!(grupo_id, "Left family group");
        Ok(())
    }
}
