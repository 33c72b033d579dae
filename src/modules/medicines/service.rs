use sqlx::PgPool;
use tracing::instrument;

use cuidame_core::AppError;

use crate::middleware::context::GroupMember;
use crate::utils::db::{delete_scoped, found, is_check_violation};
use crate::utils::patch::{merge_required, merge_text};

use super::model::{
    CreateMedicineRequest, MEDICINE_COLUMNS, Medicine, MedicineFilterParams,
    UpdateMedicineRequest, check_treatment_dates,
};

const WHAT: &str = "Medicamento";

fn write_error(err: sqlx::Error) -> AppError {
    if is_check_violation(&err) {
        return AppError::unprocessable(
            "La fecha de fin no puede ser anterior a la fecha de inicio",
        );
    }
    AppError::from(err)
}

pub struct MedicineService;

impl MedicineService {
    #[instrument(skip(db))]
    pub async fn list(
        db: &PgPool,
        grupo_id: i64,
        filters: MedicineFilterParams,
    ) -> Result<Vec<Medicine>, AppError> {
        let medicines = sqlx::query_as::<_, Medicine>(&format!(
            r#"SELECT {MEDICINE_COLUMNS} FROM medicamentos
               WHERE grupo_id = $1 AND ($2::boolean IS NULL OR activo = $2)
               ORDER BY activo DESC, hora_toma ASC NULLS LAST, nombre ASC"#
        ))
        .bind(grupo_id)
        .bind(filters.activo)
        .fetch_all(db)
        .await?;

        Ok(medicines)
    }

    #[instrument(skip(db))]
    pub async fn get(db: &PgPool, grupo_id: i64, id: i64) -> Result<Medicine, AppError> {
        let medicine = sqlx::query_as::<_, Medicine>(&format!(
            "SELECT {MEDICINE_COLUMNS} FROM medicamentos WHERE id = $1 AND grupo_id = $2"
        ))
        .bind(id)
        .bind(grupo_id)
        .fetch_optional(db)
        .await?;

        found(medicine, WHAT)
    }

    #[instrument(skip(db, member, dto), fields(grupo_id = member.grupo_id))]
    pub async fn create(
        db: &PgPool,
        member: &GroupMember,
        dto: CreateMedicineRequest,
    ) -> Result<Medicine, AppError> {
        let medicine = sqlx::query_as::<_, Medicine>(&format!(
            r#"INSERT INTO medicamentos
                   (grupo_id, nombre, dosis, frecuencia, hora_toma, instrucciones,
                    fecha_inicio, fecha_fin, activo, creado_por)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
               RETURNING {MEDICINE_COLUMNS}"#
        ))
        .bind(member.grupo_id)
        .bind(dto.nombre.trim())
        .bind(dto.dosis.trim())
        .bind(dto.frecuencia.trim())
        .bind(dto.hora_toma)
        .bind(merge_text(dto.instrucciones, None))
        .bind(dto.fecha_inicio)
        .bind(dto.fecha_fin)
        .bind(dto.activo.unwrap_or(true))
        .bind(member.auth.user_id())
        .fetch_one(db)
        .await
        .map_err(write_error)?;

        Ok(medicine)
    }

    #[instrument(skip(db, member, dto), fields(grupo_id = member.grupo_id))]
    pub async fn update(
        db: &PgPool,
        member: &GroupMember,
        id: i64,
        dto: UpdateMedicineRequest,
    ) -> Result<Medicine, AppError> {
        let current = Self::get(db, member.grupo_id, id).await?;

        let fecha_inicio = dto.fecha_inicio.or(current.fecha_inicio);
        let fecha_fin = dto.fecha_fin.or(current.fecha_fin);
        check_treatment_dates(fecha_inicio, fecha_fin).map_err(|e| {
            AppError::unprocessable(e.message.map(|m| m.to_string()).unwrap_or_default())
        })?;

        let medicine = sqlx::query_as::<_, Medicine>(&format!(
            r#"UPDATE medicamentos
               SET nombre = $3, dosis = $4, frecuencia = $5, hora_toma = $6,
                   instrucciones = $7, fecha_inicio = $8, fecha_fin = $9, activo = $10,
                   fecha_actualizacion = NOW()
               WHERE id = $1 AND grupo_id = $2
               RETURNING {MEDICINE_COLUMNS}"#
        ))
        .bind(id)
        .bind(member.grupo_id)
        .bind(merge_required(dto.nombre, current.nombre))
        .bind(merge_required(dto.dosis, current.dosis))
        .bind(merge_required(dto.frecuencia, current.frecuencia))
        .bind(dto.hora_toma.or(current.hora_toma))
        .bind(merge_text(dto.instrucciones, current.instrucciones))
        .bind(fecha_inicio)
        .bind(fecha_fin)
        .bind(dto.activo.unwrap_or(current.activo))
        .fetch_optional(db)
        .await
        .map_err(write_error)?;

        found(medicine, WHAT)
    }

    #[instrument(skip(db))]
    pub async fn delete(db: &PgPool, grupo_id: i64, id: i64) -> Result<(), AppError> {
        delete_scoped(db, "medicamentos", grupo_id, id, WHAT).await
    }
}
