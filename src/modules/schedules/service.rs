use sqlx::PgPool;
use tracing::instrument;

use cuidame_core::AppError;

use crate::middleware::context::GroupMember;
use crate::utils::auth_helpers::assignee_in_group;
use crate::utils::db::{delete_scoped, found, is_check_violation};
use crate::utils::patch::merge_text;

use super::model::{
    CreateScheduleRequest, SCHEDULE_COLUMNS, Schedule, ScheduleFilterParams,
    UpdateScheduleRequest, check_time_range,
};

const WHAT: &str = "Horario";

fn write_error(err: sqlx::Error) -> AppError {
    if is_check_violation(&err) {
        return AppError::unprocessable("La hora de fin debe ser posterior a la hora de inicio");
    }
    AppError::from(err)
}

pub struct ScheduleService;

impl ScheduleService {
    #[instrument(skip(db))]
    pub async fn list(
        db: &PgPool,
        grupo_id: i64,
        filters: ScheduleFilterParams,
    ) -> Result<Vec<Schedule>, AppError> {
        let schedules = sqlx::query_as::<_, Schedule>(&format!(
            r#"SELECT {SCHEDULE_COLUMNS} FROM horarios
               WHERE grupo_id = $1
                 AND ($2::date IS NULL OR fecha >= $2)
                 AND ($3::date IS NULL OR fecha <= $3)
                 AND ($4::bigint IS NULL OR cuidador_id = $4)
               ORDER BY fecha ASC, hora_inicio ASC"#
        ))
        .bind(grupo_id)
        .bind(filters.desde)
        .bind(filters.hasta)
        .bind(filters.cuidador_id)
        .fetch_all(db)
        .await?;

        Ok(schedules)
    }

    #[instrument(skip(db))]
    pub async fn get(db: &PgPool, grupo_id: i64, id: i64) -> Result<Schedule, AppError> {
        let schedule = sqlx::query_as::<_, Schedule>(&format!(
            "SELECT {SCHEDULE_COLUMNS} FROM horarios WHERE id = $1 AND grupo_id = $2"
        ))
        .bind(id)
        .bind(grupo_id)
        .fetch_optional(db)
        .await?;

        found(schedule, WHAT)
    }

    #[instrument(skip(db, member, dto), fields(grupo_id = member.grupo_id))]
    pub async fn create(
        db: &PgPool,
        member: &GroupMember,
        dto: CreateScheduleRequest,
    ) -> Result<Schedule, AppError> {
        let caller = member.auth.user_id();
        let cuidador_id =
            assignee_in_group(db, member.grupo_id, caller, dto.cuidador_id, "cuidador_id").await?;

        let schedule = sqlx::query_as::<_, Schedule>(&format!(
            r#"INSERT INTO horarios
                   (grupo_id, cuidador_id, fecha, hora_inicio, hora_fin, notas, creado_por)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING {SCHEDULE_COLUMNS}"#
        ))
        .bind(member.grupo_id)
        .bind(cuidador_id)
        .bind(dto.fecha)
        .bind(dto.hora_inicio)
        .bind(dto.hora_fin)
        .bind(merge_text(dto.notas, None))
        .bind(caller)
        .fetch_one(db)
        .await
        .map_err(write_error)?;

        Ok(schedule)
    }

    #[instrument(skip(db, member, dto), fields(grupo_id = member.grupo_id))]
    pub async fn update(
        db: &PgPool,
        member: &GroupMember,
        id: i64,
        dto: UpdateScheduleRequest,
    ) -> Result<Schedule, AppError> {
        let current = Self::get(db, member.grupo_id, id).await?;

        let hora_inicio = dto.hora_inicio.unwrap_or(current.hora_inicio);
        let hora_fin = dto.hora_fin.unwrap_or(current.hora_fin);
        check_time_range(&hora_inicio, &hora_fin).map_err(|e| {
            AppError::unprocessable(e.message.map(|m| m.to_string()).unwrap_or_default())
        })?;

        let cuidador_id = match dto.cuidador_id {
            Some(requested) => Some(
                assignee_in_group(
                    db,
                    member.grupo_id,
                    member.auth.user_id(),
                    Some(requested),
                    "cuidador_id",
                )
                .await?,
            ),
            None => current.cuidador_id,
        };

        let schedule = sqlx::query_as::<_, Schedule>(&format!(
            r#"UPDATE horarios
               SET cuidador_id = $3, fecha = $4, hora_inicio = $5, hora_fin = $6, notas = $7,
                   fecha_actualizacion = NOW()
               WHERE id = $1 AND grupo_id = $2
               RETURNING {SCHEDULE_COLUMNS}"#
        ))
        .bind(id)
        .bind(member.grupo_id)
        .bind(cuidador_id)
        .bind(dto.fecha.unwrap_or(current.fecha))
        .bind(hora_inicio)
        .bind(hora_fin)
        .bind(merge_text(dto.notas, current.notas))
        .fetch_optional(db)
        .await
        .map_err(write_error)?;

        found(schedule, WHAT)
    }

    #[instrument(skip(db))]
    pub async fn delete(db: &PgPool, grupo_id: i64, id: i64) -> Result<(), AppError> {
        delete_scoped(db, "horarios", grupo_id, id, WHAT).await
    }
}
