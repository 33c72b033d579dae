use sqlx::PgPool;
use tracing::instrument;

use cuidame_core::{AppError, Paginated};

use crate::middleware::context::GroupMember;
use crate::utils::db::{delete_scoped, found, is_check_violation};
use crate::utils::patch::{merge_required, merge_text};

use super::model::{
    CreateEventRequest, DEFAULT_EVENT_TYPE, EVENT_COLUMNS, Event, EventFilterParams,
    UpdateEventRequest, check_event_range,
};

const WHAT: &str = "Evento";

fn write_error(err: sqlx::Error) -> AppError {
    if is_check_violation(&err) {
        return AppError::unprocessable(
            "La fecha de fin no puede ser anterior a la fecha de inicio",
        );
    }
    AppError::from(err)
}

pub struct EventService;

impl EventService {
    #[instrument(skip(db))]
    pub async fn list(
        db: &PgPool,
        grupo_id: i64,
        filters: EventFilterParams,
    ) -> Result<Paginated<Event>, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        const WHERE_CLAUSE: &str = r#"
            WHERE grupo_id = $1
              AND ($2::date IS NULL OR (fecha_inicio AT TIME ZONE 'UTC')::date >= $2)
              AND ($3::date IS NULL OR (fecha_inicio AT TIME ZONE 'UTC')::date <= $3)"#;

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM eventos {WHERE_CLAUSE}"
        ))
        .bind(grupo_id)
        .bind(filters.desde)
        .bind(filters.hasta)
        .fetch_one(db)
        .await?;

        let elementos = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM eventos {WHERE_CLAUSE}
             ORDER BY fecha_inicio ASC, id ASC
             LIMIT $4 OFFSET $5"
        ))
        .bind(grupo_id)
        .bind(filters.desde)
        .bind(filters.hasta)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;

        Ok(Paginated {
            elementos,
            meta: filters.pagination.meta(total),
        })
    }

    #[instrument(skip(db))]
    pub async fn get(db: &PgPool, grupo_id: i64, id: i64) -> Result<Event, AppError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM eventos WHERE id = $1 AND grupo_id = $2"
        ))
        .bind(id)
        .bind(grupo_id)
        .fetch_optional(db)
        .await?;

        found(event, WHAT)
    }

    #[instrument(skip(db, member, dto), fields(grupo_id = member.grupo_id))]
    pub async fn create(
        db: &PgPool,
        member: &GroupMember,
        dto: CreateEventRequest,
    ) -> Result<Event, AppError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            r#"INSERT INTO eventos
                   (grupo_id, titulo, descripcion, tipo, fecha_inicio, fecha_fin, ubicacion, creado_por)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
               RETURNING {EVENT_COLUMNS}"#
        ))
        .bind(member.grupo_id)
        .bind(dto.titulo.trim())
        .bind(merge_text(dto.descripcion, None))
        .bind(dto.tipo.as_deref().unwrap_or(DEFAULT_EVENT_TYPE))
        .bind(dto.fecha_inicio)
        .bind(dto.fecha_fin)
        .bind(merge_text(dto.ubicacion, None))
        .bind(member.auth.user_id())
        .fetch_one(db)
        .await
        .map_err(write_error)?;

        Ok(event)
    }

    #[instrument(skip(db, member, dto), fields(grupo_id = member.grupo_id))]
    pub async fn update(
        db: &PgPool,
        member: &GroupMember,
        id: i64,
        dto: UpdateEventRequest,
    ) -> Result<Event, AppError> {
        let current = Self::get(db, member.grupo_id, id).await?;

        let fecha_inicio = dto.fecha_inicio.unwrap_or(current.fecha_inicio);
        let fecha_fin = dto.fecha_fin.or(current.fecha_fin);
        check_event_range(&fecha_inicio, fecha_fin.as_ref()).map_err(|e| {
            AppError::unprocessable(e.message.map(|m| m.to_string()).unwrap_or_default())
        })?;

        let event = sqlx::query_as::<_, Event>(&format!(
            r#"UPDATE eventos
               SET titulo = $3, descripcion = $4, tipo = $5, fecha_inicio = $6, fecha_fin = $7,
                   ubicacion = $8, fecha_actualizacion = NOW()
               WHERE id = $1 AND grupo_id = $2
               RETURNING {EVENT_COLUMNS}"#
        ))
        .bind(id)
        .bind(member.grupo_id)
        .bind(merge_required(dto.titulo, current.titulo))
        .bind(merge_text(dto.descripcion, current.descripcion))
        .bind(dto.tipo.unwrap_or(current.tipo))
        .bind(fecha_inicio)
        .bind(fecha_fin)
        .bind(merge_text(dto.ubicacion, current.ubicacion))
        .fetch_optional(db)
        .await
        .map_err(write_error)?;

        found(event, WHAT)
    }

    #[instrument(skip(db))]
    pub async fn delete(db: &PgPool, grupo_id: i64, id: i64) -> Result<(), AppError> {
        delete_scoped(db, "eventos", grupo_id, id, WHAT).await
    }
}
