use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use cuidame_core::PaginationParams;

use crate::utils::serde::empty_string_as_none;

pub const EVENT_TYPES: &[&str] = &[
    "cita_medica",
    "visita",
    "actividad",
    "recordatorio",
    "general",
];

pub const DEFAULT_EVENT_TYPE: &str = "general";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow, ToSchema)]
pub struct Event {
    pub id: i64,
    pub grupo_id: i64,
    pub titulo: String,
    pub descripcion: Option<String>,
    #[schema(example = "cita_medica")]
    pub tipo: String,
    pub fecha_inicio: DateTime<Utc>,
    pub fecha_fin: Option<DateTime<Utc>>,
    pub ubicacion: Option<String>,
    pub creado_por: Option<i64>,
    pub fecha_creacion: DateTime<Utc>,
    pub fecha_actualizacion: DateTime<Utc>,
}

pub const EVENT_COLUMNS: &str = "id, grupo_id, titulo, descripcion, tipo, fecha_inicio, \
     fecha_fin, ubicacion, creado_por, fecha_creacion, fecha_actualizacion";

pub fn check_event_type(tipo: &str) -> Result<(), ValidationError> {
    if EVENT_TYPES.contains(&tipo) {
        return Ok(());
    }
    Err(ValidationError::new("tipo_evento").with_message(
        format!("Tipo de evento no válido. Valores permitidos: {}", EVENT_TYPES.join(", ")).into(),
    ))
}

pub fn check_event_range(
    inicio: &DateTime<Utc>,
    fin: Option<&DateTime<Utc>>,
) -> Result<(), ValidationError> {
    if let Some(fin) = fin
        && fin < inicio
    {
        return Err(ValidationError::new("rango_fechas").with_message(
            "La fecha de fin no puede ser anterior a la fecha de inicio".into(),
        ));
    }
    Ok(())
}

fn validate_new_event(dto: &CreateEventRequest) -> Result<(), ValidationError> {
    check_event_range(&dto.fecha_inicio, dto.fecha_fin.as_ref())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_new_event"))]
pub struct CreateEventRequest {
    #[validate(length(
        min = 1,
        max = 200,
        message = "El título es obligatorio (máx. 200 caracteres)"
    ))]
    pub titulo: String,
    #[validate(length(max = 2000, message = "La descripción no puede superar 2000 caracteres"))]
    pub descripcion: Option<String>,
    /// One of `cita_medica`, `visita`, `actividad`, `recordatorio`, `general` (default)
    #[validate(custom(function = "check_event_type"))]
    pub tipo: Option<String>,
    pub fecha_inicio: DateTime<Utc>,
    pub fecha_fin: Option<DateTime<Utc>>,
    #[validate(length(max = 255, message = "La ubicación no puede superar 255 caracteres"))]
    pub ubicacion: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateEventRequest {
    #[validate(length(min = 1, max = 200, message = "El título no puede estar vacío"))]
    pub titulo: Option<String>,
    #[validate(length(max = 2000, message = "La descripción no puede superar 2000 caracteres"))]
    pub descripcion: Option<String>,
    #[validate(custom(function = "check_event_type"))]
    pub tipo: Option<String>,
    pub fecha_inicio: Option<DateTime<Utc>>,
    pub fecha_fin: Option<DateTime<Utc>>,
    #[validate(length(max = 255, message = "La ubicación no puede superar 255 caracteres"))]
    pub ubicacion: Option<String>,
}

/// Date bounds apply to the UTC day an event starts on.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EventFilterParams {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub desde: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub hasta: Option<NaiveDate>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}
