use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::utils::serde::empty_string_as_none;

/// A caregiving shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow, ToSchema)]
pub struct Schedule {
    pub id: i64,
    pub grupo_id: i64,
    /// Member covering the shift
    pub cuidador_id: Option<i64>,
    pub fecha: NaiveDate,
    #[schema(value_type = String, example = "08:00:00")]
    pub hora_inicio: NaiveTime,
    #[schema(value_type = String, example = "14:00:00")]
    pub hora_fin: NaiveTime,
    pub notas: Option<String>,
    pub creado_por: Option<i64>,
    pub fecha_creacion: DateTime<Utc>,
    pub fecha_actualizacion: DateTime<Utc>,
}

pub const SCHEDULE_COLUMNS: &str = "id, grupo_id, cuidador_id, fecha, hora_inicio, hora_fin, \
     notas, creado_por, fecha_creacion, fecha_actualizacion";

pub fn check_time_range(inicio: &NaiveTime, fin: &NaiveTime) -> Result<(), ValidationError> {
    if fin <= inicio {
        return Err(ValidationError::new("rango_horario")
            .with_message("La hora de fin debe ser posterior a la hora de inicio".into()));
    }
    Ok(())
}

fn validate_new_schedule(dto: &CreateScheduleRequest) -> Result<(), ValidationError> {
    check_time_range(&dto.hora_inicio, &dto.hora_fin)
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_new_schedule"))]
pub struct CreateScheduleRequest {
    /// Defaults to the caller
    pub cuidador_id: Option<i64>,
    pub fecha: NaiveDate,
    #[schema(value_type = String, example = "08:00:00")]
    pub hora_inicio: NaiveTime,
    #[schema(value_type = String, example = "14:00:00")]
    pub hora_fin: NaiveTime,
    #[validate(length(max = 2000, message = "Las notas no pueden superar 2000 caracteres"))]
    pub notas: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateScheduleRequest {
    pub cuidador_id: Option<i64>,
    pub fecha: Option<NaiveDate>,
    #[schema(value_type = Option<String>)]
    pub hora_inicio: Option<NaiveTime>,
    #[schema(value_type = Option<String>)]
    pub hora_fin: Option<NaiveTime>,
    #[validate(length(max = 2000, message = "Las notas no pueden superar 2000 caracteres"))]
    pub notas: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ScheduleFilterParams {
    /// First day included
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub desde: Option<NaiveDate>,
    /// Last day included
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub hasta: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub cuidador_id: Option<i64>,
}
