use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::utils::serde::empty_string_as_none;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow, ToSchema)]
pub struct Medicine {
    pub id: i64,
    pub grupo_id: i64,
    pub nombre: String,
    #[schema(example = "500 mg")]
    pub dosis: String,
    #[schema(example = "Cada 8 horas")]
    pub frecuencia: String,
    #[schema(value_type = Option<String>, example = "09:00:00")]
    pub hora_toma: Option<NaiveTime>,
    pub instrucciones: Option<String>,
    pub fecha_inicio: Option<NaiveDate>,
    pub fecha_fin: Option<NaiveDate>,
    pub activo: bool,
    pub creado_por: Option<i64>,
    pub fecha_creacion: DateTime<Utc>,
    pub fecha_actualizacion: DateTime<Utc>,
}

pub const MEDICINE_COLUMNS: &str = "id, grupo_id, nombre, dosis, frecuencia, hora_toma, \
     instrucciones, fecha_inicio, fecha_fin, activo, creado_por, fecha_creacion, \
     fecha_actualizacion";

/// A treatment cannot end before it starts. Open-ended ranges are fine.
pub fn check_treatment_dates(
    inicio: Option<NaiveDate>,
    fin: Option<NaiveDate>,
) -> Result<(), ValidationError> {
    if let (Some(inicio), Some(fin)) = (inicio, fin)
        && fin < inicio
    {
        return Err(ValidationError::new("rango_fechas").with_message(
            "La fecha de fin no puede ser anterior a la fecha de inicio".into(),
        ));
    }
    Ok(())
}

fn validate_new_medicine(dto: &CreateMedicineRequest) -> Result<(), ValidationError> {
    check_treatment_dates(dto.fecha_inicio, dto.fecha_fin)
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_new_medicine"))]
pub struct CreateMedicineRequest {
    #[validate(length(
        min = 1,
        max = 150,
        message = "El nombre del medicamento es obligatorio (máx. 150 caracteres)"
    ))]
    pub nombre: String,
    #[validate(length(min = 1, max = 100, message = "La dosis es obligatoria"))]
    pub dosis: String,
    #[validate(length(min = 1, max = 100, message = "La frecuencia es obligatoria"))]
    pub frecuencia: String,
    #[schema(value_type = Option<String>, example = "09:00:00")]
    pub hora_toma: Option<NaiveTime>,
    #[validate(length(max = 2000, message = "Las instrucciones no pueden superar 2000 caracteres"))]
    pub instrucciones: Option<String>,
    pub fecha_inicio: Option<NaiveDate>,
    pub fecha_fin: Option<NaiveDate>,
    /// Defaults to `true`
    pub activo: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateMedicineRequest {
    #[validate(length(
        min = 1,
        max = 150,
        message = "El nombre del medicamento no puede estar vacío"
    ))]
    pub nombre: Option<String>,
    #[validate(length(min = 1, max = 100, message = "La dosis no puede estar vacía"))]
    pub dosis: Option<String>,
    #[validate(length(min = 1, max = 100, message = "La frecuencia no puede estar vacía"))]
    pub frecuencia: Option<String>,
    #[schema(value_type = Option<String>)]
    pub hora_toma: Option<NaiveTime>,
    #[validate(length(max = 2000, message = "Las instrucciones no pueden superar 2000 caracteres"))]
    pub instrucciones: Option<String>,
    pub fecha_inicio: Option<NaiveDate>,
    pub fecha_fin: Option<NaiveDate>,
    pub activo: Option<bool>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MedicineFilterParams {
    /// Only active (`true`) or inactive (`false`) treatments
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub activo: Option<bool>,
}
