use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use cuidame_core::PaginationParams;

use crate::utils::serde::empty_string_as_none;

pub const DEFAULT_CATEGORY: &str = "general";

/// Largest amount NUMERIC(12, 2) holds.
const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow, ToSchema)]
pub struct Expense {
    pub id: i64,
    pub grupo_id: i64,
    pub concepto: String,
    pub categoria: String,
    #[schema(example = 42.5)]
    pub monto: Decimal,
    pub fecha: NaiveDate,
    pub pagado_por: Option<i64>,
    pub notas: Option<String>,
    pub creado_por: Option<i64>,
    pub fecha_creacion: DateTime<Utc>,
    pub fecha_actualizacion: DateTime<Utc>,
}

pub const EXPENSE_COLUMNS: &str = "id, grupo_id, concepto, categoria, monto, fecha, pagado_por, \
     notas, creado_por, fecha_creacion, fecha_actualizacion";

pub fn check_amount(monto: &Decimal) -> Result<(), ValidationError> {
    if *monto < Decimal::ZERO {
        return Err(ValidationError::new("monto_negativo")
            .with_message("El monto no puede ser negativo".into()));
    }
    if *monto > MAX_AMOUNT {
        return Err(ValidationError::new("monto_excesivo")
            .with_message("El monto supera el máximo permitido".into()));
    }
    Ok(())
}

/// Stored form of a category: trimmed, lowercase, `general` when blank.
pub fn normalize_category(categoria: Option<&str>) -> String {
    categoria
        .map(|c| c.trim().to_lowercase())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| DEFAULT_CATEGORY.to_string())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateExpenseRequest {
    #[validate(length(
        min = 1,
        max = 200,
        message = "El concepto es obligatorio (máx. 200 caracteres)"
    ))]
    pub concepto: String,
    #[validate(length(max = 50, message = "La categoría no puede superar 50 caracteres"))]
    pub categoria: Option<String>,
    #[validate(custom(function = "check_amount"))]
    #[schema(example = 42.5)]
    pub monto: Decimal,
    /// Defaults to today
    pub fecha: Option<NaiveDate>,
    /// Defaults to the caller
    pub pagado_por: Option<i64>,
    #[validate(length(max = 2000, message = "Las notas no pueden superar 2000 caracteres"))]
    pub notas: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateExpenseRequest {
    #[validate(length(min = 1, max = 200, message = "El concepto no puede estar vacío"))]
    pub concepto: Option<String>,
    #[validate(length(max = 50, message = "La categoría no puede superar 50 caracteres"))]
    pub categoria: Option<String>,
    #[validate(custom(function = "check_amount"))]
    pub monto: Option<Decimal>,
    pub fecha: Option<NaiveDate>,
    pub pagado_por: Option<i64>,
    #[validate(length(max = 2000, message = "Las notas no pueden superar 2000 caracteres"))]
    pub notas: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ExpenseFilterParams {
    pub categoria: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub desde: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub hasta: Option<NaiveDate>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SummaryParams {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub desde: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub hasta: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow, ToSchema)]
pub struct CategoryTotal {
    pub categoria: String,
    pub total: Decimal,
    pub cantidad: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ExpenseSummary {
    pub total: Decimal,
    pub cantidad: i64,
    /// Highest total first
    pub por_categoria: Vec<CategoryTotal>,
}

impl ExpenseSummary {
    pub fn from_categories(por_categoria: Vec<CategoryTotal>) -> Self {
        Self {
            total: por_categoria.iter().map(|c| c.total).sum(),
            cantidad: por_categoria.iter().map(|c| c.cantidad).sum(),
            por_categoria,
        }
    }
}
