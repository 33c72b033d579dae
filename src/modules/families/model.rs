use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::middleware::context::{MembershipRole, MembershipStatus};

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct FamilyGroup {
    pub id: i64,
    #[schema(example = "FAM-7K2Q9D")]
    pub codigo_familia: String,
    pub nombre: String,
    pub descripcion: Option<String>,
    pub activo: bool,
    pub creado_por: Option<i64>,
    pub fecha_creacion: DateTime<Utc>,
    pub fecha_actualizacion: DateTime<Utc>,
}

pub const FAMILY_GROUP_COLUMNS: &str =
    "id, codigo_familia, nombre, descripcion, activo, creado_por, fecha_creacion, fecha_actualizacion";

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct FamilyMember {
    pub usuario_id: i64,
    pub nombre: String,
    pub email: String,
    pub telefono: Option<String>,
    pub avatar: Option<String>,
    #[sqlx(try_from = "String")]
    pub rol: MembershipRole,
    #[sqlx(try_from = "String")]
    pub estado: MembershipStatus,
    pub fecha_union: DateTime<Utc>,
}

/// A group with its active members, as seen by one of them.
#[derive(Debug, Serialize, ToSchema)]
pub struct FamilyDetails {
    pub grupo: FamilyGroup,
    pub miembros: Vec<FamilyMember>,
    /// The caller's role in the group
    pub mi_rol: MembershipRole,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateFamilyRequest {
    #[validate(length(
        min = 2,
        max = 120,
        message = "El nombre del grupo debe tener entre 2 y 120 caracteres"
    ))]
    pub nombre: String,
    #[validate(length(max = 1000, message = "La descripción no puede superar 1000 caracteres"))]
    pub descripcion: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct JoinFamilyRequest {
    #[validate(length(
        min = 1,
        max = 20,
        message = "El código de familia es obligatorio"
    ))]
    #[schema(example = "FAM-7K2Q9D")]
    pub codigo_familia: String,
}
