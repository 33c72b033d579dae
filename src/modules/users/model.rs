//! Profile DTOs and the admin user listing filters.
//!
//! The account itself is [`Principal`](crate::middleware::context::Principal); there is no
//! separate user entity.

use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use cuidame_core::PaginationParams;

use crate::middleware::context::AccountStatus;
use crate::utils::serde::empty_string_as_none;

/// Partial profile update. Omitted fields keep their value; an empty `telefono` or `avatar`
/// clears it.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    #[validate(length(
        min = 2,
        max = 100,
        message = "El nombre debe tener entre 2 y 100 caracteres"
    ))]
    pub nombre: Option<String>,
    #[validate(length(max = 30, message = "El teléfono no puede superar 30 caracteres"))]
    pub telefono: Option<String>,
    #[validate(length(max = 500, message = "El avatar no puede superar 500 caracteres"))]
    pub avatar: Option<String>,
    pub notificaciones_email: Option<bool>,
    pub notificaciones_push: Option<bool>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "La contraseña actual es obligatoria"))]
    pub password_actual: String,
    #[validate(length(min = 8, message = "La nueva contraseña debe tener al menos 8 caracteres"))]
    pub password_nuevo: String,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserFilterParams {
    /// Case-insensitive match on name or email
    pub busqueda: Option<String>,
    /// `activo`, `inactivo` or `suspendido`
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub estado: Option<String>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

impl UserFilterParams {
    /// The `estado` filter, if it names a known status.
    pub fn status(&self) -> Option<AccountStatus> {
        self.estado
            .as_deref()
            .and_then(|s| AccountStatus::try_from(s).ok())
    }
}

/// A profile is complete once it has a name and a phone number.
pub fn is_profile_complete(nombre: &str, telefono: Option<&str>) -> bool {
    !nombre.trim().is_empty() && telefono.is_some_and(|t| !t.trim().is_empty())
}
