//! Success envelope shared by every handler.

use serde::Serialize;
use utoipa::ToSchema;

/// `{ "exito": true, "mensaje": "...", "datos": ... }`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub exito: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mensaje: Option<String>,
    pub datos: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(datos: T) -> Self {
        Self {
            exito: true,
            mensaje: None,
            datos,
        }
    }

    pub fn with_message(mensaje: impl Into<String>, datos: T) -> Self {
        Self {
            exito: true,
            mensaje: Some(mensaje.into()),
            datos,
        }
    }
}

/// Body of delete endpoints and other operations with nothing to return.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub exito: bool,
    pub mensaje: String,
}

impl MessageResponse {
    pub fn new(mensaje: impl Into<String>) -> Self {
        Self {
            exito: true,
            mensaje: mensaje.into(),
        }
    }
}
