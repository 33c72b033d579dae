//! Application error type and the structured error body.
//!
//! Every failure that leaves the API is rendered as
//!
//! ```json
//! { "exito": false, "error": "...", "codigo": "TOKEN_EXPIRADO", "timestamp": "2025-01-01T00:00:00.000Z" }
//! ```
//!
//! API consumers branch on `codigo`, so each [`ErrorCode`] maps to exactly one cause.

use std::fmt;

use anyhow::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use utoipa::ToSchema;

/// Message sent to clients in place of internal error detail.
pub const INTERNAL_ERROR_MESSAGE: &str = "Error interno del servidor";

/// Stable machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// No credential in any supported request location
    TokenNotFound,
    /// Malformed credential, bad signature, or missing principal id
    InvalidToken,
    /// Credential past its expiry
    ExpiredToken,
    /// Principal does not exist or its account is not active
    UserNotFound,
    /// Any other authentication failure, including storage faults
    AuthenticationError,
    InvalidCredentials,
    AccessDenied,
    NoFamilyGroup,
    EmailInUse,
    AlreadyInGroup,
    GroupNotFound,
    NotFound,
    BadRequest,
    ValidationFailed,
    Internal,
}

impl ErrorCode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TokenNotFound => "TOKEN_NO_ENCONTRADO",
            Self::InvalidToken => "TOKEN_INVALIDO",
            Self::ExpiredToken => "TOKEN_EXPIRADO",
            Self::UserNotFound => "USUARIO_NO_ENCONTRADO",
            Self::AuthenticationError => "ERROR_AUTENTICACION",
            Self::InvalidCredentials => "CREDENCIALES_INVALIDAS",
            Self::AccessDenied => "ACCESO_DENEGADO",
            Self::NoFamilyGroup => "SIN_GRUPO_FAMILIAR",
            Self::EmailInUse => "EMAIL_EN_USO",
            Self::AlreadyInGroup => "YA_EN_GRUPO",
            Self::GroupNotFound => "GRUPO_NO_ENCONTRADO",
            Self::NotFound => "NO_ENCONTRADO",
            Self::BadRequest => "SOLICITUD_INVALIDA",
            Self::ValidationFailed => "VALIDACION_FALLIDA",
            Self::Internal => "ERROR_INTERNO",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Current time as ISO-8601 UTC with millisecond precision.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// JSON body of every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Always `false`
    pub exito: bool,
    /// Human-readable message
    pub error: String,
    /// Machine-readable code
    #[schema(example = "TOKEN_NO_ENCONTRADO")]
    pub codigo: String,
    /// ISO-8601 timestamp
    pub timestamp: String,
}

impl ErrorBody {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            exito: false,
            error: message.into(),
            codigo: code.as_str().to_string(),
            timestamp: timestamp_now(),
        }
    }
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub code: ErrorCode,
    pub message: String,
    pub source: Option<Error>,
}

impl AppError {
    pub fn new(status: StatusCode, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Attaches an underlying cause. It is logged, never sent to the client.
    pub fn with_source<E>(mut self, err: E) -> Self
    where
        E: Into<Error>,
    {
        self.source = Some(err.into());
        self
    }

    /// Replaces the machine-readable code, keeping status and message.
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = code;
        self
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::Internal,
            INTERNAL_ERROR_MESSAGE,
        )
        .with_source(err)
    }

    pub fn unauthorized(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, code, message)
    }

    pub fn forbidden(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, code, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, ErrorCode::NotFound, message)
    }

    pub fn conflict(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, code, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ErrorCode::BadRequest, message)
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::ValidationFailed,
            message,
        )
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.status, self.code, self.message)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(
                codigo = %self.code,
                status = %self.status.as_u16(),
                source = ?self.source,
                "{}",
                self.message
            );
        }

        let body = Json(ErrorBody::new(self.code, self.message));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        AppError::internal(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_error_codes_are_unique() {
        let codes = [
            ErrorCode::TokenNotFound,
            ErrorCode::InvalidToken,
            ErrorCode::ExpiredToken,
            ErrorCode::UserNotFound,
            ErrorCode::AuthenticationError,
            ErrorCode::InvalidCredentials,
            ErrorCode::AccessDenied,
            ErrorCode::NoFamilyGroup,
            ErrorCode::EmailInUse,
            ErrorCode::AlreadyInGroup,
            ErrorCode::GroupNotFound,
            ErrorCode::NotFound,
            ErrorCode::BadRequest,
            ErrorCode::ValidationFailed,
            ErrorCode::Internal,
        ];
        let strings: std::collections::HashSet<_> = codes.iter().map(|c| c.as_str()).collect();
        assert_eq!(strings.len(), codes.len());
    }

    #[test]
    fn test_timestamp_is_iso8601_utc() {
        let ts = timestamp_now();
        assert!(ts.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
    }

    #[tokio::test]
    async fn test_unauthorized_response_body() {
        let response =
            AppError::unauthorized(ErrorCode::ExpiredToken, "Token expirado").into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = body_json(response).await;
        assert_eq!(body["exito"], false);
        assert_eq!(body["codigo"], "TOKEN_EXPIRADO");
        assert_eq!(body["error"], "Token expirado");
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_internal_error_hides_source() {
        let response = AppError::internal(anyhow::anyhow!("relation \"usuarios\" does not exist"))
            .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["codigo"], "ERROR_INTERNO");
        assert_eq!(body["error"], INTERNAL_ERROR_MESSAGE);
        assert!(!body.to_string().contains("usuarios"));
    }

    #[test]
    fn test_from_anyhow_is_internal() {
        let err: AppError = anyhow::anyhow!("boom").into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code, ErrorCode::Internal);
        assert!(err.source.is_some());
    }
}
