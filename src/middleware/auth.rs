//! Authentication middleware.
//!
//! ```text
//! extract credential ──none──▶ 401 TOKEN_NO_ENCONTRADO
//!        │
//!  verify token ──invalid / no id──▶ 401 TOKEN_INVALIDO
//!        │      ──expired─────────▶ 401 TOKEN_EXPIRADO
//!        │      ──no secret───────▶ 500 ERROR_AUTENTICACION
//!        │
//! resolve identity ──not found──▶ 401 USUARIO_NO_ENCONTRADO
//!        │         ──fault──────▶ 500 ERROR_AUTENTICACION
//!        │
//!  bind AuthContext ──▶ next handler
//! ```

use axum::{
    body::{self, Body},
    extract::{Request, State},
    http::{StatusCode, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, error, warn};

use cuidame_auth::{TokenError, verify_token};
use cuidame_core::{AppError, ErrorCode};

use crate::middleware::credential::{
    CredentialSource, CredentialSources, extract_credential, has_json_body,
};
use crate::middleware::identity::{ResolveError, resolve_identity};
use crate::state::AppState;

/// Upper bound on a body buffered to look for a `token` field.
pub const MAX_CREDENTIAL_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Terminal outcomes of a failed authentication.
#[derive(Debug)]
pub enum AuthFailure {
    MissingToken,
    InvalidToken(TokenError),
    ExpiredToken,
    PrincipalNotFound,
    Internal(anyhow::Error),
}

impl AuthFailure {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::MissingToken => ErrorCode::TokenNotFound,
            Self::InvalidToken(_) => ErrorCode::InvalidToken,
            Self::ExpiredToken => ErrorCode::ExpiredToken,
            Self::PrincipalNotFound => ErrorCode::UserNotFound,
            Self::Internal(_) => ErrorCode::AuthenticationError,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::MissingToken => "Token de acceso no proporcionado",
            Self::InvalidToken(_) => "Token inválido",
            Self::ExpiredToken => "El token ha expirado",
            Self::PrincipalNotFound => "Usuario no encontrado o inactivo",
            Self::Internal(_) => "Error en la autenticación",
        }
    }

    pub fn into_app_error(self) -> AppError {
        let err = AppError::new(self.status(), self.code(), self.message());
        match self {
            Self::InvalidToken(source) => err.with_source(source),
            Self::Internal(source) => err.with_source(source),
            _ => err,
        }
    }
}

impl From<TokenError> for AuthFailure {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => Self::ExpiredToken,
            TokenError::Invalid(_) | TokenError::MissingPrincipalId => Self::InvalidToken(err),
            TokenError::SigningSecretMissing | TokenError::Signing(_) => {
                Self::Internal(err.into())
            }
        }
    }
}

impl From<ResolveError> for AuthFailure {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::PrincipalNotFound => Self::PrincipalNotFound,
            ResolveError::ResolutionFailed(_) => Self::Internal(err.into()),
        }
    }
}

impl IntoResponse for AuthFailure {
    fn into_response(self) -> Response {
        match &self {
            // Logged by AppError's responder.
            Self::Internal(_) => {}
            Self::InvalidToken(source) => {
                warn!(codigo = %self.code(), reason = %source, "Authentication rejected")
            }
            _ => warn!(codigo = %self.code(), "Authentication rejected"),
        }
        self.into_app_error().into_response()
    }
}

/// Authenticates the request and binds an [`AuthContext`](super::context::AuthContext).
///
/// ```rust,ignore
/// Router::new()
///     .route("/horarios", get(list_schedules))
///     .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));
/// ```
pub async fn require_auth(State(state): State<AppState>, req: Request, next: Next) -> Response {
    match authenticate(&state, req).await {
        Ok(req) => next.run(req).await,
        Err(failure) => failure.into_response(),
    }
}

async fn authenticate(state: &AppState, req: Request) -> Result<Request, AuthFailure> {
    let (parts, body) = req.into_parts();
    let (credential, body) = locate_credential(&parts, body).await;

    let (source, token) = credential.ok_or(AuthFailure::MissingToken)?;
    debug!(?source, "Credential located");

    let identity = verify_token(&token, &state.jwt_config)?;
    let context = resolve_identity(state.principals.as_ref(), identity.id).await?;

    if identity.rol != context.principal.rol.as_str() {
        debug!(
            user_id = identity.id,
            token_rol = %identity.rol,
            rol = %context.principal.rol,
            "Token role differs from stored role; using stored role"
        );
    }

    let mut req = Request::from_parts(parts, body);
    context.bind(&mut req);
    Ok(req)
}

/// Runs the extraction strategies, buffering a JSON body only if nothing else matched.
/// Returns the body to forward downstream.
async fn locate_credential(
    parts: &Parts,
    body: Body,
) -> (Option<(CredentialSource, String)>, Body) {
    let sources = CredentialSources {
        headers: &parts.headers,
        uri: &parts.uri,
        body: None,
    };

    if let Some(found) = extract_credential(&sources) {
        return (Some(found), body);
    }

    if !has_json_body(&parts.headers) {
        return (None, body);
    }

    match body::to_bytes(body, MAX_CREDENTIAL_BODY_BYTES).await {
        Ok(bytes) => {
            let found = extract_credential(&CredentialSources {
                body: Some(&bytes),
                ..sources
            });
            (found, Body::from(bytes))
        }
        Err(err) => {
            error!(error = %err, "Failed to buffer request body for credential lookup");
            (None, Body::empty())
        }
    }
}
