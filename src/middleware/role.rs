//! Role-based authorization.
//!
//! Runs after [`require_auth`](super::auth::require_auth) and reads the stored role from the
//! bound [`AuthContext`]. The role carried in the token is never consulted here.

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use cuidame_core::{AppError, ErrorCode};

use crate::middleware::context::{AuthContext, UserRole};

/// Rejects principals whose account role is not one of `allowed`.
pub fn ensure_role(ctx: &AuthContext, allowed: &[UserRole]) -> Result<(), AppError> {
    if allowed.contains(&ctx.principal.rol) {
        return Ok(());
    }

    tracing::warn!(
        user_id = ctx.user_id(),
        rol = %ctx.principal.rol,
        "Access denied by role check"
    );
    Err(AppError::forbidden(
        ErrorCode::AccessDenied,
        "No tienes permisos para realizar esta acción",
    ))
}

/// Only account administrators pass.
///
/// ```rust,ignore
/// Router::new()
///     .route("/", get(list_users).route_layer(middleware::from_fn(require_admin)))
/// ```
pub async fn require_admin(ctx: AuthContext, req: Request, next: Next) -> Response {
    match ensure_role(&ctx, &[UserRole::Administrador]) {
        Ok(()) => next.run(req).await,
        Err(err) => err.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::context::fixtures::principal;
    use axum::http::StatusCode;

    #[test]
    fn test_ensure_role() {
        let mut ctx = AuthContext {
            principal: principal(1),
            grupo_familiar: None,
        };

        let err = ensure_role(&ctx, &[UserRole::Administrador]).unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
        assert_eq!(err.code, ErrorCode::AccessDenied);

        assert!(ensure_role(&ctx, &[UserRole::Usuario, UserRole::Administrador]).is_ok());

        ctx.principal.rol = UserRole::Administrador;
        assert!(ensure_role(&ctx, &[UserRole::Administrador]).is_ok());
    }
}
