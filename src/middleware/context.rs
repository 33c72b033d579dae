//! The authenticated request context and the types it is made of.
//!
//! [`AuthContext`] is built fresh for every request by the auth middleware, inserted into the
//! request extensions, and read back by handlers through its extractor. It is the only
//! identity input route handlers trust.

use std::fmt;

use axum::{
    extract::{FromRequestParts, Request},
    http::{StatusCode, request::Parts},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

use cuidame_core::{AppError, ErrorCode};

#[derive(Debug, thiserror::Error)]
#[error("unknown {kind} value: {value}")]
pub struct UnknownVariant {
    kind: &'static str,
    value: String,
}

/// Declares a string-backed enum stored as TEXT.
macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident, $kind:literal { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = UnknownVariant;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::try_from(value.as_str())
            }
        }

        impl TryFrom<&str> for $name {
            type Error = UnknownVariant;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                match value {
                    $($text => Ok(Self::$variant),)+
                    other => Err(UnknownVariant {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

text_enum!(
    /// Account-wide role.
    UserRole, "rol" {
        Usuario => "usuario",
        Administrador => "administrador",
    }
);

text_enum!(
    /// Only `activo` accounts authenticate.
    AccountStatus, "estado" {
        Activo => "activo",
        Inactivo => "inactivo",
        Suspendido => "suspendido",
    }
);

text_enum!(
    /// Role within a family group.
    MembershipRole, "rol de grupo" {
        Administrador => "administrador",
        Miembro => "miembro",
    }
);

text_enum!(
    MembershipStatus, "estado de membresía" {
        Activo => "activo",
        Pendiente => "pendiente",
        Inactivo => "inactivo",
    }
);

/// Column list matching [`Principal`]'s `FromRow` layout.
pub const PRINCIPAL_COLUMNS: &str = "id, nombre, email, rol, telefono, perfil_completo, estado, \
     avatar, notificaciones_email, notificaciones_push, fecha_creacion, fecha_actualizacion, \
     ultimo_acceso";

/// A user account as stored, without credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow, ToSchema)]
pub struct Principal {
    pub id: i64,
    pub nombre: String,
    pub email: String,
    #[sqlx(try_from = "String")]
    pub rol: UserRole,
    pub telefono: Option<String>,
    pub perfil_completo: bool,
    #[sqlx(try_from = "String")]
    pub estado: AccountStatus,
    pub avatar: Option<String>,
    pub notificaciones_email: bool,
    pub notificaciones_push: bool,
    pub fecha_creacion: DateTime<Utc>,
    pub fecha_actualizacion: DateTime<Utc>,
    pub ultimo_acceso: Option<DateTime<Utc>>,
}

impl Principal {
    pub fn is_active(&self) -> bool {
        self.estado == AccountStatus::Activo
    }

    pub fn is_admin(&self) -> bool {
        self.rol == UserRole::Administrador
    }
}

/// The principal's active family group, as attached to the context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FamilyMembership {
    pub grupo_id: i64,
    pub codigo_familia: String,
    pub nombre: String,
    pub rol: MembershipRole,
    pub estado: MembershipStatus,
}

impl FamilyMembership {
    pub fn is_group_admin(&self) -> bool {
        self.rol == MembershipRole::Administrador
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AuthContext {
    #[serde(flatten)]
    pub principal: Principal,
    /// `null` when the principal has no active membership in an active group
    pub grupo_familiar: Option<FamilyMembership>,
}

impl AuthContext {
    pub fn user_id(&self) -> i64 {
        self.principal.id
    }

    pub fn is_admin(&self) -> bool {
        self.principal.is_admin()
    }

    /// The active family group id, or `403 SIN_GRUPO_FAMILIAR`.
    pub fn family_group_id(&self) -> Result<i64, AppError> {
        self.grupo_familiar
            .as_ref()
            .map(|m| m.grupo_id)
            .ok_or_else(|| {
                AppError::forbidden(
                    ErrorCode::NoFamilyGroup,
                    "Debes pertenecer a un grupo familiar para realizar esta acción",
                )
            })
    }

    /// Attaches the context to the request for downstream handlers.
    pub fn bind(self, req: &mut Request) {
        req.extensions_mut().insert(self);
    }
}

impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<AuthContext>().cloned().ok_or_else(|| {
            tracing::error!(
                path = %parts.uri.path(),
                "AuthContext requested on a route without the auth middleware"
            );
            AppError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::AuthenticationError,
                "Error en la autenticación",
            )
        })
    }
}

/// Handler argument for group-scoped routes: the context plus its active group id.
#[derive(Debug, Clone)]
pub struct GroupMember {
    pub auth: AuthContext,
    pub grupo_id: i64,
}

impl<S> FromRequestParts<S> for GroupMember
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth = AuthContext::from_request_parts(parts, state).await?;
        let grupo_id = auth.family_group_id()?;
        Ok(GroupMember { auth, grupo_id })
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::principal;
    use super::*;

    #[test]
    fn test_enum_round_trip_through_text() {
        assert_eq!(UserRole::try_from("administrador").unwrap(), UserRole::Administrador);
        assert_eq!(AccountStatus::try_from("suspendido").unwrap(), AccountStatus::Suspendido);
        assert_eq!(MembershipRole::Miembro.as_str(), "miembro");
        assert!(UserRole::try_from("root").is_err());
    }

    #[test]
    fn test_serializes_flat_principal_and_null_group() {
        let ctx = AuthContext {
            principal: principal(42),
            grupo_familiar: None,
        };
        let json = serde_json::to_value(&ctx).unwrap();
        assert_eq!(json["id"], 42);
        assert_eq!(json["rol"], "usuario");
        assert_eq!(json["estado"], "activo");
        assert!(json["grupo_familiar"].is_null());
    }

    #[test]
    fn test_family_group_id_requires_membership() {
        let mut ctx = AuthContext {
            principal: principal(1),
            grupo_familiar: None,
        };
        let err = ctx.family_group_id().unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
        assert_eq!(err.code, ErrorCode::NoFamilyGroup);

        ctx.grupo_familiar = Some(FamilyMembership {
            grupo_id: 9,
            codigo_familia: "FAM1".to_string(),
            nombre: "Familia Pérez".to_string(),
            rol: MembershipRole::Miembro,
            estado: MembershipStatus::Activo,
        });
        assert_eq!(ctx.family_group_id().unwrap(), 9);
    }

    #[test]
    fn test_bind_inserts_into_extensions() {
        let ctx = AuthContext {
            principal: principal(3),
            grupo_familiar: None,
        };
        let mut req = Request::new(axum::body::Body::empty());
        ctx.clone().bind(&mut req);
        assert_eq!(req.extensions().get::<AuthContext>(), Some(&ctx));
    }
}
