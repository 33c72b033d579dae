//! Credential claim set.
//!
//! Tokens carry the principal id and, optionally, the email, display name and role that
//! were current at issuance. Only the id is trusted: the full identity is re-read from
//! storage on every request.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Role assumed when a token carries none.
pub const DEFAULT_ROLE: &str = "usuario";

/// Claims as signed into the token.
///
/// `id` is optional at the type level so that a structurally incomplete token decodes and
/// can be rejected as [`TokenError::MissingPrincipalId`](crate::TokenError::MissingPrincipalId)
/// rather than as a generic decoding failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Checked when present; tokens without it never expire.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

/// Minimal identity decoded from a valid token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TokenIdentity {
    pub id: i64,
    pub email: Option<String>,
    pub nombre: Option<String>,
    /// Advisory only; the stored role is authoritative.
    pub rol: String,
}

impl Claims {
    /// Returns `None` when the principal id is absent or not a positive integer.
    pub fn into_identity(self) -> Option<TokenIdentity> {
        let id = self.id.filter(|id| *id > 0)?;
        Some(TokenIdentity {
            id,
            email: self.email,
            nombre: self.nombre,
            rol: self
                .rol
                .filter(|r| !r.is_empty())
                .unwrap_or_else(|| DEFAULT_ROLE.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_defaults_to_usuario() {
        let claims: Claims = serde_json::from_str(r#"{"id":42,"exp":9999999999}"#).unwrap();
        let identity = claims.into_identity().unwrap();
        assert_eq!(identity.id, 42);
        assert_eq!(identity.rol, DEFAULT_ROLE);
        assert!(identity.email.is_none());
    }

    #[test]
    fn test_explicit_role_is_kept() {
        let claims: Claims =
            serde_json::from_str(r#"{"id":7,"rol":"administrador","exp":9999999999}"#).unwrap();
        assert_eq!(claims.into_identity().unwrap().rol, "administrador");
    }

    #[test]
    fn test_missing_id_has_no_identity() {
        let claims: Claims =
            serde_json::from_str(r#"{"email":"a@b.com","exp":9999999999}"#).unwrap();
        assert!(claims.into_identity().is_none());
    }

    #[test]
    fn test_non_positive_id_has_no_identity() {
        let claims: Claims = serde_json::from_str(r#"{"id":0,"exp":9999999999}"#).unwrap();
        assert!(claims.into_identity().is_none());
    }

    #[test]
    fn test_serialize_skips_absent_fields() {
        let claims = Claims {
            id: Some(1),
            email: None,
            nombre: None,
            rol: None,
            iat: None,
            exp: Some(10),
        };
        let json = serde_json::to_string(&claims).unwrap();
        assert_eq!(json, r#"{"id":1,"exp":10}"#);
    }

    #[test]
    fn test_id_alone_is_enough() {
        let claims: Claims = serde_json::from_str(r#"{"id":42}"#).unwrap();
        assert_eq!(claims.exp, None);
        assert_eq!(claims.into_identity().unwrap().id, 42);
    }
}
