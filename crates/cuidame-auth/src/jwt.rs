//! Token issuing and validation (HS256).

use std::collections::HashSet;

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use cuidame_config::JwtConfig;

use crate::claims::{Claims, TokenIdentity};
use crate::error::TokenError;

/// Signs an access token for a principal.
pub fn create_access_token(
    id: i64,
    email: &str,
    nombre: &str,
    rol: &str,
    jwt_config: &JwtConfig,
) -> Result<String, TokenError> {
    let now = Utc::now().timestamp();

    let claims = Claims {
        id: Some(id),
        email: Some(email.to_string()),
        nombre: Some(nombre.to_string()),
        rol: Some(rol.to_string()),
        iat: Some(now),
        exp: Some(now + jwt_config.expires_in),
    };

    encode_claims(&claims, jwt_config)
}

/// Signs an arbitrary claim set.
pub fn encode_claims(claims: &Claims, jwt_config: &JwtConfig) -> Result<String, TokenError> {
    let secret = jwt_config
        .secret_bytes()
        .ok_or(TokenError::SigningSecretMissing)?;

    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(TokenError::Signing)
}

/// Verifies the signature and, when `exp` is present, the expiry. Then checks the claims
/// carry a principal id.
///
/// Expiry is reported separately from every other invalidity so callers can tell
/// "sign in again" apart from "this token is garbage".
pub fn verify_token(token: &str, jwt_config: &JwtConfig) -> Result<TokenIdentity, TokenError> {
    let secret = jwt_config
        .secret_bytes()
        .ok_or(TokenError::SigningSecretMissing)?;

    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.required_spec_claims = HashSet::new();

    let data = decode::<Claims>(token, &DecodingKey::from_secret(secret), &validation)?;

    data.claims
        .into_identity()
        .ok_or(TokenError::MissingPrincipalId)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig::new("test-secret-key-at-least-32-characters-long", 3600)
    }

    fn claims(id: Option<i64>, exp_offset: i64) -> Claims {
        let now = Utc::now().timestamp();
        Claims {
            id,
            email: Some("ana@example.com".to_string()),
            nombre: Some("Ana".to_string()),
            rol: None,
            iat: Some(now),
            exp: Some(now + exp_offset),
        }
    }

    #[test]
    fn test_create_and_verify() {
        let config = test_config();
        let token =
            create_access_token(42, "ana@example.com", "Ana", "administrador", &config).unwrap();

        let identity = verify_token(&token, &config).unwrap();
        assert_eq!(identity.id, 42);
        assert_eq!(identity.email.as_deref(), Some("ana@example.com"));
        assert_eq!(identity.nombre.as_deref(), Some("Ana"));
        assert_eq!(identity.rol, "administrador");
    }

    #[test]
    fn test_role_defaults_when_absent() {
        let config = test_config();
        let token = encode_claims(&claims(Some(5), 600), &config).unwrap();
        assert_eq!(verify_token(&token, &config).unwrap().rol, "usuario");
    }

    #[test]
    fn test_id_only_token_is_accepted() {
        let config = test_config();
        let id_only = Claims {
            id: Some(42),
            email: None,
            nombre: None,
            rol: None,
            iat: None,
            exp: None,
        };
        let token = encode_claims(&id_only, &config).unwrap();

        let identity = verify_token(&token, &config).unwrap();
        assert_eq!(identity.id, 42);
        assert_eq!(identity.rol, "usuario");
        assert!(identity.email.is_none());
    }

    #[test]
    fn test_garbage_is_invalid() {
        let result = verify_token("not-a-token", &test_config());
        assert!(matches!(result, Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let token = encode_claims(&claims(Some(1), 600), &test_config()).unwrap();
        let other = JwtConfig::new("different-secret-key-at-least-32-characters", 3600);
        assert!(matches!(
            verify_token(&token, &other),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn test_expired_is_distinct() {
        let config = test_config();
        let token = encode_claims(&claims(Some(1), -3600), &config).unwrap();
        assert!(matches!(
            verify_token(&token, &config),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn test_valid_signature_without_id_is_rejected() {
        let config = test_config();
        let token = encode_claims(&claims(None, 600), &config).unwrap();
        assert!(matches!(
            verify_token(&token, &config),
            Err(TokenError::MissingPrincipalId)
        ));
    }

    #[test]
    fn test_missing_secret() {
        let config = JwtConfig {
            secret: None,
            expires_in: 3600,
        };
        assert!(matches!(
            verify_token("whatever", &config),
            Err(TokenError::SigningSecretMissing)
        ));
        assert!(matches!(
            create_access_token(1, "a@b.com", "A", "usuario", &config),
            Err(TokenError::SigningSecretMissing)
        ));
    }

    #[test]
    fn test_other_algorithm_is_invalid() {
        let config = test_config();
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims(Some(1), 600),
            &EncodingKey::from_secret(config.secret_bytes().unwrap()),
        )
        .unwrap();
        assert!(matches!(
            verify_token(&token, &config),
            Err(TokenError::Invalid(_))
        ));
    }
}
