use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::middleware::context::Principal;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(
        min = 2,
        max = 100,
        message = "El nombre debe tener entre 2 y 100 caracteres"
    ))]
    pub nombre: String,
    #[validate(email(message = "El email no es válido"))]
    pub email: String,
    #[validate(length(min = 8, message = "La contraseña debe tener al menos 8 caracteres"))]
    pub password: String,
    #[validate(length(max = 30, message = "El teléfono no puede superar 30 caracteres"))]
    pub telefono: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "El email no es válido"))]
    pub email: String,
    #[validate(length(min = 1, message = "La contraseña es obligatoria"))]
    pub password: String,
}

/// Issued on registration and login.
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    /// Always `Bearer`
    pub tipo: String,
    /// Token lifetime in seconds
    pub expira_en: i64,
    pub usuario: Principal,
}

impl AuthResponse {
    pub fn bearer(token: String, expira_en: i64, usuario: Principal) -> Self {
        Self {
            token,
            tipo: "Bearer".to_string(),
            expira_en,
            usuario,
        }
    }
}

/// Lowercased, trimmed email used for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ana.Perez@Example.COM "), "ana.perez@example.com");
    }

    #[test]
    fn test_register_rules() {
        let dto = RegisterRequest {
            nombre: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            password: "corta".to_string(),
            telefono: None,
        };
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password"));
        assert!(!errors.field_errors().contains_key("email"));
    }
}
