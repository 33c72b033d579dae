use sqlx::{FromRow, PgPool};
use tracing::{info, instrument};

use cuidame_auth::create_access_token;
use cuidame_config::JwtConfig;
use cuidame_core::{AppError, ErrorCode, hash_password, verify_password};

use crate::middleware::context::{PRINCIPAL_COLUMNS, Principal};
use crate::modules::users::model::is_profile_complete;
use crate::utils::db::is_unique_violation;

use super::model::{AuthResponse, LoginRequest, RegisterRequest, normalize_email};

const INVALID_CREDENTIALS: &str = "Email o contraseña incorrectos";

#[derive(FromRow)]
struct PrincipalWithPassword {
    #[sqlx(flatten)]
    principal: Principal,
    password_hash: String,
}

pub struct AuthService;

impl AuthService {
    fn issue(principal: Principal, jwt_config: &JwtConfig) -> Result<AuthResponse, AppError> {
        let token = create_access_token(
            principal.id,
            &principal.email,
            &principal.nombre,
            principal.rol.as_str(),
            jwt_config,
        )?;
        Ok(AuthResponse::bearer(token, jwt_config.expires_in, principal))
    }

    #[instrument(skip(db, dto, jwt_config), fields(email = %dto.email))]
    pub async fn register(
        db: &PgPool,
        dto: RegisterRequest,
        jwt_config: &JwtConfig,
    ) -> Result<AuthResponse, AppError> {
        let email = normalize_email(&dto.email);
        let nombre = dto.nombre.trim().to_string();
        let telefono = dto
            .telefono
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        let password_hash = hash_password(&dto.password)?;

        let principal = sqlx::query_as::<_, Principal>(&format!(
            r#"INSERT INTO usuarios (nombre, email, password_hash, telefono, perfil_completo)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING {PRINCIPAL_COLUMNS}"#
        ))
        .bind(&nombre)
        .bind(&email)
        .bind(&password_hash)
        .bind(&telefono)
        .bind(is_profile_complete(&nombre, telefono.as_deref()))
        .fetch_one(db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, None) {
                return AppError::conflict(
                    ErrorCode::EmailInUse,
                    "Ya existe una cuenta con este email",
                );
            }
            AppError::from(e)
        })?;

        info!(user_id = principal.id, "User registered");
        Self::issue(principal, jwt_config)
    }

    #[instrument(skip(db, dto, jwt_config), fields(email = %dto.email))]
    pub async fn login(
        db: &PgPool,
        dto: LoginRequest,
        jwt_config: &JwtConfig,
    ) -> Result<AuthResponse, AppError> {
        let invalid = || AppError::unauthorized(ErrorCode::InvalidCredentials, INVALID_CREDENTIALS);

        let record = sqlx::query_as::<_, PrincipalWithPassword>(&format!(
            "SELECT {PRINCIPAL_COLUMNS}, password_hash FROM usuarios WHERE email = $1"
        ))
        .bind(normalize_email(&dto.email))
        .fetch_optional(db)
        .await?
        .ok_or_else(invalid)?;

        if !verify_password(&dto.password, &record.password_hash)? {
            return Err(invalid());
        }
        if !record.principal.is_active() {
            return Err(invalid());
        }

        let principal = sqlx::query_as::<_, Principal>(&format!(
            "UPDATE usuarios SET ultimo_acceso = NOW() WHERE id = $1 RETURNING {PRINCIPAL_COLUMNS}"
        ))
        .bind(record.principal.id)
        .fetch_one(db)
        .await?;

        info!(user_id = principal.id, "User logged in");
        Self::issue(principal, jwt_config)
    }
}
