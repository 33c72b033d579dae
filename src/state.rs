use std::sync::Arc;

use sqlx::PgPool;

use cuidame_config::{CorsConfig, JwtConfig};

use crate::middleware::identity::{PgPrincipalStore, PrincipalStore};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub jwt_config: JwtConfig,
    pub cors_config: CorsConfig,
    /// Identity lookup used by the auth middleware.
    pub principals: Arc<dyn PrincipalStore>,
}

impl AppState {
    pub fn new(db: PgPool, jwt_config: JwtConfig, cors_config: CorsConfig) -> Self {
        let principals = Arc::new(PgPrincipalStore::new(db.clone()));
        Self {
            db,
            jwt_config,
            cors_config,
            principals,
        }
    }

    pub fn from_env(db: PgPool) -> Self {
        Self::new(db, JwtConfig::from_env(), CorsConfig::from_env())
    }

    /// Replaces the identity store, e.g. with an in-memory one in tests.
    pub fn with_principal_store(mut self, store: Arc<dyn PrincipalStore>) -> Self {
        self.principals = store;
        self
    }
}
