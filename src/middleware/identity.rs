//! Identity resolution: principal id → [`AuthContext`].
//!
//! The lookup is a single query joining the account with its active membership and the
//! membership's group. Accounts that are not `activo` resolve as not found, never as their
//! stored profile. A membership is attached only when both the membership and its group are
//! active.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use tracing::instrument;

use crate::middleware::context::{
    AuthContext, FamilyMembership, MembershipRole, MembershipStatus, Principal,
};

/// One row of the principal lookup. Membership columns are null when the LEFT JOINs miss.
#[derive(Debug, Clone, FromRow)]
pub struct PrincipalRecord {
    #[sqlx(flatten)]
    pub principal: Principal,
    pub membresia_estado: Option<String>,
    pub membresia_rol: Option<String>,
    pub grupo_id: Option<i64>,
    pub codigo_familia: Option<String>,
    pub grupo_nombre: Option<String>,
    pub grupo_activo: Option<bool>,
}

impl PrincipalRecord {
    /// A record with no membership columns, as returned for a groupless principal.
    pub fn without_group(principal: Principal) -> Self {
        Self {
            principal,
            membresia_estado: None,
            membresia_rol: None,
            grupo_id: None,
            codigo_familia: None,
            grupo_nombre: None,
            grupo_activo: None,
        }
    }

    fn membership(&self) -> Option<FamilyMembership> {
        let estado = MembershipStatus::try_from(self.membresia_estado.as_deref()?).ok()?;
        if estado != MembershipStatus::Activo || self.grupo_activo != Some(true) {
            return None;
        }

        Some(FamilyMembership {
            grupo_id: self.grupo_id?,
            codigo_familia: self.codigo_familia.clone()?,
            nombre: self.grupo_nombre.clone()?,
            rol: self
                .membresia_rol
                .as_deref()
                .and_then(|r| MembershipRole::try_from(r).ok())
                .unwrap_or(MembershipRole::Miembro),
            estado,
        })
    }

    /// Builds the context, or `None` if the account is not active.
    pub fn into_context(self) -> Option<AuthContext> {
        if !self.principal.is_active() {
            return None;
        }
        let grupo_familiar = self.membership();
        Some(AuthContext {
            principal: self.principal,
            grupo_familiar,
        })
    }
}

/// Storage seam for identity resolution.
#[async_trait]
pub trait PrincipalStore: Send + Sync {
    /// Returns the active account with the given id, joined with its active membership.
    async fn find_active_principal(&self, id: i64) -> Result<Option<PrincipalRecord>, sqlx::Error>;
}

#[derive(Clone, Debug)]
pub struct PgPrincipalStore {
    pool: PgPool,
}

impl PgPrincipalStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const FIND_ACTIVE_PRINCIPAL_SQL: &str = r#"
    SELECT
        u.id, u.nombre, u.email, u.rol, u.telefono, u.perfil_completo, u.estado, u.avatar,
        u.notificaciones_email, u.notificaciones_push,
        u.fecha_creacion, u.fecha_actualizacion, u.ultimo_acceso,
        mg.estado AS membresia_estado,
        mg.rol AS membresia_rol,
        g.id AS grupo_id,
        g.codigo_familia,
        g.nombre AS grupo_nombre,
        g.activo AS grupo_activo
    FROM usuarios u
    LEFT JOIN miembros_grupo mg
        ON mg.usuario_id = u.id AND mg.estado = 'activo'
    LEFT JOIN grupos_familiares g
        ON g.id = mg.grupo_id AND g.activo = TRUE
    WHERE u.id = $1 AND u.estado = 'activo'
    ORDER BY (g.id IS NULL), mg.fecha_union DESC
    LIMIT 1
"#;

#[async_trait]
impl PrincipalStore for PgPrincipalStore {
    #[instrument(skip(self))]
    async fn find_active_principal(&self, id: i64) -> Result<Option<PrincipalRecord>, sqlx::Error> {
        sqlx::query_as::<_, PrincipalRecord>(FIND_ACTIVE_PRINCIPAL_SQL)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("no active principal with this id")]
    PrincipalNotFound,
    #[error("principal lookup failed: {0}")]
    ResolutionFailed(#[source] sqlx::Error),
}

/// Loads the full identity for a principal id.
pub async fn resolve_identity(
    store: &dyn PrincipalStore,
    id: i64,
) -> Result<AuthContext, ResolveError> {
    store
        .find_active_principal(id)
        .await
        .map_err(ResolveError::ResolutionFailed)?
        .and_then(PrincipalRecord::into_context)
        .ok_or(ResolveError::PrincipalNotFound)
}
