use thiserror::Error;

/// Why a credential was rejected.
#[derive(Debug, Error)]
pub enum TokenError {
    /// The process has no signing secret. A deployment fault, not a client error.
    #[error("JWT signing secret is not configured")]
    SigningSecretMissing,

    /// Malformed token, bad signature or wrong algorithm.
    #[error("invalid token: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),

    #[error("token has expired")]
    Expired,

    /// Signature checks out but the claims carry no principal id.
    #[error("token carries no principal id")]
    MissingPrincipalId,

    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

impl TokenError {
    /// True for failures caused by the deployment rather than the client.
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, Self::SigningSecretMissing | Self::Signing(_))
    }
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => Self::Expired,
            _ => Self::Invalid(err),
        }
    }
}
