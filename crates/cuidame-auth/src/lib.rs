//! # CuidaMe Auth
//!
//! Bearer credential handling for the CuidaMe API.
//!
//! - [`claims`]: the signed claim set and the decoded [`TokenIdentity`]
//! - [`jwt`]: token issuing and the token validator
//! - [`error`]: [`TokenError`], the validator's failure kinds
//!
//! # Example
//!
//! ```ignore
//! use cuidame_auth::{create_access_token, verify_token};
//! use cuidame_config::JwtConfig;
//!
//! let config = JwtConfig::from_env();
//! let token = create_access_token(42, "ana@example.com", "Ana", "usuario", &config)?;
//! let identity = verify_token(&token, &config)?;
//! assert_eq!(identity.id, 42);
//! ```

pub mod claims;
pub mod error;
pub mod jwt;

pub use claims::{Claims, DEFAULT_ROLE, TokenIdentity};
pub use error::TokenError;
pub use jwt::{create_access_token, encode_claims, verify_token};
