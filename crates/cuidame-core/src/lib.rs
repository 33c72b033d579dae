//! # CuidaMe Core
//!
//! Foundational types shared by every CuidaMe crate:
//!
//! - [`errors`]: [`AppError`], [`ErrorCode`] and the structured error body
//! - [`response`]: the `{ exito, mensaje, datos }` success envelope
//! - [`pagination`]: query parameters and metadata for list endpoints
//! - [`password`]: bcrypt hashing and verification

pub mod errors;
pub mod pagination;
pub mod password;
pub mod response;

pub use errors::{AppError, ErrorBody, ErrorCode, timestamp_now};
pub use pagination::{Paginated, PaginationMeta, PaginationParams};
pub use password::{hash_password, verify_password};
pub use response::{ApiResponse, MessageResponse};
