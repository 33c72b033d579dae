//! Request authentication and authorization.
//!
//! # Modules
//!
//! - [`credential`]: locates the bearer credential in a request
//! - [`identity`]: loads the principal and its family group from storage
//! - [`context`]: the per-request [`AuthContext`](context::AuthContext) and its extractors
//! - [`auth`]: the `require_auth` middleware wiring the above together
//! - [`role`]: account-role checks layered on top of `require_auth`
//!
//! # Flow
//!
//! 1. `require_auth` pulls a token from the header, query, cookie or body
//! 2. The token is verified against the configured secret
//! 3. The principal id is resolved to an active account, plus its active group if any
//! 4. The resulting `AuthContext` is inserted into request extensions
//! 5. Handlers take `AuthContext` or `GroupMember` as an argument
//!
//! ```ignore
//! async fn mi_familia(auth: AuthContext) -> Result<Json<ApiResponse<FamilyGroup>>, AppError> {
//!     let grupo_id = auth.family_group_id()?;
//!     // ...
//! }
//! ```

pub mod auth;
pub mod context;
pub mod credential;
pub mod identity;
pub mod role;
