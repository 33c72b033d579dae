//! Shared helpers for the feature modules.
//!
//! - [`auth_helpers`]: family-group membership checks
//! - [`db`]: classification of database errors
//! - [`patch`]: merging partial updates
//! - [`serde`]: lenient query-string deserializers

pub mod auth_helpers;
pub mod db;
pub mod patch;
pub mod serde;
