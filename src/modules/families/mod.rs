//! Family groups: creation, joining by code, membership.
//!
//! A principal holds at most one active membership. Every group-scoped module reads the
//! group id from the caller's [`AuthContext`](crate::middleware::context::AuthContext), never
//! from the request.

pub mod controller;
pub mod model;
pub mod router;
pub mod service;
