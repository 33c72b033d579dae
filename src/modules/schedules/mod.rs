//! Caregiving shifts (`horarios`), scoped to the caller's family group.

pub mod controller;
pub mod model;
pub mod router;
pub mod service;
