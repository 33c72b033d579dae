//! Profile management and the administrator account listing.

pub mod controller;
pub mod model;
pub mod router;
pub mod service;
