//! Registration, login and token verification.

pub mod controller;
pub mod model;
pub mod router;
pub mod service;
