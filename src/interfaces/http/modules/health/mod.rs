//! Liveness/readiness endpoint

pub mod handlers;

pub use handlers::*;
