//! HTTP REST API interfaces
//!
//! - `common`: error envelope and validating JSON extractor
//! - `modules`: per-resource handlers and DTOs (users, health, metrics)
//! - `router`: API router with Swagger documentation

pub mod common;
pub mod modules;
pub mod router;

pub use router::{create_api_router, ApiContext, ApiDoc};
