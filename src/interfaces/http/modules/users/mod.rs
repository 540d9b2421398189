//! Users module: account CRUD and self-service password change

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
