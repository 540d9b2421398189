//! Infrastructure layer - external concerns

pub mod crypto;
pub mod database;
pub mod storage;

pub use database::repositories::SeaOrmAccountRepository;
pub use database::{init_database, DatabaseConfig, PoolConfig};
pub use storage::InMemoryAccountRepository;
