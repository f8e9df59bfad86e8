//! Persistence implementations

pub mod memory;
#[cfg(feature = "postgres")]
pub mod database;
#[cfg(feature = "postgres")]
pub mod session_repository;

pub use memory::InMemorySessionDirectory;
#[cfg(feature = "postgres")]
pub use database::{create_pool, run_migrations, PoolConfig};
#[cfg(feature = "postgres")]
pub use session_repository::PgSessionDirectory;
