//! # trygr-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the store port traits defined in `trygr-app::ports::storage`
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between domain types and database rows
//!
//! ## Dependency rule
//! Depends on `trygr-app` (for port traits) and `trygr-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

mod device_repo;
mod error;
mod location_repo;
mod pool;

pub use device_repo::SqliteDeviceStore;
pub use error::StorageError;
pub use location_repo::SqliteLocationStore;
pub use pool::{Config, Database};
