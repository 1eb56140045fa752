// CCTV Infrastructure - SQLite Adapter
// Implements: RequestRepository

mod connection;
mod error;
mod migration;
mod request_repository;

pub use connection::{create_pool, is_in_memory};
pub use migration::run_migrations;
pub use request_repository::SqliteRequestRepository;
pub use sqlx::SqlitePool;
