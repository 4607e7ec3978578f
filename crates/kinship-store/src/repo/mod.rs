//! Repository layer for persisting domain models to SQLite
//!
//! Bridges the in-memory core Store to SQLite persistence

pub mod hydration;
mod rows;
pub mod sqlite_repo;

pub use sqlite_repo::SqliteRepo;
