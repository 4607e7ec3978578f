//! Kinship Store - SQLite persistence for the relationship graph
//!
//! Provides:
//! - Connection helpers and embedded, checksummed migrations
//! - `SqliteRepo` row-level CRUD for users, trees, members, links and match state
//! - Hydration of one tree's graph into the core `Store`
//!
//! Uniqueness rules that must survive concurrent writers (two parents max,
//! one father/mother, one spouse link and one match per unordered pair) are
//! enforced by the schema, not only by the core ops.

pub mod db;
pub mod errors;
pub mod migrations;
pub mod repo;

// Re-export key types
pub use errors::Result;
pub use repo::SqliteRepo;
