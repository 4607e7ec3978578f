//! Kinship Engine - Orchestration layer
//!
//! Coordinates the pure core ops with SQLite persistence:
//! - Command functions that hydrate a tree, apply one op and persist the
//!   result in a single transaction, with boundary logging
//! - The asynchronous match-indexing queue and its worker thread
//! - The notification seam for new matches
//! - Configuration loading

pub mod commands;
pub mod config;
pub mod notify;
pub mod queue;

pub use config::KinshipConfig;
pub use notify::{MatchNotice, NotificationDispatcher, TracingNotifier};
pub use queue::{MatchQueue, MatchWorker, NoopQueue, RetryPolicy, WorkerStats};
