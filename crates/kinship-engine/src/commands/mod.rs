//! Command handlers with boundary logging.
//!
//! ## Logging Ownership
//!
//! Each public command owns lifecycle logging for its operation:
//! - `log_op_start!` at entry
//! - `log_op_end!` on success
//! - `log_op_error!` on failure
//!
//! Lower layers (store, core) use only `tracing::debug!()` / `warn!()`.
//!
//! Writes run inside one immediate transaction per command so the
//! hydrate-check-persist sequence is serialized against other writers.

pub mod matching;
pub mod member;
pub mod spouse;
pub mod tree;
pub mod user;

use kinship_store::errors::from_rusqlite;
use kinship_store::Result;
use rusqlite::{Connection, Transaction, TransactionBehavior};

/// Fresh time-ordered identifier
pub(crate) fn new_id() -> String {
    uuid::Uuid::now_v7().to_string()
}

/// Today's date in UTC, used for spouse start dates and default end dates
pub(crate) fn today() -> chrono::NaiveDate {
    chrono::Utc::now().date_naive()
}

/// Begin a transaction holding the write lock from the start
pub(crate) fn write_tx(conn: &mut Connection) -> Result<Transaction<'_>> {
    conn.transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(from_rusqlite)
}
