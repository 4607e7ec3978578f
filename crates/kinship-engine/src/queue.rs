//! Asynchronous match indexing
//!
//! Mutating commands hand member ids to a `MatchQueue` after their
//! transaction commits and return immediately. `MatchWorker` consumes the
//! ids on a background thread with its own connection and retry policy, so
//! indexing failures never reach the caller that triggered them.

use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use kinship_core::errors::ExErrorKind;
use kinship_core::matching::MatchPolicy;
use kinship_core_types::schema::EVENT_JOB_FAILED;
use kinship_core_types::RequestId;
use kinship_store::{db, Result};
use rusqlite::Connection;

use crate::commands::matching::index_member;
use crate::notify::NotificationDispatcher;

/// Handoff point between mutations and the matching pipeline
///
/// Fire-and-forget: enqueueing never fails from the caller's point of view.
pub trait MatchQueue: Send + Sync {
    fn enqueue(&self, member_id: &str);
}

/// Queue that drops every job, for callers with matching disabled
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopQueue;

impl MatchQueue for NoopQueue {
    fn enqueue(&self, member_id: &str) {
        tracing::debug!(member_id = member_id, "matching disabled, job dropped");
    }
}

/// Retry schedule for one indexing job
///
/// Only persistence failures (busy database, I/O) are retried; the delay
/// doubles after each attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(50),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
    }

    fn should_retry(&self, kind: ExErrorKind, attempt: u32) -> bool {
        kind == ExErrorKind::Persistence && attempt < self.max_attempts
    }
}

/// Counters reported when a worker shuts down
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub processed: usize,
    pub failed: usize,
    pub matches_created: usize,
}

/// Background thread running `index_member` for queued member ids
pub struct MatchWorker {
    sender: Mutex<Option<Sender<String>>>,
    handle: Mutex<Option<JoinHandle<WorkerStats>>>,
}

impl MatchWorker {
    /// Open a dedicated connection to `db_path` and start the worker thread
    ///
    /// # Errors
    ///
    /// Returns `Persistence` if the database can't be opened or migrated,
    /// `Io` if the thread can't be spawned.
    pub fn spawn<P: AsRef<Path>>(
        db_path: P,
        policy: MatchPolicy,
        notifier: Arc<dyn NotificationDispatcher>,
        retry: RetryPolicy,
    ) -> Result<Self> {
        let conn = db::open_ready(db_path)?;
        let (sender, receiver) = mpsc::channel::<String>();

        let handle = thread::Builder::new()
            .name("kinship-match-worker".to_string())
            .spawn(move || run_jobs(conn, receiver, policy, notifier.as_ref(), retry))
            .map_err(|e| kinship_store::errors::io_error("spawn match worker", e))?;

        tracing::debug!("match worker started");

        Ok(Self {
            sender: Mutex::new(Some(sender)),
            handle: Mutex::new(Some(handle)),
        })
    }

    /// Stop accepting jobs, drain the ones already queued and join the thread
    ///
    /// Calling it again returns empty stats.
    pub fn shutdown(&self) -> WorkerStats {
        if let Ok(mut sender) = self.sender.lock() {
            sender.take();
        }

        let handle = self.handle.lock().ok().and_then(|mut h| h.take());
        match handle.map(JoinHandle::join) {
            Some(Ok(stats)) => {
                tracing::debug!(
                    processed = stats.processed,
                    failed = stats.failed,
                    "match worker stopped"
                );
                stats
            }
            Some(Err(_)) => {
                tracing::error!("match worker panicked");
                WorkerStats::default()
            }
            None => WorkerStats::default(),
        }
    }
}

impl MatchQueue for MatchWorker {
    fn enqueue(&self, member_id: &str) {
        let sent = self
            .sender
            .lock()
            .ok()
            .and_then(|s| s.as_ref().map(|tx| tx.send(member_id.to_string()).is_ok()))
            .unwrap_or(false);

        if !sent {
            tracing::warn!(
                op = "index_member",
                event = EVENT_JOB_FAILED,
                member_id = member_id,
                "match worker is stopped, job dropped"
            );
        }
    }
}

impl Drop for MatchWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_jobs(
    conn: Connection,
    receiver: Receiver<String>,
    policy: MatchPolicy,
    notifier: &dyn NotificationDispatcher,
    retry: RetryPolicy,
) -> WorkerStats {
    let mut stats = WorkerStats::default();

    for member_id in receiver {
        let request_id = RequestId::new();
        let span = tracing::info_span!("index_job", request_id = %request_id);
        let _guard = span.enter();

        let mut attempt = 1;
        loop {
            match index_member(&member_id, &policy, notifier, &conn) {
                Ok(outcome) => {
                    stats.processed += 1;
                    stats.matches_created += outcome.matches_created.len();
                    break;
                }
                Err(e) if retry.should_retry(e.kind(), attempt) => {
                    tracing::debug!(
                        member_id = %member_id,
                        attempt = attempt,
                        error_code = e.code(),
                        "retrying index job"
                    );
                    thread::sleep(retry.delay_for(attempt));
                    attempt += 1;
                }
                Err(e) => {
                    let e = e.with_request_id(request_id.clone());
                    stats.failed += 1;
                    tracing::warn!(
                        op = "index_member",
                        event = EVENT_JOB_FAILED,
                        member_id = %member_id,
                        request_id = e.request_id().map(RequestId::as_str),
                        attempts = attempt,
                        error_code = e.code(),
                        err_message = %e,
                        "index job abandoned"
                    );
                    break;
                }
            }
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_delay_doubles() {
        let retry = RetryPolicy {
            max_attempts: 4,
            base_delay: Duration::from_millis(10),
        };
        assert_eq!(retry.delay_for(1), Duration::from_millis(10));
        assert_eq!(retry.delay_for(2), Duration::from_millis(20));
        assert_eq!(retry.delay_for(3), Duration::from_millis(40));
    }

    #[test]
    fn test_only_persistence_failures_retry() {
        let retry = RetryPolicy::default();
        assert!(retry.should_retry(ExErrorKind::Persistence, 1));
        assert!(!retry.should_retry(ExErrorKind::Persistence, 3));
        assert!(!retry.should_retry(ExErrorKind::ConstraintViolation, 1));
        assert!(!retry.should_retry(ExErrorKind::NotFound, 1));
    }

    #[test]
    fn test_noop_queue_accepts_jobs() {
        NoopQueue.enqueue("m1");
    }
}
