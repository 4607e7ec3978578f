//! Subcommand handlers and the state they share

pub mod matching;
pub mod member;
pub mod spouse;
pub mod tree;
pub mod user;

use std::sync::Arc;

use kinship_core::logging_facility;
use kinship_engine::{KinshipConfig, MatchQueue, MatchWorker, NoopQueue, RetryPolicy, TracingNotifier};
use kinship_store::db;
use rusqlite::Connection;
use serde::Serialize;

/// Configuration, connection and match queue for one invocation
pub struct Context {
    pub config: KinshipConfig,
    pub conn: Connection,
    worker: Option<MatchWorker>,
}

impl Context {
    /// Load configuration, start logging, open the database and, when
    /// matching is enabled, the match worker
    pub fn open(db_override: Option<&str>) -> Result<Self, Box<dyn std::error::Error>> {
        let mut config = KinshipConfig::load()?;
        if let Some(path) = db_override {
            config.apply_db_path_override(path);
        }
        logging_facility::init(config.logging_profile());

        let conn = db::open_ready(&config.storage.db_path)?;
        let worker = if config.matching.enabled {
            Some(MatchWorker::spawn(
                &config.storage.db_path,
                config.match_policy(),
                Arc::new(TracingNotifier),
                RetryPolicy::default(),
            )?)
        } else {
            None
        };

        Ok(Self {
            config,
            conn,
            worker,
        })
    }

    /// Connection and queue borrowed together for mutating commands
    pub fn parts(&mut self) -> (&mut Connection, &dyn MatchQueue) {
        let queue: &dyn MatchQueue = match &self.worker {
            Some(worker) => worker,
            None => &NoopQueue,
        };
        (&mut self.conn, queue)
    }

    /// Drain queued match jobs and stop the worker
    pub fn finish(self) {
        if let Some(worker) = self.worker {
            let stats = worker.shutdown();
            tracing::debug!(
                processed = stats.processed,
                failed = stats.failed,
                matches_created = stats.matches_created,
                "match jobs drained"
            );
        }
    }
}

/// Print a value as pretty JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
