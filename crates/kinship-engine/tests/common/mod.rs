#![allow(dead_code)]

use std::sync::Mutex;

use chrono::NaiveDate;
use kinship_core::model::{Gender, NewMember};
use kinship_core::ExErrorKind;
use kinship_engine::commands::member::{member_add_with_relation, AddMemberRequest};
use kinship_engine::commands::tree::tree_create;
use kinship_engine::commands::user::user_create;
use kinship_engine::{MatchNotice, MatchQueue, NotificationDispatcher, NoopQueue};
use kinship_store::db;
use rusqlite::Connection;
use tempfile::TempDir;

/// Open a migrated on-disk database in a fresh temp directory
///
/// Keep the TempDir alive for the duration of the test.
pub fn setup_db() -> (TempDir, Connection) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let conn = db::open_ready(dir.path().join("kinship.db")).expect("Failed to open db");
    (dir, conn)
}

pub fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Create a user owning one tree whose root member has the given profile
///
/// Returns (user_id, tree_id, root_member_id).
pub fn seed_tree(conn: &mut Connection, email: &str, root: NewMember) -> (String, String, String) {
    let user = user_create(None, email.to_string(), conn).unwrap();
    let tree = tree_create(&user.id, "Family".to_string(), root, conn, &NoopQueue).unwrap();
    let root_id = tree.root_member_id.clone().unwrap();
    (user.id, tree.id, root_id)
}

pub fn request(tree_id: &str, related: &str, relation: &str, name: &str, gender: &str) -> AddMemberRequest {
    AddMemberRequest {
        tree_id: tree_id.to_string(),
        related_member_id: related.to_string(),
        relation_type: relation.to_string(),
        name: name.to_string(),
        gender: gender.to_string(),
        ..AddMemberRequest::default()
    }
}

/// Add a relative through the engine and return its id
pub fn add(conn: &mut Connection, tree_id: &str, related: &str, relation: &str, name: &str, gender: &str) -> String {
    member_add_with_relation(request(tree_id, related, relation, name, gender), conn, &NoopQueue)
        .unwrap()
        .member
        .id
}

pub fn john_smith(year: i32) -> NewMember {
    NewMember::new("John Smith", Gender::Male).born(ymd(year, 6, 1))
}

/// Queue that records member ids instead of indexing them
#[derive(Default)]
pub struct RecordingQueue {
    pub jobs: Mutex<Vec<String>>,
}

impl RecordingQueue {
    pub fn jobs(&self) -> Vec<String> {
        self.jobs.lock().unwrap().clone()
    }
}

impl MatchQueue for RecordingQueue {
    fn enqueue(&self, member_id: &str) {
        self.jobs.lock().unwrap().push(member_id.to_string());
    }
}

/// Dispatcher that records every notice it receives
#[derive(Default)]
pub struct RecordingNotifier {
    pub notices: Mutex<Vec<MatchNotice>>,
}

impl RecordingNotifier {
    pub fn count(&self) -> usize {
        self.notices.lock().unwrap().len()
    }
}

impl NotificationDispatcher for RecordingNotifier {
    fn notify_match(&self, notice: &MatchNotice) -> kinship_store::Result<()> {
        self.notices.lock().unwrap().push(notice.clone());
        Ok(())
    }
}

/// Dispatcher whose delivery always fails
pub struct FailingNotifier;

impl NotificationDispatcher for FailingNotifier {
    fn notify_match(&self, _notice: &MatchNotice) -> kinship_store::Result<()> {
        Err(kinship_core::ExError::new(ExErrorKind::ExternalService).with_message("smtp down"))
    }
}
