use chrono::NaiveDate;
use kinship_core::model::{FamilyTree, Gender, Member, NewMember, ParentLink, ParentRole, User};
use kinship_store::{db, SqliteRepo};
use rusqlite::Connection;
use tempfile::TempDir;
use uuid::Uuid;

/// Open a migrated on-disk database in a fresh temp directory
///
/// Keep the TempDir alive for the duration of the test.
pub fn setup_db() -> (TempDir, Connection) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let conn = db::open_ready(dir.path().join("test.db")).expect("Failed to open db");
    (dir, conn)
}

/// Create a user with one tree; returns (user_id, tree_id)
pub fn seed_owner(conn: &Connection, email: &str) -> (String, String) {
    let user = User::new(Uuid::now_v7().to_string(), None, email.to_string());
    SqliteRepo::insert_user(conn, &user).unwrap();
    let tree = FamilyTree::new(Uuid::now_v7().to_string(), user.id.clone(), "Tree".to_string());
    SqliteRepo::insert_tree(conn, &tree).unwrap();
    (user.id, tree.id)
}

/// Insert a member directly; returns its id
#[allow(dead_code)]
pub fn seed_member(conn: &Connection, tree_id: &str, name: &str, birth_year: Option<i32>) -> String {
    let mut profile = NewMember::new(name, Gender::Unknown);
    if let Some(y) = birth_year {
        profile = profile.born(NaiveDate::from_ymd_opt(y, 1, 1).unwrap());
    }
    let member = Member::new(Uuid::now_v7().to_string(), tree_id.to_string(), profile, 0);
    SqliteRepo::insert_member(conn, &member).unwrap();
    member.id
}

#[allow(dead_code)]
pub fn link(child: &str, parent: &str, role: ParentRole) -> ParentLink {
    ParentLink::new(child.to_string(), parent.to_string(), role)
}
