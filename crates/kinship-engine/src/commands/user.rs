//! User registration

use kinship_core::errors::{ExError, ExErrorKind};
use kinship_core::model::User;
use kinship_core::{log_op_end, log_op_error, log_op_start};
use kinship_store::{Result, SqliteRepo};
use rusqlite::Connection;

use super::new_id;

/// Register a user that can own trees and receive match notices
///
/// ## Errors
///
/// - `InvalidInput`: e-mail is blank or lacks an `@`
/// - `ConstraintViolation`: e-mail already registered
pub fn user_create(name: Option<String>, email: String, conn: &Connection) -> Result<User> {
    log_op_start!("user_create");
    let start = std::time::Instant::now();

    let result = user_create_impl(name, email, conn).map_err(|e| {
        log_op_error!(
            "user_create",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        "user_create",
        duration_ms = start.elapsed().as_millis() as u64,
        user_id = %result.id
    );

    Ok(result)
}

fn user_create_impl(name: Option<String>, email: String, conn: &Connection) -> Result<User> {
    let email = email.trim().to_string();
    if email.is_empty() || !email.contains('@') {
        return Err(ExError::new(ExErrorKind::InvalidInput)
            .with_op("user_create")
            .with_message("a valid e-mail address is required"));
    }

    let name = name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());

    let user = User::new(new_id(), name, email);
    SqliteRepo::insert_user(conn, &user)?;
    Ok(user)
}
