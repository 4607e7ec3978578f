//! Migration checksums
//!
//! SHA-256 over the migration text with line endings normalized, so a
//! checkout that rewrites LF to CRLF still verifies against a database
//! migrated from an LF copy.

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of `sql` with CRLF folded to LF
pub fn compute_checksum(sql: &str) -> String {
    let mut hasher = Sha256::new();
    for line in sql.split_inclusive('\n') {
        match line.strip_suffix("\r\n") {
            Some(body) => {
                hasher.update(body.as_bytes());
                hasher.update(b"\n");
            }
            None => hasher.update(line.as_bytes()),
        }
    }
    hex::encode(hasher.finalize())
}
