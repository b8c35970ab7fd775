//! Content-addressed article identifiers.

use sha2::{Digest, Sha256};

/// Derive an article id from its canonical source URL.
///
/// The id is the lowercase hex SHA-256 of the URL bytes, so the same URL
/// always maps to the same id across runs and processes.
pub fn article_id(source_url: &str) -> String {
    let digest = Sha256::digest(source_url.as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}
