//! One-way visitor fingerprints for unique/repeat visitor counting.

use sha2::{Digest, Sha256};

/// Hex characters kept from the SHA-256 digest.
pub const FINGERPRINT_LENGTH: usize = 32;

/// Derives a visitor fingerprint for a single link.
///
/// Hashes `"{anonymized_ip}.{user_agent}.{link_id}"` with SHA-256 and keeps
/// the first [`FINGERPRINT_LENGTH`] lowercase hex characters. The link ID is
/// part of the input, so the same visitor produces unrelated fingerprints on
/// different links.
pub fn visitor_fingerprint(anonymized_ip: &str, user_agent: &str, link_id: i64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{anonymized_ip}.{user_agent}.{link_id}").as_bytes());

    let mut digest = hex::encode(hasher.finalize());
    digest.truncate(FINGERPRINT_LENGTH);
    digest
}
