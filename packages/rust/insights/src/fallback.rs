//! Deterministic fallback insights.
//!
//! When the model service fails for a document, the dashboard still shows a
//! useful line: one of a fixed table of canned insights, picked by hashing
//! the document title. Same title, same line, for the life of the binary.

use sha2::{Digest, Sha256};

/// Canned insight lines shown when the model service is unavailable.
pub const FALLBACK_TABLE: [&str; 8] = [
    "This message touches a theme your congregation has responded to before.",
    "A strong candidate to preach again — its core idea still lands today.",
    "Consider pairing this message with a follow-up series on the same passage.",
    "The central illustration here is memorable enough to carry a new message.",
    "This sermon's big idea could anchor a small-group discussion guide.",
    "Revisiting this message in the same season it was first preached could resonate.",
    "The passage behind this message rewards a second look from a fresh angle.",
    "A similar closing invitation could serve a future message well.",
];

/// Pick the fallback line for a title.
///
/// Pure function of the title: sha-256 digest, first 8 bytes as a big-endian
/// integer, mod table size.
pub fn fallback_insight(title: &str) -> &'static str {
    FALLBACK_TABLE[fallback_index(title)]
}

fn fallback_index(title: &str) -> usize {
    let digest = Sha256::digest(title.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    (u64::from_be_bytes(bytes) % FALLBACK_TABLE.len() as u64) as usize
}
