//! Curated-insight generation for the SermonDeck dashboard.
//!
//! Takes a bounded, ordered selection of documents, requests an AI-generated
//! insight and category for each from the model service, and substitutes a
//! deterministic local fallback for any document whose service calls fail.
//! The caller receives a stable, input-ordered result set and never an error.

pub mod fallback;
pub mod pipeline;

pub use fallback::{FALLBACK_TABLE, fallback_insight};
pub use pipeline::{InsightProgress, SilentProgress, enrich};
