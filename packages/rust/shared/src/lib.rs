//! Shared types, error model, and configuration for SermonDeck.
//!
//! This crate is the foundation depended on by all other SermonDeck crates.
//! It provides:
//! - [`SermonDeckError`] — the unified error type
//! - Domain types ([`ContentItem`], [`EnrichedItem`], [`DocumentId`], [`InsightId`])
//! - Configuration ([`AppConfig`], [`InsightConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, InsightConfig, OpenRouterConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from, validate_api_key,
};
pub use error::{Result, SermonDeckError};
pub use types::{
    ContentItem, DocumentId, EnrichedItem, FALLBACK_CATEGORY, InsightId, InsightOrigin,
};
