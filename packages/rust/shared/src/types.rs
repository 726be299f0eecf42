//! Core domain types for the SermonDeck curated-content feature.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fixed category assigned to fallback insights.
pub const FALLBACK_CATEGORY: &str = "General";

// ---------------------------------------------------------------------------
// DocumentId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper for document identifiers (time-sortable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(pub Uuid);

impl DocumentId {
    /// Generate a new time-sortable document identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for DocumentId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

// ---------------------------------------------------------------------------
// InsightId
// ---------------------------------------------------------------------------

/// Identifier for an enriched item, minted when the pipeline builds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InsightId(pub Uuid);

impl InsightId {
    /// Generate a new insight identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for InsightId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for InsightId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// ContentItem
// ---------------------------------------------------------------------------

/// A document selected for enrichment. Immutable once selected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    /// Unique document identifier.
    pub id: DocumentId,
    /// Document title. Also the input to the fallback lookup.
    pub title: String,
    /// Optional body text forwarded to the model service for context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl ContentItem {
    /// Build an item with a freshly minted id.
    pub fn new(title: impl Into<String>, body: Option<String>) -> Self {
        Self {
            id: DocumentId::new(),
            title: title.into(),
            body,
        }
    }
}

// ---------------------------------------------------------------------------
// EnrichedItem
// ---------------------------------------------------------------------------

/// Where an enriched item's insight content came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightOrigin {
    /// Generated by the external model service.
    Model,
    /// Deterministic local fallback after a service failure.
    Fallback,
}

/// A content item paired with its generated (or fallback) insight.
///
/// Created only by the insight pipeline and never mutated afterwards.
/// A new pipeline run fully replaces the previous result set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedItem {
    /// Unique id, minted at enrichment time.
    pub id: InsightId,
    /// The document this insight was generated for.
    pub source: ContentItem,
    /// One-line insight text shown on the dashboard card.
    pub insight: String,
    /// Category label shown on the dashboard card.
    pub category: String,
    /// Provenance of the insight content.
    pub origin: InsightOrigin,
    /// When the item was enriched.
    pub generated_at: DateTime<Utc>,
}

impl EnrichedItem {
    /// Build an item carrying model-generated content.
    pub fn from_model(source: ContentItem, insight: String, category: String) -> Self {
        Self {
            id: InsightId::new(),
            source,
            insight,
            category,
            origin: InsightOrigin::Model,
            generated_at: Utc::now(),
        }
    }

    /// Build an item carrying fallback content.
    pub fn from_fallback(source: ContentItem, insight: String) -> Self {
        Self {
            id: InsightId::new(),
            source,
            insight,
            category: FALLBACK_CATEGORY.to_string(),
            origin: InsightOrigin::Fallback,
            generated_at: Utc::now(),
        }
    }
}
