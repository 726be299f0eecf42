//! Model service boundary for SermonDeck.
//!
//! Defines the [`ModelService`] trait consumed by the insight pipeline and
//! provides [`OpenRouterClient`], the production implementation backed by the
//! OpenRouter chat-completions API. The pipeline treats every failure from
//! this boundary uniformly — timeout, HTTP error, and malformed response all
//! surface as [`SermonDeckError::Service`].
//!
//! [`SermonDeckError::Service`]: sermondeck_shared::SermonDeckError::Service

mod client;

use async_trait::async_trait;
use sermondeck_shared::Result;

pub use client::OpenRouterClient;

/// External AI service consumed by the insight pipeline.
///
/// Both operations take the document title plus optional body text for
/// context. Implementations make a single attempt per call — retry policy
/// belongs to the service layer, not its callers.
#[async_trait]
pub trait ModelService: Send + Sync {
    /// Generate a one-line insight for a document.
    async fn generate_insight(&self, title: &str, body: Option<&str>) -> Result<String>;

    /// Generate a category label for a document.
    async fn categorize(&self, title: &str, body: Option<&str>) -> Result<String>;
}
