//! The curated-insight enrichment pipeline.
//!
//! Selects the first `limit` documents, fans their model-service calls out
//! concurrently (bounded), and reassembles results by index so output order
//! always matches input order regardless of completion order. Every service
//! failure is absorbed into the fallback path — `enrich` never fails.

use std::sync::atomic::{AtomicUsize, Ordering};

use futures::stream::{self, StreamExt};
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

use sermondeck_model::ModelService;
use sermondeck_shared::{
    ContentItem, EnrichedItem, InsightConfig, InsightOrigin, Result, SermonDeckError,
};

use crate::fallback::fallback_insight;

// ---------------------------------------------------------------------------
// Progress trait
// ---------------------------------------------------------------------------

/// Progress callback for enrichment runs.
pub trait InsightProgress: Send + Sync {
    /// Called once per document as its enrichment completes.
    /// `current` counts completions, not input positions.
    fn item_done(&self, current: usize, total: usize, title: &str);
}

/// No-op progress for headless/test usage.
pub struct SilentProgress;

impl InsightProgress for SilentProgress {
    fn item_done(&self, _current: usize, _total: usize, _title: &str) {}
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Enrich up to `limit` documents with a model-generated insight and category.
///
/// Selection is a stable truncation: the first `limit` items, in caller
/// order. Documents beyond the limit are never dispatched. An empty input or
/// a zero limit yields an empty result — "generate nothing" is valid, not an
/// error. `output[i].source` always corresponds to the i-th selected item.
#[instrument(skip_all, fields(items = items.len(), limit))]
pub async fn enrich<S: ModelService>(
    service: &S,
    config: &InsightConfig,
    items: &[ContentItem],
    limit: usize,
    progress: &dyn InsightProgress,
) -> Vec<EnrichedItem> {
    let selected = &items[..items.len().min(limit)];
    if selected.is_empty() {
        debug!("nothing to enrich");
        return Vec::new();
    }

    let total = selected.len();
    let completed = AtomicUsize::new(0);
    let completed = &completed;

    let finished: Vec<(usize, EnrichedItem)> = stream::iter(selected.iter().cloned().enumerate())
        .map(|(index, item)| async move {
            let enriched = enrich_one(service, config, item).await;
            let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
            progress.item_done(done, total, &enriched.source.title);
            (index, enriched)
        })
        .buffer_unordered(config.concurrency.max(1))
        .collect()
        .await;

    // Reassemble by input index; completion order is arbitrary.
    let mut generated = 0usize;
    let mut fallbacks = 0usize;
    let mut slots: Vec<Option<EnrichedItem>> = Vec::with_capacity(total);
    slots.resize_with(total, || None);
    for (index, item) in finished {
        match item.origin {
            InsightOrigin::Model => generated += 1,
            InsightOrigin::Fallback => fallbacks += 1,
        }
        slots[index] = Some(item);
    }

    info!(total, generated, fallbacks, "enrichment complete");

    slots.into_iter().flatten().collect()
}

/// Enrich a single document, falling back on any service failure.
async fn enrich_one<S: ModelService>(
    service: &S,
    config: &InsightConfig,
    item: ContentItem,
) -> EnrichedItem {
    match generate_pair(service, config, &item).await {
        Ok((insight, category)) => EnrichedItem::from_model(item, insight, category),
        Err(e) => {
            warn!(title = %item.title, error = %e, "model service failed, using fallback");
            let line = fallback_insight(&item.title);
            EnrichedItem::from_fallback(item, line.to_string())
        }
    }
}

/// Issue the insight/category pair for one document.
///
/// The pair is atomic: if either call fails or times out, the whole item
/// takes the fallback path. No partial application of one result.
async fn generate_pair<S: ModelService>(
    service: &S,
    config: &InsightConfig,
    item: &ContentItem,
) -> Result<(String, String)> {
    let body = item.body.as_deref();
    let insight = timeout(
        config.request_timeout,
        service.generate_insight(&item.title, body),
    );
    let category = timeout(config.request_timeout, service.categorize(&item.title, body));
    let (insight, category) = tokio::join!(insight, category);

    let insight =
        insight.map_err(|_| SermonDeckError::service("insight generation timed out"))??;
    let category =
        category.map_err(|_| SermonDeckError::service("categorization timed out"))??;

    Ok((insight, category))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use sermondeck_shared::FALLBACK_CATEGORY;

    /// Scriptable model service: per-title failures, delays, and hangs,
    /// recording every title it is asked about.
    #[derive(Default)]
    struct StubService {
        fail_all: bool,
        fail_titles: HashSet<String>,
        fail_category_titles: HashSet<String>,
        delays_ms: HashMap<String, u64>,
        hang_titles: HashSet<String>,
        contacted: Mutex<Vec<String>>,
    }

    impl StubService {
        fn ok() -> Self {
            Self::default()
        }

        fn failing() -> Self {
            Self {
                fail_all: true,
                ..Self::default()
            }
        }

        fn with_failure(mut self, title: &str) -> Self {
            self.fail_titles.insert(title.into());
            self
        }

        fn with_category_failure(mut self, title: &str) -> Self {
            self.fail_category_titles.insert(title.into());
            self
        }

        fn with_delay(mut self, title: &str, ms: u64) -> Self {
            self.delays_ms.insert(title.into(), ms);
            self
        }

        fn with_hang(mut self, title: &str) -> Self {
            self.hang_titles.insert(title.into());
            self
        }

        fn contacted(&self) -> Vec<String> {
            self.contacted.lock().unwrap().clone()
        }

        async fn simulate(&self, title: &str) -> Result<()> {
            self.contacted.lock().unwrap().push(title.to_string());
            if let Some(ms) = self.delays_ms.get(title) {
                tokio::time::sleep(Duration::from_millis(*ms)).await;
            }
            if self.hang_titles.contains(title) {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            if self.fail_all || self.fail_titles.contains(title) {
                return Err(SermonDeckError::service("stubbed failure"));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl ModelService for StubService {
        async fn generate_insight(&self, title: &str, _body: Option<&str>) -> Result<String> {
            self.simulate(title).await?;
            Ok(format!("Insight for {title}"))
        }

        async fn categorize(&self, title: &str, _body: Option<&str>) -> Result<String> {
            self.simulate(title).await?;
            if self.fail_category_titles.contains(title) {
                return Err(SermonDeckError::service("stubbed category failure"));
            }
            Ok("Teaching".to_string())
        }
    }

    fn docs(titles: &[&str]) -> Vec<ContentItem> {
        titles.iter().map(|t| ContentItem::new(*t, None)).collect()
    }

    fn config() -> InsightConfig {
        InsightConfig::default()
    }

    #[tokio::test]
    async fn empty_items_yield_empty_result() {
        let service = StubService::ok();
        let out = enrich(&service, &config(), &[], 5, &SilentProgress).await;
        assert!(out.is_empty());
        assert!(service.contacted().is_empty());
    }

    #[tokio::test]
    async fn zero_limit_yields_empty_result() {
        let service = StubService::ok();
        let items = docs(&["Grace", "Hope"]);
        let out = enrich(&service, &config(), &items, 0, &SilentProgress).await;
        assert!(out.is_empty());
        assert!(service.contacted().is_empty());
    }

    #[tokio::test]
    async fn result_length_is_min_of_items_and_limit() {
        let service = StubService::ok();
        let items = docs(&["A", "B", "C", "D"]);

        let out = enrich(&service, &config(), &items, 2, &SilentProgress).await;
        assert_eq!(out.len(), 2);

        let out = enrich(&service, &config(), &items, 10, &SilentProgress).await;
        assert_eq!(out.len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn output_order_matches_input_under_inverted_latency() {
        // Slowest first: completion order is the reverse of input order.
        let service = StubService::ok()
            .with_delay("First", 300)
            .with_delay("Second", 150);
        let items = docs(&["First", "Second", "Third"]);

        let out = enrich(&service, &config(), &items, 3, &SilentProgress).await;

        let titles: Vec<&str> = out.iter().map(|e| e.source.title.as_str()).collect();
        assert_eq!(titles, ["First", "Second", "Third"]);
        for (enriched, item) in out.iter().zip(&items) {
            assert_eq!(enriched.source.id, item.id);
        }
    }

    #[tokio::test]
    async fn one_failure_never_truncates_the_rest() {
        let service = StubService::ok().with_failure("Second");
        let items = docs(&["First", "Second", "Third"]);

        let out = enrich(&service, &config(), &items, 3, &SilentProgress).await;

        assert_eq!(out.len(), 3);
        assert_eq!(out[0].origin, InsightOrigin::Model);
        assert_eq!(out[0].insight, "Insight for First");
        assert_eq!(out[1].origin, InsightOrigin::Fallback);
        assert_eq!(out[1].category, FALLBACK_CATEGORY);
        assert_eq!(out[1].insight, fallback_insight("Second"));
        assert_eq!(out[2].origin, InsightOrigin::Model);
    }

    #[tokio::test]
    async fn fallback_content_is_deterministic_across_runs() {
        let service = StubService::failing();
        let items = docs(&["Grace"]);

        let first = enrich(&service, &config(), &items, 1, &SilentProgress).await;
        let second = enrich(&service, &config(), &items, 1, &SilentProgress).await;

        assert_eq!(first[0].insight, second[0].insight);
        assert_eq!(first[0].category, FALLBACK_CATEGORY);
        assert_eq!(second[0].category, FALLBACK_CATEGORY);
    }

    #[tokio::test]
    async fn pair_failure_is_atomic() {
        // Insight succeeds, categorization fails: the item must not mix a
        // model insight with a fallback category.
        let service = StubService::ok().with_category_failure("Hope");
        let items = docs(&["Hope"]);

        let out = enrich(&service, &config(), &items, 1, &SilentProgress).await;

        assert_eq!(out[0].origin, InsightOrigin::Fallback);
        assert_eq!(out[0].insight, fallback_insight("Hope"));
        assert_eq!(out[0].category, FALLBACK_CATEGORY);
    }

    #[tokio::test(start_paused = true)]
    async fn hung_service_call_falls_back() {
        let service = StubService::ok().with_hang("Stuck");
        let items = docs(&["Stuck", "Fine"]);
        let config = InsightConfig {
            concurrency: 4,
            request_timeout: Duration::from_millis(50),
        };

        let out = enrich(&service, &config, &items, 2, &SilentProgress).await;

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].origin, InsightOrigin::Fallback);
        assert_eq!(out[1].origin, InsightOrigin::Model);
    }

    #[tokio::test]
    async fn truncated_items_are_never_dispatched() {
        let service = StubService::failing();
        let items = docs(&["Grace", "Hope", "Faith"]);

        let out = enrich(&service, &config(), &items, 2, &SilentProgress).await;

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].insight, fallback_insight("Grace"));
        assert_eq!(out[1].insight, fallback_insight("Hope"));
        assert!(out.iter().all(|e| e.category == FALLBACK_CATEGORY));
        assert!(!service.contacted().contains(&"Faith".to_string()));
    }

    #[tokio::test]
    async fn progress_reports_every_item() {
        struct CountingProgress(AtomicUsize);
        impl InsightProgress for CountingProgress {
            fn item_done(&self, _current: usize, total: usize, _title: &str) {
                assert_eq!(total, 3);
                self.0.fetch_add(1, Ordering::Relaxed);
            }
        }

        let service = StubService::ok().with_failure("B");
        let items = docs(&["A", "B", "C"]);
        let progress = CountingProgress(AtomicUsize::new(0));

        enrich(&service, &config(), &items, 3, &progress).await;

        assert_eq!(progress.0.load(Ordering::Relaxed), 3);
    }
}
