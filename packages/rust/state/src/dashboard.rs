//! Dashboard state and reducer.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use sermondeck_shared::{DocumentId, EnrichedItem};

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Which documents the list shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFilter {
    #[default]
    All,
    Pinned,
    Drafts,
}

/// How the document list is ordered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    RecentlyEdited,
    Title,
    DateCreated,
}

/// Everything the dashboard renders from.
///
/// Insight results carry a run sequence number: each new request bumps
/// `insight_run`, and only results tagged with the current run are applied.
/// A stale run's results can never overwrite a newer run's.
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    /// Active document filter.
    pub filter: DocumentFilter,
    /// Active sort order.
    pub sort: SortOrder,
    /// Tags currently selected in the tag menu.
    pub active_tags: BTreeSet<String>,
    /// Pinned documents, in pin order.
    pub pinned: Vec<DocumentId>,
    /// Current curated-insight result set. Replaced wholesale per run.
    pub insights: Vec<EnrichedItem>,
    /// Whether an insight run is in flight.
    pub insights_loading: bool,
    /// Sequence number of the latest requested insight run.
    pub insight_run: u64,
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// The closed set of dashboard transitions.
#[derive(Debug, Clone)]
pub enum DashboardAction {
    SetFilter(DocumentFilter),
    SetSort(SortOrder),
    /// Flip a tag's membership in the active set.
    ToggleTag(String),
    Pin(DocumentId),
    Unpin(DocumentId),
    /// A new insight run was started. Bumps the run sequence; the caller
    /// reads `insight_run` after dispatch to tag the eventual results.
    InsightsRequested,
    /// Results arrived for the run with the given sequence number.
    /// Ignored unless `run` matches the current `insight_run`.
    InsightsLoaded {
        run: u64,
        items: Vec<EnrichedItem>,
    },
    /// The insight panel was dismissed; drop results and loading state.
    InsightsDismissed,
}

// ---------------------------------------------------------------------------
// Reducer
// ---------------------------------------------------------------------------

/// Apply one action to the state.
pub fn reduce(state: &mut DashboardState, action: DashboardAction) {
    match action {
        DashboardAction::SetFilter(filter) => state.filter = filter,
        DashboardAction::SetSort(sort) => state.sort = sort,
        DashboardAction::ToggleTag(tag) => {
            if !state.active_tags.remove(&tag) {
                state.active_tags.insert(tag);
            }
        }
        DashboardAction::Pin(id) => {
            if !state.pinned.contains(&id) {
                state.pinned.push(id);
            }
        }
        DashboardAction::Unpin(id) => {
            state.pinned.retain(|pinned| *pinned != id);
        }
        DashboardAction::InsightsRequested => {
            state.insight_run += 1;
            state.insights_loading = true;
        }
        DashboardAction::InsightsLoaded { run, items } => {
            if run != state.insight_run {
                debug!(run, current = state.insight_run, "discarding stale insight run");
                return;
            }
            state.insights = items;
            state.insights_loading = false;
        }
        DashboardAction::InsightsDismissed => {
            state.insights.clear();
            state.insights_loading = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sermondeck_shared::ContentItem;

    fn insight(title: &str) -> EnrichedItem {
        EnrichedItem::from_fallback(ContentItem::new(title, None), "canned line".into())
    }

    #[test]
    fn toggle_tag_flips_membership() {
        let mut state = DashboardState::default();

        reduce(&mut state, DashboardAction::ToggleTag("advent".into()));
        assert!(state.active_tags.contains("advent"));

        reduce(&mut state, DashboardAction::ToggleTag("advent".into()));
        assert!(!state.active_tags.contains("advent"));
    }

    #[test]
    fn pin_is_idempotent() {
        let mut state = DashboardState::default();
        let id = DocumentId::new();

        reduce(&mut state, DashboardAction::Pin(id));
        reduce(&mut state, DashboardAction::Pin(id));
        assert_eq!(state.pinned.len(), 1);

        reduce(&mut state, DashboardAction::Unpin(id));
        assert!(state.pinned.is_empty());
    }

    #[test]
    fn requested_bumps_run_and_sets_loading() {
        let mut state = DashboardState::default();

        reduce(&mut state, DashboardAction::InsightsRequested);
        assert_eq!(state.insight_run, 1);
        assert!(state.insights_loading);
    }

    #[test]
    fn current_run_results_apply() {
        let mut state = DashboardState::default();

        reduce(&mut state, DashboardAction::InsightsRequested);
        let run = state.insight_run;
        reduce(
            &mut state,
            DashboardAction::InsightsLoaded {
                run,
                items: vec![insight("Grace")],
            },
        );

        assert_eq!(state.insights.len(), 1);
        assert!(!state.insights_loading);
    }

    #[test]
    fn stale_run_results_are_discarded() {
        let mut state = DashboardState::default();

        // First run starts, then a second run supersedes it.
        reduce(&mut state, DashboardAction::InsightsRequested);
        let stale_run = state.insight_run;
        reduce(&mut state, DashboardAction::InsightsRequested);
        let current_run = state.insight_run;

        // The newer run's results land first.
        reduce(
            &mut state,
            DashboardAction::InsightsLoaded {
                run: current_run,
                items: vec![insight("Hope"), insight("Faith")],
            },
        );

        // The stale run completes late; it must not overwrite anything.
        reduce(
            &mut state,
            DashboardAction::InsightsLoaded {
                run: stale_run,
                items: vec![insight("Grace")],
            },
        );

        assert_eq!(state.insights.len(), 2);
        assert_eq!(state.insights[0].source.title, "Hope");
        assert!(!state.insights_loading);
    }

    #[test]
    fn new_run_replaces_previous_results_wholesale() {
        let mut state = DashboardState::default();

        reduce(&mut state, DashboardAction::InsightsRequested);
        let run = state.insight_run;
        reduce(
            &mut state,
            DashboardAction::InsightsLoaded {
                run,
                items: vec![insight("Grace"), insight("Hope")],
            },
        );

        reduce(&mut state, DashboardAction::InsightsRequested);
        let run = state.insight_run;
        reduce(
            &mut state,
            DashboardAction::InsightsLoaded {
                run,
                items: vec![insight("Faith")],
            },
        );

        assert_eq!(state.insights.len(), 1);
        assert_eq!(state.insights[0].source.title, "Faith");
    }

    #[test]
    fn dismissed_clears_results_and_loading() {
        let mut state = DashboardState::default();

        reduce(&mut state, DashboardAction::InsightsRequested);
        let run = state.insight_run;
        reduce(
            &mut state,
            DashboardAction::InsightsLoaded {
                run,
                items: vec![insight("Grace")],
            },
        );
        reduce(&mut state, DashboardAction::InsightsDismissed);

        assert!(state.insights.is_empty());
        assert!(!state.insights_loading);
    }
}
