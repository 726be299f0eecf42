//! Dashboard state container for SermonDeck.
//!
//! An explicit state struct plus a closed set of actions consumed by a
//! reducer. The rendering layer dispatches actions and re-renders from the
//! resulting state; transitions are testable in isolation, with no ambient
//! mutable fields.

pub mod dashboard;

pub use dashboard::{DashboardAction, DashboardState, DocumentFilter, SortOrder, reduce};
