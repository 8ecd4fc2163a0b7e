//! Actions for the search component and the application around it
//!
//! - Intent actions describe what the user did (`QueryChange`, `Submit`)
//! - `Did*` actions carry the outcome of a command back

use affect_dispatch::Action;
use chrono::{DateTime, Utc};

/// Actions understood by the search component.
#[derive(Action, Clone, Debug, PartialEq)]
#[action(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SearchAction {
    /// The query text changed (one per keystroke)
    QueryChange(String),

    /// The query settled; look it up
    Submit(String),

    /// Result: lookup for `query` finished
    DidSearch { query: String, results: Vec<String> },

    /// Drop the query and any results
    Clear,
}

/// Application-level actions.
#[derive(Action, Clone, Debug, PartialEq)]
#[action(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppAction {
    /// Record the session start time
    Start,

    /// Result: start time read from the clock
    DidStart(DateTime<Utc>),

    /// Wrapped search component action
    #[action(rename = "SEARCH")]
    Search(SearchAction),
}
