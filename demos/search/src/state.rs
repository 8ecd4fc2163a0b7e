//! Application state

use std::sync::Arc;

use chrono::{DateTime, Utc};

/// State owned by the search component.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    pub query: String,
    pub results: Vec<String>,
    /// A lookup for the current query is in flight
    pub searching: bool,
    /// Lookups that completed and matched the query at the time
    pub completed: u32,
}

/// Root state. The search state is its own `Arc` so an unchanged search
/// component keeps its identity inside a new root value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub search: Arc<SearchState>,
    pub started_at: Option<DateTime<Utc>>,
}

impl AppState {
    /// Copy of this state with `search` replaced.
    pub fn with_search(&self, search: Arc<SearchState>) -> Self {
        Self {
            search,
            ..self.clone()
        }
    }
}
