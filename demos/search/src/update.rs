//! Update functions - pure: (action, state) -> Operation
//!
//! - `SearchUpdate` only knows `SearchState` and `SearchAction`
//! - `AppUpdate` embeds it with `lift_operation`
//! - All async work is returned as commands, never started here

use std::sync::Arc;
use std::time::Duration;

use affect_dispatch::prelude::*;

use crate::action::{AppAction, SearchAction};
use crate::catalog::Catalog;
use crate::state::{AppState, SearchState};

const SEARCH_KEY: &str = "search";
const MAX_RESULTS: usize = 10;

/// Update function of the search component.
#[derive(Debug, Clone)]
pub struct SearchUpdate {
    catalog: Catalog,
    debouncer: Debouncer,
    quiet: Duration,
    latency: Duration,
}

impl SearchUpdate {
    /// `quiet` is the debounce period, `latency` the simulated lookup time.
    pub fn new(catalog: Catalog, quiet: Duration, latency: Duration) -> Self {
        Self {
            catalog,
            debouncer: Debouncer::new(),
            quiet,
            latency,
        }
    }

    fn lookup(&self, query: String) -> Command<SearchAction> {
        let catalog = self.catalog.clone();
        delay(self.latency, move || {
            let results = catalog.search(&query, MAX_RESULTS);
            SearchAction::DidSearch { query, results }
        })
    }
}

impl Update<SearchState, SearchAction> for SearchUpdate {
    fn update(
        &self,
        action: SearchAction,
        state: &Arc<SearchState>,
    ) -> Operation<SearchState, SearchAction> {
        match action {
            SearchAction::QueryChange(query) if query == state.query => Operation::unchanged(state),

            SearchAction::QueryChange(query) if query.is_empty() => {
                self.debouncer.cancel(&DebounceKey::new(SEARCH_KEY));
                Operation::new(SearchState {
                    completed: state.completed,
                    ..SearchState::default()
                })
            }

            SearchAction::QueryChange(query) => {
                let submit = query.clone();
                Operation::new(SearchState {
                    query,
                    ..(**state).clone()
                })
                .with(self.debouncer.command(SEARCH_KEY, self.quiet, move || {
                    SearchAction::Submit(submit)
                }))
            }

            // Superseded by a later keystroke
            SearchAction::Submit(query) if query != state.query => Operation::unchanged(state),

            SearchAction::Submit(query) => Operation::new(SearchState {
                searching: true,
                ..(**state).clone()
            })
            .with(self.lookup(query)),

            SearchAction::DidSearch { query, .. } if query != state.query => {
                tracing::debug!(%query, "dropping stale results");
                Operation::unchanged(state)
            }

            SearchAction::DidSearch { results, .. } => Operation::new(SearchState {
                results,
                searching: false,
                completed: state.completed + 1,
                ..(**state).clone()
            }),

            SearchAction::Clear => {
                self.debouncer.cancel(&DebounceKey::new(SEARCH_KEY));
                Operation::new(SearchState {
                    completed: state.completed,
                    ..SearchState::default()
                })
            }
        }
    }
}

/// Update function of the whole application.
#[derive(Debug, Clone)]
pub struct AppUpdate {
    search: SearchUpdate,
}

impl AppUpdate {
    pub fn new(search: SearchUpdate) -> Self {
        Self { search }
    }
}

impl Update<AppState, AppAction> for AppUpdate {
    fn update(&self, action: AppAction, state: &Arc<AppState>) -> Operation<AppState, AppAction> {
        match action {
            AppAction::Start => Operation::unchanged(state).with(now(AppAction::DidStart)),

            AppAction::DidStart(at) => Operation::new(AppState {
                started_at: Some(at),
                ..(**state).clone()
            }),

            AppAction::Search(action) => {
                let before = Arc::clone(&state.search);
                let operation = self.search.update(action, &before);
                lift_operation(
                    state,
                    &before,
                    operation,
                    |app, search| app.with_search(search),
                    AppAction::Search,
                )
            }
        }
    }
}
