//! Search demo - affect-dispatch example
//!
//! A search box with debounced queries, embedded in a parent application:
//! 1. Keystrokes are dispatched as `SearchAction::QueryChange` through a
//!    child dispatcher mapped onto the application's dispatcher
//! 2. The search update commits the query and debounces a `Submit`
//! 3. `Submit` runs the (simulated) catalog lookup as a command
//! 4. `DidSearch` lands back in the search state, dropped if stale
//!
//! The search component never sees `AppAction`: the parent lifts its
//! operations with `lift_operation` and the binary talks to it through
//! `map_dispatcher`.

pub mod action;
pub mod catalog;
pub mod state;
pub mod update;

pub use action::{AppAction, SearchAction};
pub use catalog::Catalog;
pub use state::{AppState, SearchState};
pub use update::{AppUpdate, SearchUpdate};
