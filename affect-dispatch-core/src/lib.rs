//! Core traits and types for affect-dispatch
//!
//! This crate provides an Elm/Redux-style dispatcher: a pure update function
//! maps an action and the current state to an [`Operation`] (the next state
//! plus asynchronous [`Command`]s), and a [`Dispatcher`] turns that into state
//! commits and command runs, feeding whatever the commands produce back in.
//!
//! # Core Concepts
//!
//! - **Action**: A value describing something that happened
//! - **Operation**: Next state plus follow-up commands, returned by the update function
//! - **Command**: Lazily-started async work settling with an action, or nothing
//! - **StateHost**: Owner of the state; the dispatcher only reads and requests commits
//! - **Watcher**: Observer called once per dispatched action, before the update runs
//! - **Mappers**: Adapters letting a sub-component speak its own action type
//!
//! # Basic Example
//!
//! ```
//! use std::sync::Arc;
//! use affect_dispatch_core::prelude::*;
//!
//! #[derive(Clone, Debug)]
//! enum Msg {
//!     Increment { value: i32 },
//! }
//!
//! impl Action for Msg {
//!     fn name(&self) -> &'static str {
//!         "INCREMENT"
//!     }
//! }
//!
//! fn update(action: Msg, state: &Arc<i32>) -> Operation<i32, Msg> {
//!     match action {
//!         Msg::Increment { value } => Operation::new(**state + value),
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let host = SharedState::new(1);
//! let dispatcher = Dispatcher::new(host.clone(), update);
//!
//! dispatcher.send(Msg::Increment { value: 2 }).await.unwrap();
//! assert_eq!(*host.get(), 3);
//! # }
//! ```
//!
//! # Async Work
//!
//! Follow-up work is returned, never performed, by the update function. The
//! `Did*` naming convention identifies result actions:
//!
//! ```ignore
//! fn update(action: Action, state: &Arc<State>) -> Operation<State, Action> {
//!     match action {
//!         Action::Fetch { id } => Operation::new(State { loading: true, ..(**state).clone() })
//!             .with(Command::new(move || async move {
//!                 let payload = fetch_from_api(&id).await?;
//!                 Ok(Some(Action::DidFetch { payload }))
//!             })),
//!         Action::DidFetch { payload } => Operation::new(State { loading: false, payload }),
//!     }
//! }
//! ```
//!
//! The dispatcher commits `loading: true`, waits for the host to acknowledge
//! it, runs the command, and dispatches `DidFetch` when it settles. The
//! future returned by `dispatch` resolves only once that whole chain is done.

pub mod action;
pub mod command;
pub mod commands;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod host;
pub mod mapper;
pub mod operation;
pub mod testing;
pub mod watch;

// Core exports
pub use action::Action;
pub use command::{Command, CommandResult};
pub use error::{BoxError, DispatchError};
pub use operation::{Branch, Operation, Update};

// Dispatcher exports
pub use config::DispatchConfig;
pub use dispatcher::{Dispatch, Dispatcher, DispatcherBuilder};
pub use host::{
    CommitQueue, CommitSignal, FnHost, PendingCommit, QueuedHost, SharedState, StateHost,
    StateReader,
};
pub use mapper::{lift_operation, map_commands, map_dispatcher, DispatchExt, MappedDispatcher};

// Watcher exports
pub use watch::{
    glob_match, ComposedWatcher, FnWatcher, NoopWatcher, TracingWatcher, WatchFilter, Watcher,
};

// Command library exports
pub use commands::{delay, now, DebounceKey, Debouncer};
#[cfg(feature = "http")]
pub use commands::{fetch_json, fetch_text, FetchError};

// Testing exports
pub use testing::{ActionLog, WatchedDispatcher};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::action::Action;
    pub use crate::command::Command;
    pub use crate::commands::{delay, now, DebounceKey, Debouncer};
    pub use crate::config::DispatchConfig;
    pub use crate::dispatcher::{Dispatch, Dispatcher};
    pub use crate::error::DispatchError;
    pub use crate::host::{SharedState, StateHost, StateReader};
    pub use crate::mapper::{lift_operation, map_commands, map_dispatcher, DispatchExt};
    pub use crate::operation::{Branch, Operation, Update};
    pub use crate::testing::{ActionLog, WatchedDispatcher};
    pub use crate::watch::{TracingWatcher, WatchFilter, Watcher};
}
