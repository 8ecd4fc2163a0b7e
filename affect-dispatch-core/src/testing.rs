//! Test utilities for affect-dispatch applications
//!
//! - [`ActionLog`]: a watcher that records every observation in order
//! - [`WatchedDispatcher`]: a dispatcher bundled with its own [`ActionLog`]
//! - Assertion macros for verifying observed actions
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use affect_dispatch_core::prelude::*;
//! use affect_dispatch_core::assert_observed;
//!
//! #[derive(Clone, Debug, PartialEq)]
//! enum Msg {
//!     Fetch,
//!     DidFetch,
//! }
//!
//! impl Action for Msg {
//!     fn name(&self) -> &'static str {
//!         match self {
//!             Msg::Fetch => "FETCH",
//!             Msg::DidFetch => "DID_FETCH",
//!         }
//!     }
//! }
//!
//! fn update(action: Msg, state: &Arc<()>) -> Operation<(), Msg> {
//!     match action {
//!         Msg::Fetch => Operation::unchanged(state).with(Command::resolve(Msg::DidFetch)),
//!         Msg::DidFetch => Operation::unchanged(state),
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let watched = Dispatcher::builder(SharedState::new(()), update).build_watched();
//! watched.send(Msg::Fetch).await.unwrap();
//!
//! assert_eq!(watched.action_types(), vec!["FETCH", "DID_FETCH"]);
//! assert_observed!(watched.actions(), Msg::DidFetch);
//! # }
//! ```

use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use parking_lot::Mutex;

use crate::action::Action;
use crate::dispatcher::{Dispatch, Dispatcher, DispatcherBuilder};
use crate::error::DispatchError;
use crate::host::StateReader;
use crate::watch::{ComposedWatcher, Watcher};

/// Insertion-ordered record of every observation a dispatcher made.
///
/// Clones share the same record. `None` entries are sentinel observations.
pub struct ActionLog<A> {
    entries: Arc<Mutex<Vec<Option<A>>>>,
}

impl<A> Clone for ActionLog<A> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<A> Default for ActionLog<A> {
    fn default() -> Self {
        Self {
            entries: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<A: fmt::Debug> fmt::Debug for ActionLog<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries.lock().iter()).finish()
    }
}

impl<A: Action> ActionLog<A> {
    /// An empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every observation so far, sentinels included.
    pub fn actions(&self) -> Vec<Option<A>> {
        self.entries.lock().clone()
    }

    /// Names of the present actions, in observation order.
    pub fn action_types(&self) -> Vec<&'static str> {
        self.entries
            .lock()
            .iter()
            .flatten()
            .map(Action::name)
            .collect()
    }

    /// Number of observations, sentinels included.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether nothing was observed yet.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Forget every observation.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl<S, A: Action> Watcher<S, A> for ActionLog<A> {
    fn watch(&self, action: Option<&A>, _state: &StateReader<S>) {
        self.entries.lock().push(action.cloned());
    }
}

/// A [`Dispatcher`] that also keeps an [`ActionLog`] of what it observed.
///
/// The log records each observation before any user watcher runs.
pub struct WatchedDispatcher<S, A> {
    dispatcher: Dispatcher<S, A>,
    log: ActionLog<A>,
}

impl<S, A> WatchedDispatcher<S, A>
where
    S: Send + Sync + 'static,
    A: Action,
{
    /// Build the dispatcher, putting a fresh log in front of its watcher.
    pub fn new(mut builder: DispatcherBuilder<S, A>) -> Self {
        let log = ActionLog::new();
        let user = builder.take_watcher();
        let watcher = ComposedWatcher::new().with(log.clone()).with(user);

        Self {
            dispatcher: builder.watcher(watcher).build(),
            log,
        }
    }

    /// Every observation so far, sentinels included.
    pub fn actions(&self) -> Vec<Option<A>> {
        self.log.actions()
    }

    /// Names of the present actions observed so far.
    pub fn action_types(&self) -> Vec<&'static str> {
        self.log.action_types()
    }

    /// The log recording every observation.
    pub fn log(&self) -> &ActionLog<A> {
        &self.log
    }

    /// The wrapped dispatcher.
    pub fn dispatcher(&self) -> &Dispatcher<S, A> {
        &self.dispatcher
    }

    /// The host's current state.
    pub fn state(&self) -> Arc<S> {
        self.dispatcher.state()
    }
}

impl<S, A> Clone for WatchedDispatcher<S, A> {
    fn clone(&self) -> Self {
        Self {
            dispatcher: self.dispatcher.clone(),
            log: self.log.clone(),
        }
    }
}

impl<S, A: fmt::Debug> fmt::Debug for WatchedDispatcher<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchedDispatcher")
            .field("dispatcher", &self.dispatcher)
            .field("log", &self.log)
            .finish()
    }
}

impl<S, A> Dispatch<A> for WatchedDispatcher<S, A>
where
    S: Send + Sync + 'static,
    A: Action,
{
    fn dispatch(&self, action: Option<A>) -> BoxFuture<'static, Result<(), DispatchError>> {
        self.dispatcher.dispatch(action)
    }
}

impl<S, A> DispatcherBuilder<S, A>
where
    S: Send + Sync + 'static,
    A: Action,
{
    /// Finish building, recording every observation in an [`ActionLog`].
    pub fn build_watched(self) -> WatchedDispatcher<S, A> {
        WatchedDispatcher::new(self)
    }
}

/// Assert that an action matching a pattern was observed.
///
/// Takes the output of [`ActionLog::actions`]; sentinel entries never match.
///
/// # Example
///
/// ```ignore
/// use affect_dispatch::assert_observed;
///
/// assert_observed!(watched.actions(), Msg::DidFetch(_));
/// ```
#[macro_export]
macro_rules! assert_observed {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {{
        let actions = &$actions;
        assert!(
            actions.iter().flatten().any(|a| matches!(a, $pattern $(if $guard)?)),
            "Expected action matching `{}` to be observed, but got: {:?}",
            stringify!($pattern),
            actions
        );
    }};
}

/// Assert that no action matching a pattern was observed.
#[macro_export]
macro_rules! assert_not_observed {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {{
        let actions = &$actions;
        assert!(
            !actions.iter().flatten().any(|a| matches!(a, $pattern $(if $guard)?)),
            "Expected action matching `{}` NOT to be observed, but it was: {:?}",
            stringify!($pattern),
            actions
        );
    }};
}

/// Find the first observed action matching a pattern.
///
/// # Example
///
/// ```ignore
/// let actions = watched.actions();
/// if let Some(Msg::Loaded(v)) = find_observed!(actions, Msg::Loaded(_)) {
///     assert_eq!(*v, 42);
/// }
/// ```
#[macro_export]
macro_rules! find_observed {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        $actions.iter().flatten().find(|a| matches!(a, $pattern $(if $guard)?))
    };
}

/// Count how many observed actions match a pattern.
#[macro_export]
macro_rules! count_observed {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        $actions
            .iter()
            .flatten()
            .filter(|a| matches!(a, $pattern $(if $guard)?))
            .count()
    };
}
