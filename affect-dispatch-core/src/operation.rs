//! Operations: what an update function returns
//!
//! An update function maps an action and the current state to an
//! [`Operation`]: the next state plus zero or more [`Command`]s to run.
//!
//! State change is detected by identity, not by value. The state lives behind
//! an `Arc`, and an Operation whose `state` is the same `Arc` as the input
//! (`Arc::ptr_eq`) means "unchanged", even if a fresh value would compare
//! equal.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use affect_dispatch_core::{Action, Branch, Command, Operation};
//!
//! #[derive(Clone, Debug)]
//! enum Msg {
//!     Increment,
//!     Fetch,
//!     DidFetch,
//! }
//!
//! impl Action for Msg {
//!     fn name(&self) -> &'static str {
//!         match self {
//!             Msg::Increment => "Increment",
//!             Msg::Fetch => "Fetch",
//!             Msg::DidFetch => "DidFetch",
//!         }
//!     }
//! }
//!
//! #[derive(Clone)]
//! struct Counter {
//!     value: i32,
//! }
//!
//! fn update(action: Msg, state: &Arc<Counter>) -> Operation<Counter, Msg> {
//!     match action {
//!         Msg::Increment => Operation::new(Counter { value: state.value + 1 }),
//!         Msg::Fetch => Operation::unchanged(state).with(Command::resolve(Msg::DidFetch)),
//!         Msg::DidFetch => Operation::unchanged(state),
//!     }
//! }
//!
//! let state = Arc::new(Counter { value: 2 });
//! let operation = update(Msg::Increment, &state);
//! assert_eq!(operation.classify(&state), Branch::Update);
//! assert_eq!(operation.state.value, 3);
//! ```

use std::fmt;
use std::sync::Arc;

use crate::command::Command;

/// Result of applying an update function to an action and a state.
pub struct Operation<S, A> {
    /// The next state. Reusing the input `Arc` means "unchanged".
    pub state: Arc<S>,
    /// Follow-up work, issued in order once any state commit completed.
    pub commands: Vec<Command<A>>,
}

impl<S, A> Operation<S, A> {
    /// Keep the current state, no commands.
    #[inline]
    pub fn unchanged(state: &Arc<S>) -> Self {
        Self::from_arc(Arc::clone(state))
    }

    /// Replace the state with a fresh value, no commands.
    #[inline]
    pub fn new(state: S) -> Self {
        Self::from_arc(Arc::new(state))
    }

    /// Use the given state handle, no commands.
    #[inline]
    pub fn from_arc(state: Arc<S>) -> Self {
        Self {
            state,
            commands: Vec::new(),
        }
    }

    /// Add a command to this operation.
    #[inline]
    pub fn with(mut self, command: Command<A>) -> Self {
        self.commands.push(command);
        self
    }

    /// Add several commands, keeping their order.
    #[inline]
    pub fn with_commands<I>(mut self, commands: I) -> Self
    where
        I: IntoIterator<Item = Command<A>>,
    {
        self.commands.extend(commands);
        self
    }

    /// Returns true if there are any commands to run.
    #[inline]
    pub fn has_commands(&self) -> bool {
        !self.commands.is_empty()
    }

    /// Whether `state` is a different handle than `previous`.
    #[inline]
    pub fn changes(&self, previous: &Arc<S>) -> bool {
        !Arc::ptr_eq(previous, &self.state)
    }

    /// Classify this operation against the state it was computed from.
    pub fn classify(&self, previous: &Arc<S>) -> Branch {
        match (self.has_commands(), self.changes(previous)) {
            (false, false) => Branch::NoOp,
            (false, true) => Branch::Update,
            (true, false) => Branch::SideEffects,
            (true, true) => Branch::UpdateWithSideEffects,
        }
    }
}

impl<S, A> fmt::Debug for Operation<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("commands", &self.commands.len())
            .finish_non_exhaustive()
    }
}

/// The four ways a dispatcher can handle an [`Operation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Branch {
    /// Same state, no commands: nothing to do.
    NoOp,
    /// New state, no commands: commit and wait for the acknowledgement.
    Update,
    /// Same state, commands: run them, no commit.
    SideEffects,
    /// New state and commands: commit, then run the commands.
    UpdateWithSideEffects,
}

impl Branch {
    /// Whether this branch asks the host to commit a new state.
    pub fn commits(self) -> bool {
        matches!(self, Branch::Update | Branch::UpdateWithSideEffects)
    }

    /// Whether this branch runs commands.
    pub fn runs_commands(self) -> bool {
        matches!(self, Branch::SideEffects | Branch::UpdateWithSideEffects)
    }
}

/// An update function: `(action, state) -> Operation`.
///
/// Must be pure and total: unrecognised actions return
/// [`Operation::unchanged`]. Any closure or `fn` with the matching signature
/// implements this trait.
pub trait Update<S, A>: Send + Sync {
    /// Compute the next operation.
    fn update(&self, action: A, state: &Arc<S>) -> Operation<S, A>;
}

impl<S, A, F> Update<S, A> for F
where
    F: Fn(A, &Arc<S>) -> Operation<S, A> + Send + Sync,
{
    fn update(&self, action: A, state: &Arc<S>) -> Operation<S, A> {
        self(action, state)
    }
}
