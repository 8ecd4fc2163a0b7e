//! Action trait for tagged events

use std::fmt::Debug;

/// Marker trait for actions that can be dispatched
///
/// Actions describe something that happened. They should be:
/// - Clone: Actions may be recorded by watchers and replayed in tests
/// - Debug: For logging
/// - Send + Sync + 'static: Commands resolve them on whichever task polls the dispatcher
///
/// The action's [`name`](Action::name) is its type tag. Update functions
/// match on the enum itself; the tag is what watchers and logs see.
///
/// Use `#[derive(Action)]` from `affect-dispatch-macros` to auto-implement this trait.
pub trait Action: Clone + Debug + Send + Sync + 'static {
    /// Get the action's type tag for logging and filtering
    fn name(&self) -> &'static str;
}
