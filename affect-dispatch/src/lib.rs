//! affect-dispatch: Elm-style update functions with async commands
//!
//! An update function is pure: it maps an action and the current state to an
//! [`Operation`], the next state plus the commands to run. The [`Dispatcher`]
//! commits the state, runs the commands concurrently, and dispatches whatever
//! they produce, until the whole chain has settled.
//!
//! # Example
//! ```
//! use std::sync::Arc;
//! use affect_dispatch::prelude::*;
//!
//! #[derive(Action, Clone, Debug)]
//! #[action(rename_all = "SCREAMING_SNAKE_CASE")]
//! enum Msg {
//!     FetchStuff,
//!     DidFetchStuff(u32),
//! }
//!
//! fn update(action: Msg, state: &Arc<u32>) -> Operation<u32, Msg> {
//!     match action {
//!         Msg::FetchStuff => Operation::unchanged(state)
//!             .with(Command::infallible(|| async { Some(Msg::DidFetchStuff(7)) })),
//!         Msg::DidFetchStuff(value) => Operation::new(value),
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let watched = Dispatcher::builder(SharedState::new(0), update).build_watched();
//! watched.send(Msg::FetchStuff).await.unwrap();
//!
//! assert_eq!(watched.action_types(), vec!["FETCH_STUFF", "DID_FETCH_STUFF"]);
//! assert_eq!(*watched.state(), 7);
//! # }
//! ```

// Re-export everything from core
pub use affect_dispatch_core::*;

// Re-export derive macros
pub use affect_dispatch_macros::Action;

/// Prelude for convenient imports
pub mod prelude {
    pub use affect_dispatch_core::prelude::*;

    // Derive macros
    pub use affect_dispatch_macros::Action;
}
