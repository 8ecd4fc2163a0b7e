//! Commands: lazily-started async work that settles with an action or nothing
//!
//! A [`Command`] is the Rust shape of a zero-argument async callable. It is
//! built by the update function, handed to the dispatcher inside an
//! [`Operation`](crate::Operation), and invoked exactly once. Ownership
//! enforces that: [`Command::invoke`] consumes the command.
//!
//! # Example
//!
//! ```
//! use affect_dispatch_core::{Action, Command};
//!
//! #[derive(Clone, Debug, PartialEq)]
//! enum Msg {
//!     Loaded(u32),
//! }
//!
//! impl Action for Msg {
//!     fn name(&self) -> &'static str {
//!         "Loaded"
//!     }
//! }
//!
//! let command = Command::infallible(|| async { Some(Msg::Loaded(7)) });
//! let settled = futures::executor::block_on(command.invoke()).unwrap();
//! assert_eq!(settled, Some(Msg::Loaded(7)));
//! ```

use std::fmt;
use std::future::Future;

use futures::future::{BoxFuture, FutureExt};

use crate::error::BoxError;

/// What a command settles with: an action, the "no action" sentinel, or a failure.
pub type CommandResult<A> = Result<Option<A>, BoxError>;

type Invoke<A> = Box<dyn FnOnce() -> BoxFuture<'static, CommandResult<A>> + Send>;

/// A single unit of asynchronous follow-up work.
///
/// Nothing runs until [`invoke`](Command::invoke) is called. The dispatcher
/// never retries or deduplicates commands; retry and timeout policy belongs
/// inside the command itself.
pub struct Command<A> {
    invoke: Invoke<A>,
}

impl<A: Send + 'static> Command<A> {
    /// Create a command from a closure returning a fallible future.
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = CommandResult<A>> + Send + 'static,
    {
        Self {
            invoke: Box::new(move || f().boxed()),
        }
    }

    /// Create a command whose future cannot fail.
    pub fn infallible<F, Fut>(f: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Option<A>> + Send + 'static,
    {
        Self::new(move || f().map(Ok))
    }

    /// A command that settles immediately with `action`.
    pub fn resolve(action: A) -> Self {
        Self::new(move || futures::future::ready(Ok(Some(action))))
    }

    /// A command that settles immediately with the "no action" sentinel.
    pub fn empty() -> Self {
        Self::new(|| futures::future::ready(Ok(None)))
    }

    /// Start the command.
    pub fn invoke(self) -> BoxFuture<'static, CommandResult<A>> {
        (self.invoke)()
    }

    /// Re-wrap the action this command eventually produces.
    ///
    /// The wrapped command is only invoked when the mapped one is. `None`
    /// stays `None` and errors pass through untouched.
    pub fn map<B, F>(self, wrap: F) -> Command<B>
    where
        B: Send + 'static,
        F: FnOnce(A) -> B + Send + 'static,
    {
        let invoke = self.invoke;
        Command::new(move || {
            let settled = invoke();
            async move { Ok::<_, BoxError>(settled.await?.map(wrap)) }
        })
    }
}

impl<A> fmt::Debug for Command<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command").finish_non_exhaustive()
    }
}
