//! The dispatcher: runs the update function, commits state, runs commands
//!
//! One call to [`Dispatch::dispatch`] follows the whole chain it starts:
//!
//! ```text
//! dispatch(action)
//!     │
//!     ▼ step
//! watcher(action) ── None? ── done
//!     │
//!     ▼
//! update(action, get_state()) ─► Operation ─► classify
//!     │
//!     ├─ NoOp                   nothing
//!     ├─ Update                 commit ─► ack
//!     ├─ SideEffects            invoke commands
//!     └─ UpdateWithSideEffects  commit ─► ack ─► invoke commands
//!                                                     │
//!     ┌───────────────── each settlement ─────────────┘
//!     ▼
//!   step(settled action or None)
//! ```
//!
//! The first step runs inside the `dispatch` call itself. Whatever it leaves
//! pending is handed to a spawned driver task that owns one
//! `FuturesUnordered`; every step pushes its commit and command futures
//! there and the driver steps each settlement as it arrives. Chains of any
//! length run in constant stack, and an action's consequences are only
//! started after its own step ran.
//!
//! Commands are spawned onto the Tokio runtime as they are issued. Dropping
//! the future returned by `dispatch` stops waiting, never the work: issued
//! commands, pending commits and their follow-up actions still run.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use affect_dispatch_core::prelude::*;
//!
//! #[derive(Clone, Debug)]
//! enum Msg {
//!     Fetch,
//!     DidFetch(i32),
//! }
//!
//! impl Action for Msg {
//!     fn name(&self) -> &'static str {
//!         match self {
//!             Msg::Fetch => "Fetch",
//!             Msg::DidFetch(_) => "DidFetch",
//!         }
//!     }
//! }
//!
//! fn update(action: Msg, state: &Arc<i32>) -> Operation<i32, Msg> {
//!     match action {
//!         Msg::Fetch => Operation::unchanged(state)
//!             .with(Command::infallible(|| async { Some(Msg::DidFetch(42)) })),
//!         Msg::DidFetch(value) => Operation::new(value),
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let host = SharedState::new(0);
//! let dispatcher = Dispatcher::builder(host.clone(), update).build();
//!
//! dispatcher.send(Msg::Fetch).await.unwrap();
//! assert_eq!(*host.get(), 42);
//! # }
//! ```

use std::fmt;
use std::sync::Arc;

use futures::future::{self, BoxFuture, FutureExt};
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::oneshot;

use crate::action::Action;
use crate::command::{Command, CommandResult};
use crate::config::DispatchConfig;
use crate::error::DispatchError;
use crate::host::{CommitSignal, StateHost, StateReader};
use crate::operation::{Branch, Update};
use crate::watch::{FnWatcher, NoopWatcher, Watcher};

/// Anything that accepts actions: a [`Dispatcher`], or a mapped view of one.
pub trait Dispatch<A>: Send + Sync {
    /// Dispatch an action, or the `None` sentinel.
    ///
    /// The watcher and the update function run for `action` before this
    /// returns. The future resolves once every commit and command the action
    /// caused, directly or through follow-up actions, has settled, or with
    /// the first failure as soon as it happens. Dropping the future does not
    /// cancel work that was already issued.
    fn dispatch(&self, action: Option<A>) -> BoxFuture<'static, Result<(), DispatchError>>;

    /// Dispatch a present action.
    fn send(&self, action: A) -> BoxFuture<'static, Result<(), DispatchError>> {
        self.dispatch(Some(action))
    }
}

/// Stateful orchestrator connecting a host, an update function and a watcher.
///
/// Cloning is cheap and every clone drives the same host.
pub struct Dispatcher<S, A> {
    inner: Arc<Inner<S, A>>,
}

struct Inner<S, A> {
    host: Arc<dyn StateHost<S>>,
    update: Box<dyn Update<S, A>>,
    watcher: Box<dyn Watcher<S, A>>,
    config: DispatchConfig,
}

impl<S, A> Clone for Dispatcher<S, A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S, A> fmt::Debug for Dispatcher<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl<S, A> Dispatcher<S, A>
where
    S: Send + Sync + 'static,
    A: Action,
{
    /// Start building a dispatcher for `host` and `update`.
    pub fn builder<H, U>(host: H, update: U) -> DispatcherBuilder<S, A>
    where
        H: StateHost<S> + 'static,
        U: Update<S, A> + 'static,
    {
        DispatcherBuilder {
            host: Arc::new(host),
            update: Box::new(update),
            watcher: Box::new(NoopWatcher),
            config: DispatchConfig::default(),
        }
    }

    /// Dispatcher with no watcher and default config.
    pub fn new<H, U>(host: H, update: U) -> Self
    where
        H: StateHost<S> + 'static,
        U: Update<S, A> + 'static,
    {
        Self::builder(host, update).build()
    }

    /// The host's current state.
    pub fn state(&self) -> Arc<S> {
        self.inner.host.get_state()
    }

    /// The configuration this dispatcher runs with.
    pub fn config(&self) -> &DispatchConfig {
        &self.inner.config
    }

    /// Drive everything the first step left pending until the chain drains.
    ///
    /// The first failure goes to `report` as soon as it happens; the loop
    /// keeps stepping the remaining settlements regardless.
    async fn drive(
        self,
        mut pending: Pending<A>,
        report: oneshot::Sender<Result<(), DispatchError>>,
    ) {
        let mut report = Some(report);
        while let Some(outcome) = pending.next().await {
            let result = match outcome {
                Outcome::Settled { depth, result } => match result {
                    Ok(action) => self.step(action, depth, &mut pending),
                    Err(source) => Err(DispatchError::Command(source)),
                },
                Outcome::Committed { depth, commands } => {
                    tracing::trace!(depth, "commit acknowledged");
                    self.issue(commands, depth + 1, &mut pending);
                    Ok(())
                }
                Outcome::CommitDropped => Err(DispatchError::CommitDropped),
            };

            if let Err(error) = result {
                match report.take() {
                    Some(report) => {
                        if let Err(Err(error)) = report.send(Err(error)) {
                            tracing::warn!(%error, "command chain failed after its caller went away");
                        }
                    }
                    None => tracing::warn!(%error, "additional failure in command chain"),
                }
            }
        }

        if let Some(report) = report {
            let _ = report.send(Ok(()));
        }
    }

    /// Observe, update and schedule follow-ups for one action.
    fn step(
        &self,
        action: Option<A>,
        depth: usize,
        pending: &mut Pending<A>,
    ) -> Result<(), DispatchError> {
        let inner = &*self.inner;

        inner
            .watcher
            .watch(action.as_ref(), &StateReader::new(Arc::clone(&inner.host)));

        let Some(action) = action else {
            tracing::trace!(depth, "command settled without an action");
            return Ok(());
        };

        let name = action.name();
        if let Some(limit) = inner.config.exceeds(depth) {
            return Err(DispatchError::ChainTooDeep {
                action: name,
                depth,
                limit,
            });
        }

        let state = inner.host.get_state();
        let operation = inner.update.update(action, &state);
        let branch = operation.classify(&state);
        tracing::debug!(
            action = %name,
            ?branch,
            depth,
            commands = operation.commands.len(),
            "dispatch"
        );

        match branch {
            Branch::NoOp => {}
            Branch::SideEffects => self.issue(operation.commands, depth + 1, pending),
            Branch::Update | Branch::UpdateWithSideEffects => {
                pending.push(self.commit(operation.state, operation.commands, depth))
            }
        }
        Ok(())
    }

    /// Request a commit; its commands are issued once it is acknowledged.
    fn commit(
        &self,
        state: Arc<S>,
        commands: Vec<Command<A>>,
        depth: usize,
    ) -> BoxFuture<'static, Outcome<A>> {
        let (signal, acknowledged) = CommitSignal::pair();
        self.inner.host.set_state(state, signal);

        async move {
            match acknowledged.await {
                Ok(()) => Outcome::Committed { depth, commands },
                Err(_) => Outcome::CommitDropped,
            }
        }
        .boxed()
    }

    /// Spawn commands in order; their settlements arrive in completion order.
    fn issue(&self, commands: Vec<Command<A>>, depth: usize, pending: &mut Pending<A>) {
        for command in commands {
            let task = tokio::spawn(command.invoke());
            pending.push(
                async move {
                    let result = task.await.unwrap_or_else(|error| Err(error.into()));
                    Outcome::Settled { depth, result }
                }
                .boxed(),
            );
        }
    }
}

impl<S, A> Dispatch<A> for Dispatcher<S, A>
where
    S: Send + Sync + 'static,
    A: Action,
{
    fn dispatch(&self, action: Option<A>) -> BoxFuture<'static, Result<(), DispatchError>> {
        let mut pending = Pending::new();
        if let Err(error) = self.step(action, 0, &mut pending) {
            return future::ready(Err(error)).boxed();
        }
        if pending.is_empty() {
            return future::ready(Ok(())).boxed();
        }

        let (report, reported) = oneshot::channel();
        let driver = tokio::spawn(self.clone().drive(pending, report));
        async move {
            match reported.await {
                Ok(result) => result,
                // The driver only drops its report without sending by panicking
                Err(_) => match driver.await {
                    Err(error) if error.is_panic() => std::panic::resume_unwind(error.into_panic()),
                    _ => Ok(()),
                },
            }
        }
        .boxed()
    }
}

type Pending<A> = FuturesUnordered<BoxFuture<'static, Outcome<A>>>;

/// What one pending future in a dispatch call settled with.
enum Outcome<A> {
    /// A command finished.
    Settled {
        depth: usize,
        result: CommandResult<A>,
    },
    /// The host acknowledged a commit; `commands` may now start.
    Committed {
        depth: usize,
        commands: Vec<Command<A>>,
    },
    /// The host dropped a commit signal.
    CommitDropped,
}

/// Builder for [`Dispatcher`].
pub struct DispatcherBuilder<S, A> {
    host: Arc<dyn StateHost<S>>,
    update: Box<dyn Update<S, A>>,
    watcher: Box<dyn Watcher<S, A>>,
    config: DispatchConfig,
}

impl<S, A> fmt::Debug for DispatcherBuilder<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatcherBuilder")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<S, A> DispatcherBuilder<S, A>
where
    S: Send + Sync + 'static,
    A: Action,
{
    /// Observe every action with `watcher`, replacing any previous one.
    pub fn watcher<W: Watcher<S, A> + 'static>(mut self, watcher: W) -> Self {
        self.watcher = Box::new(watcher);
        self
    }

    /// Observe every action with a closure.
    pub fn watch_fn<F>(self, watcher: F) -> Self
    where
        F: Fn(Option<&A>, &StateReader<S>) + Send + Sync + 'static,
    {
        self.watcher(FnWatcher(watcher))
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: DispatchConfig) -> Self {
        self.config = config;
        self
    }

    /// Limit how many command hops one dispatch follows.
    pub fn max_chain_depth(mut self, depth: usize) -> Self {
        self.config.max_chain_depth = Some(depth);
        self
    }

    /// Finish building.
    pub fn build(self) -> Dispatcher<S, A> {
        Dispatcher {
            inner: Arc::new(Inner {
                host: self.host,
                update: self.update,
                watcher: self.watcher,
                config: self.config,
            }),
        }
    }

    pub(crate) fn take_watcher(&mut self) -> Box<dyn Watcher<S, A>> {
        std::mem::replace(&mut self.watcher, Box::new(NoopWatcher))
    }
}

impl<A, D> Dispatch<A> for Arc<D>
where
    D: Dispatch<A> + ?Sized,
{
    fn dispatch(&self, action: Option<A>) -> BoxFuture<'static, Result<(), DispatchError>> {
        (**self).dispatch(action)
    }
}
