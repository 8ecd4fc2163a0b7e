//! Mapping between a child action universe and a parent one
//!
//! A sub-component speaks its own action type `C`. The parent embeds it with
//! a wrap function `C -> P` (typically an enum variant constructor), and two
//! helpers do the plumbing:
//!
//! - [`map_dispatcher`] turns a parent dispatcher into one that accepts
//!   child actions.
//! - [`map_commands`] turns child commands into parent commands.
//!
//! Both compose: wrapping twice is the same as wrapping once with the
//! composed function.
//!
//! ```
//! use affect_dispatch_core::{map_dispatcher, Dispatch, DispatchExt};
//! # use affect_dispatch_core::DispatchError;
//! # use futures::future::{BoxFuture, FutureExt};
//! # use std::sync::{Arc, Mutex};
//! # #[derive(Clone, Default)]
//! # struct Recorder(Arc<Mutex<Vec<String>>>);
//! # impl Dispatch<String> for Recorder {
//! #     fn dispatch(&self, action: Option<String>) -> BoxFuture<'static, Result<(), DispatchError>> {
//! #         self.0.lock().unwrap().extend(action);
//! #         futures::future::ready(Ok(())).boxed()
//! #     }
//! # }
//!
//! let parent = Recorder::default();
//! let child = parent.clone().map(|n: u32| format!("child({n})"));
//! let grandchild = map_dispatcher(|b: bool| u32::from(b), child);
//!
//! futures::executor::block_on(grandchild.send(true)).unwrap();
//! assert_eq!(*parent.0.lock().unwrap(), vec!["child(1)".to_string()]);
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};

use crate::command::Command;
use crate::dispatcher::Dispatch;
use crate::error::DispatchError;
use crate::operation::Operation;

type Wrap<C, P> = Arc<dyn Fn(C) -> P + Send + Sync>;

/// A dispatcher for child actions, forwarding wrapped actions to a parent.
pub struct MappedDispatcher<C, P, D> {
    wrap: Wrap<C, P>,
    inner: D,
    _marker: PhantomData<fn(C) -> P>,
}

/// Create a child dispatcher that wraps each action before forwarding it.
///
/// The `None` sentinel is not forwarded: dispatching it resolves `Ok(())`
/// without calling the parent.
pub fn map_dispatcher<C, P, D, F>(wrap: F, dispatcher: D) -> MappedDispatcher<C, P, D>
where
    D: Dispatch<P>,
    F: Fn(C) -> P + Send + Sync + 'static,
{
    MappedDispatcher {
        wrap: Arc::new(wrap),
        inner: dispatcher,
        _marker: PhantomData,
    }
}

impl<C, P, D> MappedDispatcher<C, P, D> {
    /// The dispatcher this one forwards to.
    pub fn inner(&self) -> &D {
        &self.inner
    }
}

impl<C, P, D: Clone> Clone for MappedDispatcher<C, P, D> {
    fn clone(&self) -> Self {
        Self {
            wrap: Arc::clone(&self.wrap),
            inner: self.inner.clone(),
            _marker: PhantomData,
        }
    }
}

impl<C, P, D: fmt::Debug> fmt::Debug for MappedDispatcher<C, P, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappedDispatcher")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

impl<C, P, D> Dispatch<C> for MappedDispatcher<C, P, D>
where
    D: Dispatch<P>,
{
    fn dispatch(&self, action: Option<C>) -> BoxFuture<'static, Result<(), DispatchError>> {
        match action {
            Some(action) => self.inner.dispatch(Some((self.wrap)(action))),
            None => futures::future::ready(Ok(())).boxed(),
        }
    }
}

/// Method form of [`map_dispatcher`].
pub trait DispatchExt<P>: Dispatch<P> + Sized {
    /// Accept child actions, wrapping them with `wrap`.
    fn map<C, F>(self, wrap: F) -> MappedDispatcher<C, P, Self>
    where
        F: Fn(C) -> P + Send + Sync + 'static,
    {
        map_dispatcher(wrap, self)
    }
}

impl<P, D: Dispatch<P>> DispatchExt<P> for D {}

/// Wrap the action each command eventually produces.
///
/// One mapped command per input, in the same order. Each mapped command
/// invokes the command it wraps exactly once, when it is itself invoked.
pub fn map_commands<C, P, F>(wrap: F, commands: Vec<Command<C>>) -> Vec<Command<P>>
where
    C: Send + 'static,
    P: Send + 'static,
    F: Fn(C) -> P + Send + Sync + 'static,
{
    let wrap: Wrap<C, P> = Arc::new(wrap);
    commands
        .into_iter()
        .map(|command| {
            let wrap = Arc::clone(&wrap);
            command.map(move |action| wrap(action))
        })
        .collect()
}

impl<S, C: Send + 'static> Operation<S, C> {
    /// Keep the state, wrap every command's action with `wrap`.
    pub fn map_commands<P, F>(self, wrap: F) -> Operation<S, P>
    where
        P: Send + 'static,
        F: Fn(C) -> P + Send + Sync + 'static,
    {
        Operation {
            state: self.state,
            commands: map_commands(wrap, self.commands),
        }
    }
}

/// Embed a child operation into the parent's state and action universe.
///
/// `child_before` is the child state the operation was computed from. If the
/// child kept it, the parent `Arc` is reused, so a child no-op stays a parent
/// no-op. Otherwise `embed` builds the new parent value from the old one and
/// the new child state.
pub fn lift_operation<PS, CS, PA, CA, E, F>(
    parent: &Arc<PS>,
    child_before: &Arc<CS>,
    child_op: Operation<CS, CA>,
    embed: E,
    wrap: F,
) -> Operation<PS, PA>
where
    CA: Send + 'static,
    PA: Send + 'static,
    E: FnOnce(&PS, Arc<CS>) -> PS,
    F: Fn(CA) -> PA + Send + Sync + 'static,
{
    let state = if child_op.changes(child_before) {
        Arc::new(embed(parent, child_op.state))
    } else {
        Arc::clone(parent)
    };

    Operation {
        state,
        commands: map_commands(wrap, child_op.commands),
    }
}
