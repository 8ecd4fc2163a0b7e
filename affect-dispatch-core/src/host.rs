//! State hosts: who owns the state and how commits are acknowledged
//!
//! The dispatcher never owns state. It reads the authoritative value through
//! [`StateHost::get_state`] and asks for a new value to be committed through
//! [`StateHost::set_state`], handing over a [`CommitSignal`] the host must
//! complete once the new state is in place.
//!
//! Three hosts ship with the crate:
//!
//! - [`SharedState`]: an in-memory cell that commits synchronously
//! - [`FnHost`]: a getter/setter closure pair
//! - [`QueuedHost`]: commits are queued and applied by the host's own loop
//!   (e.g. a render loop), see [`CommitQueue`]

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::{mpsc, oneshot};

/// Owner of the authoritative state.
///
/// `set_state` may complete the signal synchronously or later. It must
/// complete it at most once (enforced by ownership); dropping the signal
/// without completing it fails the dispatch with
/// [`DispatchError::CommitDropped`](crate::DispatchError::CommitDropped).
///
/// The dispatcher issues at most one commit per operation and waits for it,
/// but several operations may commit concurrently. Hosts that care must
/// serialize commits themselves.
pub trait StateHost<S>: Send + Sync {
    /// The current authoritative state.
    fn get_state(&self) -> Arc<S>;

    /// Make `state` authoritative, then complete `signal`.
    fn set_state(&self, state: Arc<S>, signal: CommitSignal);
}

impl<S, H> StateHost<S> for Arc<H>
where
    H: StateHost<S> + ?Sized,
{
    fn get_state(&self) -> Arc<S> {
        (**self).get_state()
    }

    fn set_state(&self, state: Arc<S>, signal: CommitSignal) {
        (**self).set_state(state, signal)
    }
}

/// One-shot acknowledgement that a commit took effect.
#[derive(Debug)]
pub struct CommitSignal {
    tx: oneshot::Sender<()>,
}

impl CommitSignal {
    pub(crate) fn pair() -> (Self, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, rx)
    }

    /// Signal that the committed state is now authoritative.
    pub fn complete(self) {
        // The dispatch future may already be gone; nothing to report then.
        let _ = self.tx.send(());
    }
}

/// Read-only access to the host's state, handed to watchers.
pub struct StateReader<S> {
    host: Arc<dyn StateHost<S>>,
}

impl<S> StateReader<S> {
    pub(crate) fn new(host: Arc<dyn StateHost<S>>) -> Self {
        Self { host }
    }

    /// The current authoritative state.
    pub fn get(&self) -> Arc<S> {
        self.host.get_state()
    }
}

impl<S> Clone for StateReader<S> {
    fn clone(&self) -> Self {
        Self {
            host: Arc::clone(&self.host),
        }
    }
}

impl<S> fmt::Debug for StateReader<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateReader").finish_non_exhaustive()
    }
}

// ============================================================================
// SharedState
// ============================================================================

/// In-memory state cell that commits synchronously.
///
/// Cloning shares the same cell.
pub struct SharedState<S> {
    inner: Arc<SharedInner<S>>,
}

struct SharedInner<S> {
    state: RwLock<Arc<S>>,
    commits: AtomicUsize,
}

impl<S> SharedState<S> {
    /// Create a cell holding `state`.
    pub fn new(state: S) -> Self {
        Self::from_arc(Arc::new(state))
    }

    /// Create a cell holding an existing state handle.
    pub fn from_arc(state: Arc<S>) -> Self {
        Self {
            inner: Arc::new(SharedInner {
                state: RwLock::new(state),
                commits: AtomicUsize::new(0),
            }),
        }
    }

    /// The current state.
    pub fn get(&self) -> Arc<S> {
        Arc::clone(&self.inner.state.read())
    }

    /// Replace the state without going through a dispatcher.
    pub fn replace(&self, state: Arc<S>) -> Arc<S> {
        std::mem::replace(&mut *self.inner.state.write(), state)
    }

    /// How many commits have been applied through [`StateHost::set_state`].
    pub fn commit_count(&self) -> usize {
        self.inner.commits.load(Ordering::SeqCst)
    }
}

impl<S> Clone for SharedState<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: Send + Sync> StateHost<S> for SharedState<S> {
    fn get_state(&self) -> Arc<S> {
        self.get()
    }

    fn set_state(&self, state: Arc<S>, signal: CommitSignal) {
        *self.inner.state.write() = state;
        self.inner.commits.fetch_add(1, Ordering::SeqCst);
        signal.complete();
    }
}

impl<S> fmt::Debug for SharedState<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedState")
            .field("commits", &self.commit_count())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// FnHost
// ============================================================================

/// Host built from a getter and a setter closure.
///
/// ```
/// use std::sync::Arc;
/// use parking_lot::Mutex;
/// use affect_dispatch_core::host::{CommitSignal, FnHost};
///
/// let cell = Arc::new(Mutex::new(Arc::new(0_u32)));
/// let (get_cell, set_cell) = (cell.clone(), cell.clone());
/// let host = FnHost::new(
///     move || get_cell.lock().clone(),
///     move |state, signal: CommitSignal| {
///         *set_cell.lock() = state;
///         signal.complete();
///     },
/// );
/// # let _ = host;
/// ```
pub struct FnHost<G, C> {
    get: G,
    set: C,
}

impl<G, C> FnHost<G, C> {
    /// Wrap a getter and a setter.
    pub fn new(get: G, set: C) -> Self {
        Self { get, set }
    }
}

impl<S, G, C> StateHost<S> for FnHost<G, C>
where
    G: Fn() -> Arc<S> + Send + Sync,
    C: Fn(Arc<S>, CommitSignal) + Send + Sync,
{
    fn get_state(&self) -> Arc<S> {
        (self.get)()
    }

    fn set_state(&self, state: Arc<S>, signal: CommitSignal) {
        (self.set)(state, signal)
    }
}

// ============================================================================
// QueuedHost
// ============================================================================

/// A commit waiting to be applied by a [`CommitQueue`].
pub struct PendingCommit<S> {
    /// The state to make authoritative.
    pub state: Arc<S>,
    signal: CommitSignal,
}

impl<S> PendingCommit<S> {
    /// Split into the requested state and its signal, for hosts applying it by hand.
    pub fn into_parts(self) -> (Arc<S>, CommitSignal) {
        (self.state, self.signal)
    }
}

impl<S> fmt::Debug for PendingCommit<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingCommit").finish_non_exhaustive()
    }
}

/// Host whose commits are applied asynchronously.
///
/// `set_state` only enqueues the request. The owning loop drains it with
/// [`CommitQueue::apply_next`], which is where the new state becomes
/// authoritative and the dispatcher is released.
pub struct QueuedHost<S> {
    state: SharedState<S>,
    tx: mpsc::UnboundedSender<PendingCommit<S>>,
}

/// Receiving side of a [`QueuedHost`].
pub struct CommitQueue<S> {
    state: SharedState<S>,
    rx: mpsc::UnboundedReceiver<PendingCommit<S>>,
}

impl<S> QueuedHost<S> {
    /// Create a host/queue pair holding `state`.
    pub fn new(state: S) -> (Self, CommitQueue<S>) {
        let state = SharedState::new(state);
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                state: state.clone(),
                tx,
            },
            CommitQueue { state, rx },
        )
    }
}

impl<S: Send + Sync> StateHost<S> for QueuedHost<S> {
    fn get_state(&self) -> Arc<S> {
        self.state.get()
    }

    fn set_state(&self, state: Arc<S>, signal: CommitSignal) {
        // A closed queue drops the signal, which fails the waiting dispatch.
        if self.tx.send(PendingCommit { state, signal }).is_err() {
            tracing::warn!("commit queue closed, dropping commit");
        }
    }
}

impl<S> CommitQueue<S> {
    /// The current authoritative state.
    pub fn state(&self) -> Arc<S> {
        self.state.get()
    }

    /// How many commits were applied so far.
    pub fn applied(&self) -> usize {
        self.state.commit_count()
    }

    /// Wait for the next commit request and apply it.
    ///
    /// Returns `None` once every [`QueuedHost`] is gone.
    pub async fn apply_next(&mut self) -> Option<Arc<S>>
    where
        S: Send + Sync,
    {
        let pending = self.rx.recv().await?;
        Some(self.apply(pending))
    }

    /// Apply every commit that is already queued, returning how many were applied.
    pub fn apply_pending(&mut self) -> usize
    where
        S: Send + Sync,
    {
        let mut applied = 0;
        while let Ok(pending) = self.rx.try_recv() {
            self.apply(pending);
            applied += 1;
        }
        applied
    }

    /// Take the next queued commit without applying it.
    pub fn try_take(&mut self) -> Option<PendingCommit<S>> {
        self.rx.try_recv().ok()
    }

    fn apply(&self, pending: PendingCommit<S>) -> Arc<S>
    where
        S: Send + Sync,
    {
        let PendingCommit { state, signal } = pending;
        self.state.set_state(Arc::clone(&state), signal);
        state
    }
}
