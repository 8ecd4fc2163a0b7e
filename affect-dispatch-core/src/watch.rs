//! Watchers: observers of every action passing through a dispatcher
//!
//! A watcher is called synchronously at the start of every dispatch step,
//! before anything else happens, including for the `None` sentinel a command
//! settles with when it has no action to report. Watchers see the action and
//! a read-only [`StateReader`]; they cannot affect the outcome.
//!
//! # Example
//!
//! ```ignore
//! use affect_dispatch_core::{ComposedWatcher, TracingWatcher, WatchFilter};
//!
//! let mut watchers = ComposedWatcher::new();
//! watchers.add(TracingWatcher::new(WatchFilter::new(Some("Fetch*"), None)));
//! watchers.add(action_log.clone());
//!
//! let dispatcher = Dispatcher::builder(host, update).watcher(watchers).build();
//! ```

use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::host::StateReader;

/// Observer invoked for every action (or `None` sentinel) a dispatcher sees.
///
/// Implementations must return promptly: the dispatcher calls them inline.
pub trait Watcher<S, A>: Send + Sync {
    /// Observe one action.
    fn watch(&self, action: Option<&A>, state: &StateReader<S>);
}

/// A watcher that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopWatcher;

impl<S, A> Watcher<S, A> for NoopWatcher {
    fn watch(&self, _action: Option<&A>, _state: &StateReader<S>) {}
}

/// Adapts a closure into a [`Watcher`].
#[derive(Debug, Clone)]
pub struct FnWatcher<F>(pub F);

impl<S, A, F> Watcher<S, A> for FnWatcher<F>
where
    F: Fn(Option<&A>, &StateReader<S>) + Send + Sync,
{
    fn watch(&self, action: Option<&A>, state: &StateReader<S>) {
        (self.0)(action, state)
    }
}

/// Runs several watchers in insertion order.
pub struct ComposedWatcher<S, A> {
    watchers: Vec<Box<dyn Watcher<S, A>>>,
}

impl<S, A> std::fmt::Debug for ComposedWatcher<S, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComposedWatcher")
            .field("watchers_count", &self.watchers.len())
            .finish()
    }
}

impl<S, A> Default for ComposedWatcher<S, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, A> ComposedWatcher<S, A> {
    /// Create an empty composition
    pub fn new() -> Self {
        Self {
            watchers: Vec::new(),
        }
    }

    /// Add a watcher to the composition
    pub fn add<W: Watcher<S, A> + 'static>(&mut self, watcher: W) {
        self.watchers.push(Box::new(watcher));
    }

    /// Builder form of [`add`](Self::add)
    pub fn with<W: Watcher<S, A> + 'static>(mut self, watcher: W) -> Self {
        self.add(watcher);
        self
    }

    /// Number of composed watchers
    pub fn len(&self) -> usize {
        self.watchers.len()
    }

    /// Whether no watchers were added
    pub fn is_empty(&self) -> bool {
        self.watchers.is_empty()
    }
}

impl<S, A> Watcher<S, A> for ComposedWatcher<S, A> {
    fn watch(&self, action: Option<&A>, state: &StateReader<S>) {
        for watcher in &self.watchers {
            watcher.watch(action, state);
        }
    }
}

impl<S, A> Watcher<S, A> for Box<dyn Watcher<S, A>> {
    fn watch(&self, action: Option<&A>, state: &StateReader<S>) {
        (**self).watch(action, state)
    }
}

// ============================================================================
// Tracing
// ============================================================================

/// Include/exclude filter on action names, with glob patterns.
///
/// Patterns support:
/// - `*` matches any sequence of characters
/// - `?` matches any single character
/// - Literal text matches exactly
///
/// # Examples
///
/// - `Fetch*` matches FetchStuff, FetchStuffSuccess, etc.
/// - `*_SUCCESS` matches FETCH_STUFF_SUCCESS
/// - `Tick` matches only Tick
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchFilter {
    /// If non-empty, only actions matching one of these patterns pass
    pub include_patterns: Vec<String>,
    /// Actions matching these patterns are dropped (applied after include)
    pub exclude_patterns: Vec<String>,
}

impl WatchFilter {
    /// Create a filter from comma-separated pattern strings
    ///
    /// # Example
    /// ```
    /// use affect_dispatch_core::WatchFilter;
    ///
    /// let filter = WatchFilter::new(Some("Fetch*,Increment"), Some("*Tick"));
    /// assert!(filter.should_log("FetchStuff"));
    /// assert!(filter.should_log("Increment"));
    /// assert!(!filter.should_log("Decrement"));
    /// assert!(!filter.should_log("FetchTick"));
    /// ```
    pub fn new(include: Option<&str>, exclude: Option<&str>) -> Self {
        Self {
            include_patterns: include.map(split_patterns).unwrap_or_default(),
            exclude_patterns: exclude.map(split_patterns).unwrap_or_default(),
        }
    }

    /// Create a filter with specific pattern vectors
    pub fn with_patterns(include: Vec<String>, exclude: Vec<String>) -> Self {
        Self {
            include_patterns: include,
            exclude_patterns: exclude,
        }
    }

    /// Check if an action name passes the include/exclude patterns
    pub fn should_log(&self, action_name: &str) -> bool {
        if !self.include_patterns.is_empty()
            && !self
                .include_patterns
                .iter()
                .any(|p| glob_match(p, action_name))
        {
            return false;
        }

        !self
            .exclude_patterns
            .iter()
            .any(|p| glob_match(p, action_name))
    }
}

fn split_patterns(s: &str) -> Vec<String> {
    s.split(',')
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

/// Watcher that logs observed actions through `tracing`.
///
/// Actions are logged at `debug`, sentinels at `trace`.
#[derive(Debug, Clone)]
pub struct TracingWatcher {
    filter: WatchFilter,
    active: bool,
}

impl Default for TracingWatcher {
    fn default() -> Self {
        Self::log_all()
    }
}

impl TracingWatcher {
    /// Create a watcher with the given filter
    pub fn new(filter: WatchFilter) -> Self {
        Self {
            filter,
            active: true,
        }
    }

    /// Log every action
    pub fn log_all() -> Self {
        Self::new(WatchFilter::default())
    }

    /// Set whether the watcher logs anything.
    ///
    /// Useful for wiring logging to a `--debug` flag.
    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Check if the watcher is active.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Get a reference to the filter
    pub fn filter(&self) -> &WatchFilter {
        &self.filter
    }
}

impl<S, A: Action> Watcher<S, A> for TracingWatcher {
    fn watch(&self, action: Option<&A>, _state: &StateReader<S>) {
        if !self.active {
            return;
        }

        match action {
            Some(action) if self.filter.should_log(action.name()) => {
                tracing::debug!(action = %action.name(), detail = ?action, "action");
            }
            Some(_) => {}
            None => tracing::trace!("command settled without an action"),
        }
    }
}

/// Simple glob pattern matching supporting `*` and `?`.
///
/// - `*` matches zero or more characters
/// - `?` matches exactly one character
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    let (mut pi, mut ti) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while ti < text.len() {
        match pattern.get(pi) {
            Some(&'*') => {
                backtrack = Some((pi, ti));
                pi += 1;
            }
            Some(&c) if c == '?' || c == text[ti] => {
                pi += 1;
                ti += 1;
            }
            _ => match backtrack {
                Some((star_pi, star_ti)) => {
                    pi = star_pi + 1;
                    ti = star_ti + 1;
                    backtrack = Some((star_pi, star_ti + 1));
                }
                None => return false,
            },
        }
    }

    pattern[pi..].iter().all(|c| *c == '*')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::SharedState;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Clone, Debug)]
    enum TestAction {
        Tick,
        Connect,
    }

    impl Action for TestAction {
        fn name(&self) -> &'static str {
            match self {
                TestAction::Tick => "Tick",
                TestAction::Connect => "Connect",
            }
        }
    }

    fn reader() -> StateReader<()> {
        StateReader::new(Arc::new(SharedState::new(())))
    }

    #[test]
    fn test_glob_match_exact() {
        assert!(glob_match("Tick", "Tick"));
        assert!(!glob_match("Tick", "Tock"));
        assert!(!glob_match("Tick", "TickTock"));
    }

    #[test]
    fn test_glob_match_star() {
        assert!(glob_match("FETCH_*", "FETCH_STUFF"));
        assert!(glob_match("FETCH_*", "FETCH_"));
        assert!(!glob_match("FETCH_*", "REFETCH_STUFF"));
        assert!(glob_match("*_SUCCESS", "FETCH_STUFF_SUCCESS"));
        assert!(glob_match("*STUFF*", "FETCH_STUFF_SUCCESS"));
        assert!(glob_match("*", ""));
    }

    #[test]
    fn test_glob_match_question() {
        assert!(glob_match("Tick?", "Ticks"));
        assert!(!glob_match("Tick?", "Tick"));
        assert!(!glob_match("Tick?", "Tickss"));
    }

    #[test]
    fn test_glob_match_backtracks() {
        assert!(glob_match("*a*b", "xaxxab"));
        assert!(glob_match("Fetch*Did*", "FetchUserDidLoad"));
        assert!(!glob_match("*a*b", "xaxxa"));
    }

    #[test]
    fn test_filter_include_and_exclude() {
        let filter = WatchFilter::new(Some("Did*"), Some("DidFail*"));
        assert!(filter.should_log("DidConnect"));
        assert!(!filter.should_log("DidFailConnect"));
        assert!(!filter.should_log("Connect"));
    }

    #[test]
    fn test_filter_default_logs_everything() {
        let filter = WatchFilter::default();
        assert!(filter.should_log("Tick"));
        assert!(filter.should_log("Connect"));
    }

    #[test]
    fn test_filter_ignores_blank_patterns() {
        let filter = WatchFilter::new(Some(" , "), Some(""));
        assert!(filter.include_patterns.is_empty());
        assert!(filter.exclude_patterns.is_empty());
        assert!(filter.should_log("Anything"));
    }

    #[test]
    fn test_filter_deserializes() {
        let filter: WatchFilter =
            serde_json::from_str(r#"{"exclude_patterns": ["Tick"]}"#).unwrap();
        assert!(!filter.should_log("Tick"));
        assert!(filter.should_log("Connect"));
    }

    #[test]
    fn test_composed_watcher_calls_in_order() {
        let order = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let (first, second) = (order.clone(), order.clone());

        let composed = ComposedWatcher::<(), TestAction>::new()
            .with(FnWatcher(move |_: Option<&TestAction>, _: &StateReader<()>| {
                first.lock().push("first")
            }))
            .with(FnWatcher(move |_: Option<&TestAction>, _: &StateReader<()>| {
                second.lock().push("second")
            }));

        composed.watch(Some(&TestAction::Connect), &reader());
        composed.watch(None, &reader());

        assert_eq!(composed.len(), 2);
        assert_eq!(*order.lock(), vec!["first", "second", "first", "second"]);
    }

    #[test]
    fn test_fn_watcher_sees_sentinel() {
        let sentinels = Arc::new(AtomicUsize::new(0));
        let counter = sentinels.clone();
        let watcher = FnWatcher(move |action: Option<&TestAction>, _: &StateReader<()>| {
            if action.is_none() {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        watcher.watch(Some(&TestAction::Tick), &reader());
        watcher.watch(None, &reader());

        assert_eq!(sentinels.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_inactive_tracing_watcher_is_noop() {
        let watcher = TracingWatcher::log_all().active(false);
        assert!(!watcher.is_active());
        Watcher::<(), TestAction>::watch(&watcher, Some(&TestAction::Tick), &reader());
    }
}
