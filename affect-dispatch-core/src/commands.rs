//! Ready-made commands
//!
//! - [`delay`]: yield an action after a pause
//! - [`now`]: yield an action built from the current time
//! - [`Debouncer`]: keyed debouncing for search-as-you-type and similar patterns
//! - `fetch_json` / `fetch_text` (feature `http`): HTTP requests via `reqwest`
//!
//! # Example
//!
//! ```ignore
//! use affect_dispatch::commands::{delay, Debouncer};
//! use std::time::Duration;
//!
//! let debouncer = Debouncer::new();
//!
//! // Only the last keystroke within 200ms triggers a search
//! Operation::new(next).with(debouncer.command("search", Duration::from_millis(200), move || {
//!     Action::Search(query)
//! }))
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::command::Command;

/// Yield `make()` once `duration` has passed.
pub fn delay<A, F>(duration: Duration, make: F) -> Command<A>
where
    A: Send + 'static,
    F: FnOnce() -> A + Send + 'static,
{
    Command::infallible(move || async move {
        tokio::time::sleep(duration).await;
        Some(make())
    })
}

/// Yield an action built from the current UTC time.
pub fn now<A, F>(make: F) -> Command<A>
where
    A: Send + 'static,
    F: FnOnce(DateTime<Utc>) -> A + Send + 'static,
{
    Command::infallible(move || async move { Some(make(Utc::now())) })
}

/// Identifies a debounced command stream.
///
/// Commands sharing a key supersede each other.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DebounceKey(String);

impl DebounceKey {
    /// Key from any string-like name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The key's name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for DebounceKey {
    fn from(s: &'static str) -> Self {
        Self::new(s)
    }
}

impl From<String> for DebounceKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Keyed debouncing for commands.
///
/// Each command built with [`command`](Debouncer::command) claims its key
/// when invoked. After the quiet period it yields its action only if no
/// later command with the same key was invoked in the meantime; a
/// superseded command settles with `None` instead.
///
/// Clones share the same registry, so a debouncer can live in an update
/// closure and still be cancelled from elsewhere.
#[derive(Clone, Debug, Default)]
pub struct Debouncer {
    inner: Arc<Registry>,
}

#[derive(Debug, Default)]
struct Registry {
    // key -> generation of the invocation currently allowed to fire
    armed: Mutex<HashMap<DebounceKey, u64>>,
    generation: AtomicU64,
}

impl Registry {
    fn arm(&self, key: &DebounceKey) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        self.armed.lock().insert(key.clone(), generation);
        generation
    }

    /// Disarm `key` if `generation` still owns it.
    fn fire(&self, key: &DebounceKey, generation: u64) -> bool {
        let mut armed = self.armed.lock();
        if armed.get(key) == Some(&generation) {
            armed.remove(key);
            true
        } else {
            false
        }
    }
}

impl Debouncer {
    /// A debouncer with nothing armed.
    pub fn new() -> Self {
        Self::default()
    }

    /// A command yielding `make()` after `duration`, unless superseded.
    pub fn command<A, F>(
        &self,
        key: impl Into<DebounceKey>,
        duration: Duration,
        make: F,
    ) -> Command<A>
    where
        A: Send + 'static,
        F: FnOnce() -> A + Send + 'static,
    {
        let key = key.into();
        let registry = Arc::clone(&self.inner);

        Command::infallible(move || {
            let generation = registry.arm(&key);
            async move {
                tokio::time::sleep(duration).await;
                if registry.fire(&key, generation) {
                    Some(make())
                } else {
                    tracing::trace!(key = key.name(), "debounced command superseded");
                    None
                }
            }
        })
    }

    /// Make the pending command for `key`, if any, settle with `None`.
    pub fn cancel(&self, key: &DebounceKey) {
        self.inner.armed.lock().remove(key);
    }

    /// Make every pending command settle with `None`.
    pub fn cancel_all(&self) {
        self.inner.armed.lock().clear();
    }

    /// Whether a command for `key` is waiting out its quiet period.
    pub fn is_pending(&self, key: &DebounceKey) -> bool {
        self.inner.armed.lock().contains_key(key)
    }
}

#[cfg(feature = "http")]
pub use self::http::{fetch_json, fetch_text, FetchError};

#[cfg(feature = "http")]
mod http {
    use serde::de::DeserializeOwned;

    use crate::command::Command;

    /// Why an HTTP command did not produce a body.
    #[derive(Debug, thiserror::Error)]
    pub enum FetchError {
        #[error("request failed: {0}")]
        Request(#[from] reqwest::Error),
        #[error("unexpected status {0}")]
        Status(reqwest::StatusCode),
    }

    async fn send(request: reqwest::RequestBuilder) -> Result<reqwest::Response, FetchError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(FetchError::Status(status))
        }
    }

    /// Send `request` and decode the body as JSON.
    ///
    /// Failures are handed to `make` as `Err`, so the command itself always
    /// settles with an action.
    pub fn fetch_json<T, A, F>(request: reqwest::RequestBuilder, make: F) -> Command<A>
    where
        T: DeserializeOwned + Send + 'static,
        A: Send + 'static,
        F: FnOnce(Result<T, FetchError>) -> A + Send + 'static,
    {
        Command::infallible(move || async move {
            let result = match send(request).await {
                Ok(response) => response.json::<T>().await.map_err(FetchError::from),
                Err(error) => Err(error),
            };
            if let Err(error) = &result {
                tracing::debug!(%error, "fetch_json failed");
            }
            Some(make(result))
        })
    }

    /// Send `request` and read the body as text.
    pub fn fetch_text<A, F>(request: reqwest::RequestBuilder, make: F) -> Command<A>
    where
        A: Send + 'static,
        F: FnOnce(Result<String, FetchError>) -> A + Send + 'static,
    {
        Command::infallible(move || async move {
            let result = match send(request).await {
                Ok(response) => response.text().await.map_err(FetchError::from),
                Err(error) => Err(error),
            };
            Some(make(result))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    enum TestAction {
        Tick,
        Search(&'static str),
        Stamp(i64),
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_waits() {
        let start = tokio::time::Instant::now();

        let settled = delay(Duration::from_millis(300), || TestAction::Tick)
            .invoke()
            .await
            .unwrap();

        assert_eq!(settled, Some(TestAction::Tick));
        assert!(start.elapsed() >= Duration::from_millis(300));
    }

    #[tokio::test]
    async fn test_now_passes_current_time() {
        let before = Utc::now().timestamp();
        let settled = now(|at| TestAction::Stamp(at.timestamp()))
            .invoke()
            .await
            .unwrap();

        match settled {
            Some(TestAction::Stamp(at)) => assert!(at >= before),
            other => panic!("unexpected settlement: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_only_last_fires() {
        let debouncer = Debouncer::new();
        let quiet = Duration::from_millis(200);

        let first = debouncer
            .command("search", quiet, || TestAction::Search("r"))
            .invoke();
        let second = debouncer
            .command("search", quiet, || TestAction::Search("ru"))
            .invoke();
        let third = debouncer
            .command("search", quiet, || TestAction::Search("rus"))
            .invoke();
        assert!(debouncer.is_pending(&DebounceKey::new("search")));

        let (first, second, third) = futures::join!(first, second, third);

        assert_eq!(first.unwrap(), None);
        assert_eq!(second.unwrap(), None);
        assert_eq!(third.unwrap(), Some(TestAction::Search("rus")));
        assert!(!debouncer.is_pending(&DebounceKey::new("search")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_keys_are_independent() {
        let debouncer = Debouncer::new();
        let quiet = Duration::from_millis(50);

        let a = debouncer
            .command("a", quiet, || TestAction::Search("a"))
            .invoke();
        let b = debouncer
            .command("b", quiet, || TestAction::Search("b"))
            .invoke();

        let (a, b) = futures::join!(a, b);
        assert_eq!(a.unwrap(), Some(TestAction::Search("a")));
        assert_eq!(b.unwrap(), Some(TestAction::Search("b")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_claims_key_on_invoke() {
        let debouncer = Debouncer::new();
        let quiet = Duration::from_millis(100);

        // Built first, invoked last: it wins
        let late = debouncer.command("k", quiet, || TestAction::Search("late"));
        let early = debouncer
            .command("k", quiet, || TestAction::Search("early"))
            .invoke();
        let late = late.invoke();

        let (early, late) = futures::join!(early, late);
        assert_eq!(early.unwrap(), None);
        assert_eq!(late.unwrap(), Some(TestAction::Search("late")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_settles_with_none() {
        let debouncer = Debouncer::new();
        let key = DebounceKey::new("save");

        let pending = debouncer
            .command(key.clone(), Duration::from_secs(1), || TestAction::Tick)
            .invoke();
        debouncer.cancel(&key);
        assert!(!debouncer.is_pending(&key));

        assert_eq!(pending.await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_all() {
        let debouncer = Debouncer::new();
        let quiet = Duration::from_millis(10);

        let a = debouncer.command("a", quiet, || TestAction::Tick).invoke();
        let b = debouncer.command("b", quiet, || TestAction::Tick).invoke();
        debouncer.cancel_all();

        let (a, b) = futures::join!(a, b);
        assert_eq!(a.unwrap(), None);
        assert_eq!(b.unwrap(), None);
    }
}
