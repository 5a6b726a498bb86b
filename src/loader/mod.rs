//! Cached data loader
//!
//! This module orchestrates a single asynchronous retrieval: consult the
//! cache store for a fresh entry, fall back to the supplied fetch operation
//! on a miss, write the fresh result back, and expose the outcome as a load
//! state plus optional settle hooks. Cache failures never surface; only
//! fetch failures do.

mod query;

pub use query::QueryKey;

use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

use futures::future::BoxFuture;
use futures::FutureExt;
use serde::{de::DeserializeOwned, Serialize};

use crate::cache::CacheStore;

/// Default freshness window, in milliseconds, for loaders that do not set one
pub const DEFAULT_MAX_AGE_MS: u64 = 84_000;

/// Opaque, cloneable wrapper around whatever error the fetch operation raised
#[derive(Debug, Clone)]
pub struct LoadError(Arc<dyn std::error::Error + Send + Sync>);

impl LoadError {
    /// Wraps a fetch error
    pub fn new<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self(Arc::new(err))
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.0.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// State of a loader across one or more trigger cycles
///
/// A loader starts `Idle`, enters `Loading` when a cycle begins, and settles
/// in exactly one of `Success` or `Error`. A new cycle returns it to
/// `Loading`; no history is kept.
#[derive(Debug, Clone)]
pub enum LoadState<T> {
    /// No cycle has run (or the loader is disabled)
    Idle,
    /// A cycle is in flight
    Loading,
    /// The latest cycle settled with data
    Success(T),
    /// The latest cycle settled with a fetch error
    Error(LoadError),
}

impl<T> LoadState<T> {
    /// True while a cycle is in flight
    pub fn is_fetching(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    /// True when the latest cycle settled with data
    pub fn is_success(&self) -> bool {
        matches!(self, LoadState::Success(_))
    }

    /// True when the latest cycle settled with an error
    pub fn is_error(&self) -> bool {
        matches!(self, LoadState::Error(_))
    }

    /// The settled data, if any
    pub fn data(&self) -> Option<&T> {
        match self {
            LoadState::Success(data) => Some(data),
            _ => None,
        }
    }

    /// The settled error, if any
    pub fn error(&self) -> Option<&LoadError> {
        match self {
            LoadState::Error(err) => Some(err),
            _ => None,
        }
    }
}

type FetchFn<T> = Box<dyn Fn() -> BoxFuture<'static, Result<T, LoadError>> + Send + Sync>;
type SuccessHook<T> = Box<dyn Fn(&T) + Send + Sync>;
type ErrorHook = Box<dyn Fn(&LoadError) + Send + Sync>;

/// Mutable loader state, guarded by one lock so a settling cycle can compare
/// its generation and write its outcome in a single step
struct LoaderInner<T> {
    state: LoadState<T>,
    generation: u64,
    query: QueryKey,
    enabled: bool,
}

/// Loads data for a query, preferring a fresh cached value over a fetch
///
/// Each `trigger()` runs one cycle: cache consult, fetch fallback, cache
/// backfill, settle. Cycles are numbered; a cycle superseded by a newer
/// trigger before it settles writes no state and fires no hooks, so a slow
/// response can never clobber the outcome of a later one.
pub struct Loader<T> {
    fetch: FetchFn<T>,
    store: Option<CacheStore>,
    max_age_ms: u64,
    on_success: Option<SuccessHook<T>>,
    on_error: Option<ErrorHook>,
    inner: Mutex<LoaderInner<T>>,
}

impl<T> Loader<T>
where
    T: Clone + Serialize + DeserializeOwned + Send + 'static,
{
    /// Creates a loader for `query` backed by the given fetch operation.
    ///
    /// The loader starts enabled, with no cache store and the default
    /// freshness window; use the `with_*` methods to change that.
    pub fn new<F, Fut, E>(query: QueryKey, fetch: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: std::error::Error + Send + Sync + 'static,
    {
        let fetch: FetchFn<T> = Box::new(move || {
            let fut = fetch();
            async move { fut.await.map_err(LoadError::new) }.boxed()
        });

        Self {
            fetch,
            store: None,
            max_age_ms: DEFAULT_MAX_AGE_MS,
            on_success: None,
            on_error: None,
            inner: Mutex::new(LoaderInner {
                state: LoadState::Idle,
                generation: 0,
                query,
                enabled: true,
            }),
        }
    }

    /// Sets the cache store; `None` runs every cycle straight to the fetch
    pub fn with_store(mut self, store: Option<CacheStore>) -> Self {
        self.store = store;
        self
    }

    /// Sets the freshness window for cache reads
    pub fn with_max_age_ms(mut self, max_age_ms: u64) -> Self {
        self.max_age_ms = max_age_ms;
        self
    }

    /// Sets whether the loader starts enabled
    #[allow(dead_code)]
    pub fn with_enabled(self, enabled: bool) -> Self {
        self.lock_inner().enabled = enabled;
        self
    }

    /// Registers a hook invoked once per cycle that settles with data
    pub fn on_success(mut self, hook: impl Fn(&T) + Send + Sync + 'static) -> Self {
        self.on_success = Some(Box::new(hook));
        self
    }

    /// Registers a hook invoked once per cycle that settles with an error
    pub fn on_error(mut self, hook: impl Fn(&LoadError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Box::new(hook));
        self
    }

    /// Runs one load cycle.
    ///
    /// Disabled loaders do nothing. Otherwise the cycle enters `Loading`,
    /// consults the store, falls back to the fetch operation on a miss,
    /// backfills the store on a successful fetch, and settles. If a newer
    /// trigger started while this cycle was in flight, its outcome is
    /// discarded when it arrives.
    pub async fn trigger(&self) {
        let (generation, key) = {
            let mut inner = self.lock_inner();
            if !inner.enabled {
                return;
            }
            inner.generation += 1;
            inner.state = LoadState::Loading;
            (inner.generation, inner.query.cache_key())
        };

        if let Some(store) = &self.store {
            if let Some(cached) = store.get::<T>(&key, self.max_age_ms) {
                self.settle(generation, Ok(cached));
                return;
            }
        }

        match (self.fetch)().await {
            Ok(fresh) => {
                if let Some(store) = &self.store {
                    let _ = store.put(&key, &fresh);
                }
                self.settle(generation, Ok(fresh));
            }
            Err(err) => self.settle(generation, Err(err)),
        }
    }

    /// Enables or disables the loader.
    ///
    /// Turning a disabled loader on runs a fresh cycle; turning it off only
    /// prevents future cycles and leaves the current state in place.
    #[allow(dead_code)]
    pub async fn set_enabled(&self, enabled: bool) {
        let should_trigger = {
            let mut inner = self.lock_inner();
            let was_enabled = inner.enabled;
            inner.enabled = enabled;
            enabled && !was_enabled
        };
        if should_trigger {
            self.trigger().await;
        }
    }

    /// Points the loader at a different query.
    ///
    /// A changed query runs a fresh cycle immediately (when enabled),
    /// superseding any cycle still in flight. Setting the same query again
    /// is a no-op.
    #[allow(dead_code)]
    pub async fn set_query(&self, query: QueryKey) {
        let should_trigger = {
            let mut inner = self.lock_inner();
            if inner.query == query {
                false
            } else {
                inner.query = query;
                inner.enabled
            }
        };
        if should_trigger {
            self.trigger().await;
        }
    }

    /// Records the outcome of cycle `generation` unless it was superseded
    fn settle(&self, generation: u64, result: Result<T, LoadError>) {
        {
            let mut inner = self.lock_inner();
            if generation != inner.generation {
                return;
            }
            inner.state = match &result {
                Ok(data) => LoadState::Success(data.clone()),
                Err(err) => LoadState::Error(err.clone()),
            };
        }

        // Hooks run after the state update, outside the lock
        match result {
            Ok(data) => {
                if let Some(hook) = &self.on_success {
                    hook(&data);
                }
            }
            Err(err) => {
                if let Some(hook) = &self.on_error {
                    hook(&err);
                }
            }
        }
    }

    /// Snapshot of the current load state
    #[allow(dead_code)]
    pub fn state(&self) -> LoadState<T> {
        self.lock_inner().state.clone()
    }

    /// The settled data, if the latest cycle succeeded
    #[allow(dead_code)]
    pub fn data(&self) -> Option<T> {
        self.lock_inner().state.data().cloned()
    }

    /// The settled error, if the latest cycle failed
    #[allow(dead_code)]
    pub fn error(&self) -> Option<LoadError> {
        self.lock_inner().state.error().cloned()
    }

    /// True while a cycle is in flight
    pub fn is_fetching(&self) -> bool {
        self.lock_inner().state.is_fetching()
    }

    /// True when the latest cycle settled with data
    #[allow(dead_code)]
    pub fn is_success(&self) -> bool {
        self.lock_inner().state.is_success()
    }

    /// True when the latest cycle settled with an error
    #[allow(dead_code)]
    pub fn is_error(&self) -> bool {
        self.lock_inner().state.is_error()
    }

    fn lock_inner(&self) -> MutexGuard<'_, LoaderInner<T>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;
    use thiserror::Error;
    use tokio::sync::Notify;

    #[derive(Debug, Error)]
    #[error("fetch failed: {0}")]
    struct FakeFetchError(String);

    fn members_query() -> QueryKey {
        QueryKey::new("team-members").with_part("users")
    }

    fn create_test_store() -> (CacheStore, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = CacheStore::with_dir(temp_dir.path().to_path_buf());
        (store, temp_dir)
    }

    #[test]
    fn test_load_state_flags_mirror_state() {
        let idle: LoadState<Vec<String>> = LoadState::Idle;
        assert!(!idle.is_fetching() && !idle.is_success() && !idle.is_error());

        let loading: LoadState<Vec<String>> = LoadState::Loading;
        assert!(loading.is_fetching() && !loading.is_success() && !loading.is_error());

        let success = LoadState::Success(vec!["a".to_string()]);
        assert!(!success.is_fetching() && success.is_success() && !success.is_error());
        assert_eq!(success.data(), Some(&vec!["a".to_string()]));

        let error: LoadState<Vec<String>> =
            LoadState::Error(LoadError::new(FakeFetchError("boom".to_string())));
        assert!(!error.is_fetching() && !error.is_success() && error.is_error());
        assert!(error.error().is_some());
    }

    #[test]
    fn test_load_error_preserves_message_and_source() {
        let err = LoadError::new(FakeFetchError("boom".to_string()));
        assert_eq!(err.to_string(), "fetch failed: boom");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[tokio::test]
    async fn test_cache_hit_skips_fetch() {
        let (store, _temp_dir) = create_test_store();
        let query = members_query();
        let cached = vec!["cached".to_string()];
        store
            .put(&query.cache_key(), &cached)
            .expect("Seeding the cache should succeed");

        let fetch_calls = Arc::new(AtomicUsize::new(0));
        let successes: Arc<Mutex<Vec<Vec<String>>>> = Arc::new(Mutex::new(Vec::new()));

        let loader = {
            let fetch_calls = Arc::clone(&fetch_calls);
            let successes = Arc::clone(&successes);
            Loader::new(query, move || {
                fetch_calls.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, FakeFetchError>(vec!["fresh".to_string()]) }
            })
            .with_store(Some(store))
            .with_max_age_ms(60_000)
            .on_success(move |data: &Vec<String>| successes.lock().unwrap().push(data.clone()))
        };

        loader.trigger().await;

        assert_eq!(fetch_calls.load(Ordering::SeqCst), 0, "Fresh hit should not fetch");
        assert!(loader.is_success());
        assert!(!loader.is_fetching());
        assert_eq!(loader.data(), Some(cached.clone()));
        assert_eq!(successes.lock().unwrap().as_slice(), &[cached]);
    }

    #[tokio::test]
    async fn test_cache_miss_fetches_once_and_backfills() {
        let (store, _temp_dir) = create_test_store();
        let query = members_query();
        let key = query.cache_key();

        let fetch_calls = Arc::new(AtomicUsize::new(0));
        let loader = {
            let fetch_calls = Arc::clone(&fetch_calls);
            Loader::new(query, move || {
                fetch_calls.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, FakeFetchError>(vec!["fresh".to_string()]) }
            })
            .with_store(Some(store.clone()))
            .with_max_age_ms(60_000)
        };

        loader.trigger().await;

        assert_eq!(fetch_calls.load(Ordering::SeqCst), 1);
        assert_eq!(loader.data(), Some(vec!["fresh".to_string()]));

        let backfilled: Vec<String> = store
            .get(&key, 60_000)
            .expect("Fetched data should be written back");
        assert_eq!(backfilled, vec!["fresh".to_string()]);
    }

    #[tokio::test]
    async fn test_expired_entry_falls_through_to_fetch() {
        let (store, _temp_dir) = create_test_store();
        let query = members_query();
        store
            .put(&query.cache_key(), &vec!["stale".to_string()])
            .expect("Seeding the cache should succeed");

        let fetch_calls = Arc::new(AtomicUsize::new(0));
        let loader = {
            let fetch_calls = Arc::clone(&fetch_calls);
            Loader::new(query, move || {
                fetch_calls.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, FakeFetchError>(vec!["fresh".to_string()]) }
            })
            .with_store(Some(store))
            // Zero-width window: any entry is already stale
            .with_max_age_ms(0)
        };

        loader.trigger().await;

        assert_eq!(fetch_calls.load(Ordering::SeqCst), 1);
        assert_eq!(loader.data(), Some(vec!["fresh".to_string()]));
    }

    #[tokio::test]
    async fn test_fetch_error_surfaces_and_skips_cache_write() {
        let (store, _temp_dir) = create_test_store();
        let query = members_query();
        let key = query.cache_key();

        let errors: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let loader = {
            let errors = Arc::clone(&errors);
            Loader::<Vec<String>>::new(query, move || async {
                Err::<Vec<String>, _>(FakeFetchError("boom".to_string()))
            })
            .with_store(Some(store.clone()))
            .with_max_age_ms(60_000)
            .on_error(move |err: &LoadError| errors.lock().unwrap().push(err.to_string()))
        };

        loader.trigger().await;

        assert!(loader.is_error());
        assert!(loader.data().is_none());
        assert_eq!(
            loader.error().map(|e| e.to_string()),
            Some("fetch failed: boom".to_string())
        );
        assert_eq!(errors.lock().unwrap().as_slice(), &["fetch failed: boom".to_string()]);

        let entry: Option<Vec<String>> = store.get(&key, 60_000);
        assert!(entry.is_none(), "Failed fetches must not be cached");
    }

    #[tokio::test]
    async fn test_no_store_still_loads() {
        let loader = Loader::new(members_query(), || async {
            Ok::<_, FakeFetchError>(vec!["fresh".to_string()])
        });

        loader.trigger().await;

        assert_eq!(loader.data(), Some(vec!["fresh".to_string()]));
    }

    #[tokio::test]
    async fn test_unreadable_store_degrades_to_fetch() {
        // A store rooted under a regular file fails every read and write
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").expect("Failed to write blocker file");
        let store = CacheStore::with_dir(blocker.join("cache"));

        let fetch_calls = Arc::new(AtomicUsize::new(0));
        let loader = {
            let fetch_calls = Arc::clone(&fetch_calls);
            Loader::new(members_query(), move || {
                fetch_calls.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, FakeFetchError>(vec!["fresh".to_string()]) }
            })
            .with_store(Some(store))
            .with_max_age_ms(60_000)
        };

        loader.trigger().await;

        assert_eq!(fetch_calls.load(Ordering::SeqCst), 1);
        assert!(loader.is_success());
        assert_eq!(loader.data(), Some(vec!["fresh".to_string()]));
    }

    #[tokio::test]
    async fn test_disabled_loader_stays_idle() {
        let fetch_calls = Arc::new(AtomicUsize::new(0));
        let loader = {
            let fetch_calls = Arc::clone(&fetch_calls);
            Loader::new(members_query(), move || {
                fetch_calls.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, FakeFetchError>(vec!["fresh".to_string()]) }
            })
            .with_enabled(false)
        };

        loader.trigger().await;

        assert!(matches!(loader.state(), LoadState::Idle));
        assert_eq!(fetch_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_enabling_runs_a_cycle() {
        let fetch_calls = Arc::new(AtomicUsize::new(0));
        let loader = {
            let fetch_calls = Arc::clone(&fetch_calls);
            Loader::new(members_query(), move || {
                fetch_calls.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, FakeFetchError>(vec!["fresh".to_string()]) }
            })
            .with_enabled(false)
        };

        loader.set_enabled(true).await;
        assert_eq!(fetch_calls.load(Ordering::SeqCst), 1);
        assert!(loader.is_success());

        // Already enabled: no new cycle
        loader.set_enabled(true).await;
        assert_eq!(fetch_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_query_change_retriggers_same_query_does_not() {
        let fetch_calls = Arc::new(AtomicUsize::new(0));
        let loader = {
            let fetch_calls = Arc::clone(&fetch_calls);
            Loader::new(members_query(), move || {
                fetch_calls.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, FakeFetchError>(vec!["fresh".to_string()]) }
            })
        };

        loader.trigger().await;
        assert_eq!(fetch_calls.load(Ordering::SeqCst), 1);

        loader.set_query(members_query()).await;
        assert_eq!(fetch_calls.load(Ordering::SeqCst), 1, "Same query is a no-op");

        loader
            .set_query(QueryKey::new("team-members").with_part("admins"))
            .await;
        assert_eq!(fetch_calls.load(Ordering::SeqCst), 2, "Changed query reloads");
    }

    #[tokio::test]
    async fn test_hooks_fire_once_per_settled_cycle() {
        let successes: Arc<Mutex<Vec<Vec<String>>>> = Arc::new(Mutex::new(Vec::new()));
        let loader = {
            let successes = Arc::clone(&successes);
            Loader::new(members_query(), || async {
                Ok::<_, FakeFetchError>(vec!["fresh".to_string()])
            })
            .on_success(move |data: &Vec<String>| successes.lock().unwrap().push(data.clone()))
        };

        loader.trigger().await;
        loader.trigger().await;

        assert_eq!(successes.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_superseded_cycle_never_settles() {
        let gate = Arc::new(Notify::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let successes: Arc<Mutex<Vec<Vec<String>>>> = Arc::new(Mutex::new(Vec::new()));

        let loader = {
            let gate = Arc::clone(&gate);
            let calls = Arc::clone(&calls);
            let successes = Arc::clone(&successes);
            Arc::new(
                Loader::new(QueryKey::new("team-members").with_part("v1"), move || {
                    let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
                    let gate = Arc::clone(&gate);
                    async move {
                        if call == 1 {
                            // Hold the first cycle until the test releases it
                            gate.notified().await;
                            Ok::<_, FakeFetchError>(vec!["first".to_string()])
                        } else {
                            Ok(vec!["second".to_string()])
                        }
                    }
                })
                .on_success(move |data: &Vec<String>| successes.lock().unwrap().push(data.clone())),
            )
        };

        let first_cycle = {
            let loader = Arc::clone(&loader);
            tokio::spawn(async move { loader.trigger().await })
        };

        // Wait until the first cycle is parked inside its fetch
        while calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
        assert!(loader.is_fetching());

        loader
            .set_query(QueryKey::new("team-members").with_part("v2"))
            .await;
        assert_eq!(loader.data(), Some(vec!["second".to_string()]));

        // Release the first fetch; its late result must be discarded
        gate.notify_one();
        first_cycle.await.expect("First cycle task should finish");

        assert_eq!(loader.data(), Some(vec!["second".to_string()]));
        assert_eq!(
            successes.lock().unwrap().as_slice(),
            &[vec!["second".to_string()]],
            "Only the superseding cycle may fire hooks"
        );
    }
}
