//! Batch Loader Module
//!
//! Coalesces single-key lookups issued within one scheduling turn into one
//! call of a caller-supplied bulk fetch function.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::future::{join_all, BoxFuture, FutureExt};
use tokio::sync::oneshot;
use tracing::{debug, warn};

use super::batch::{Batch, PendingRequest, Responder};
use super::stats::LoaderStats;
use crate::error::{LoadError, Result};

type BatchFn<K, V, E> =
    dyn Fn(Vec<K>) -> BoxFuture<'static, std::result::Result<Vec<V>, E>> + Send + Sync;

// == Loader Options ==
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoaderOptions {
    /// How long a window stays open after its first request.
    /// `Duration::ZERO` dispatches on the next scheduler turn.
    pub batch_delay: Duration,
    /// Upper bound on keys per batch function call; larger windows are split
    /// into several calls that run concurrently
    pub max_batch_size: Option<usize>,
    /// Keep resolved values for later `load` calls
    pub cache_enabled: bool,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            batch_delay: Duration::ZERO,
            max_batch_size: None,
            cache_enabled: true,
        }
    }
}

struct LoaderState<K, V, E> {
    /// Requests of the currently open window
    window: Vec<PendingRequest<K, V, E>>,
    /// Whether a dispatch task is already scheduled for `window`
    scheduled: bool,
    cache: HashMap<K, V>,
    stats: LoaderStats,
}

struct LoaderInner<K, V, E> {
    batch_fn: Box<BatchFn<K, V, E>>,
    options: LoaderOptions,
    state: Mutex<LoaderState<K, V, E>>,
}

impl<K, V, E> LoaderInner<K, V, E> {
    // The lock is never held across an await, and nothing inside it panics
    // while the state is half-updated, so a poisoned guard is still usable.
    fn lock_state(&self) -> MutexGuard<'_, LoaderState<K, V, E>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

enum Ticket<V, E> {
    Ready(V),
    Pending(oneshot::Receiver<Result<V, E>>),
}

impl<V, E> Ticket<V, E> {
    async fn resolve(self) -> Result<V, E> {
        match self {
            Ticket::Ready(value) => Ok(value),
            Ticket::Pending(receiver) => receiver.await.unwrap_or(Err(LoadError::Cancelled)),
        }
    }
}

// == Batch Loader ==
/// Request coalescer over a bulk fetch function.
///
/// Every [`load`](Self::load) that misses the loader cache joins the open
/// batch window. The first request of a window schedules a dispatch task on
/// the current Tokio runtime; when it runs, the window is taken atomically,
/// duplicate keys are collapsed, and the batch function is called once with
/// the distinct keys. Values are matched to keys by position, cached, and
/// broadcast to every waiter. A failure is delivered to every waiter of the
/// window and nothing is cached.
///
/// The batch function must return exactly one value per key, in key order.
/// A result of the wrong length rejects the whole window with
/// [`LoadError::MisalignedBatch`] instead of assigning values to the wrong
/// callers. A batch function that panics rejects its window with
/// [`LoadError::Cancelled`] and counts as a failure.
///
/// Windows are only as wide as a scheduler turn. On a multi-threaded runtime
/// the dispatch task may start on another worker while the caller is still
/// issuing loads; late keys then simply open the next window. Set
/// [`LoaderOptions::batch_delay`] to widen the window, or call
/// [`dispatch`](Self::dispatch) explicitly.
///
/// Cloning is cheap and clones share the window and cache. Separate loaders
/// never share anything.
pub struct BatchLoader<K, V, E> {
    inner: Arc<LoaderInner<K, V, E>>,
}

impl<K, V, E> Clone for BatchLoader<K, V, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V, E> BatchLoader<K, V, E>
where
    K: Hash + Eq + Clone + Send + 'static,
    V: Clone + Send + 'static,
    E: fmt::Display + Send + Sync + 'static,
{
    // == Constructors ==
    /// Creates a loader with default options.
    ///
    /// # Arguments
    /// * `batch_fn` - Fetches values for a list of distinct keys; `result[i]`
    ///   must belong to `keys[i]`
    pub fn new<F, Fut>(batch_fn: F) -> Self
    where
        F: Fn(Vec<K>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<Vec<V>, E>> + Send + 'static,
    {
        Self::with_options(batch_fn, LoaderOptions::default())
    }

    pub fn with_options<F, Fut>(batch_fn: F, options: LoaderOptions) -> Self
    where
        F: Fn(Vec<K>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<Vec<V>, E>> + Send + 'static,
    {
        let boxed: Box<BatchFn<K, V, E>> =
            Box::new(move |keys: Vec<K>| batch_fn(keys).boxed());
        Self {
            inner: Arc::new(LoaderInner {
                batch_fn: boxed,
                options,
                state: Mutex::new(LoaderState {
                    window: Vec::new(),
                    scheduled: false,
                    cache: HashMap::new(),
                    stats: LoaderStats::default(),
                }),
            }),
        }
    }

    // == Load ==
    /// Loads the value for one key.
    ///
    /// The request joins the open window when this method is called, not when
    /// the returned future is first polled, so a burst of `load` calls made
    /// before awaiting any of them lands in a single batch. A cached key
    /// resolves immediately and never joins a window.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime and the key misses the
    /// cache, since the first miss of a window spawns the dispatch task.
    pub fn load(&self, key: K) -> impl Future<Output = Result<V, E>> + Send + 'static {
        let ticket = self.enqueue(key);
        ticket.resolve()
    }

    // == Load Many ==
    /// Loads several keys in one window and returns their values in input
    /// order. Fails with the first error encountered.
    ///
    /// # Panics
    ///
    /// Same as [`load`](Self::load): a miss outside a Tokio runtime panics.
    pub fn load_many<I>(&self, keys: I) -> impl Future<Output = Result<Vec<V>, E>> + Send + 'static
    where
        I: IntoIterator<Item = K>,
    {
        let tickets: Vec<Ticket<V, E>> = keys.into_iter().map(|key| self.enqueue(key)).collect();
        Self::resolve_all(tickets)
    }

    fn resolve_all(
        tickets: Vec<Ticket<V, E>>,
    ) -> impl Future<Output = Result<Vec<V>, E>> + Send + 'static {
        async move {
            let mut values = Vec::with_capacity(tickets.len());
            for ticket in tickets {
                values.push(ticket.resolve().await?);
            }
            Ok(values)
        }
    }

    // == Prime ==
    /// Seeds the cache with a known value. Existing entries are kept.
    ///
    /// Returns whether the value was stored; always `false` when caching is
    /// disabled.
    pub fn prime(&self, key: K, value: V) -> bool {
        if !self.inner.options.cache_enabled {
            return false;
        }
        let mut state = self.inner.lock_state();
        if state.cache.contains_key(&key) {
            return false;
        }
        state.cache.insert(key, value);
        true
    }

    // == Clear ==
    /// Forgets one cached key. In-flight requests are unaffected.
    pub fn clear(&self, key: &K) -> bool {
        self.inner.lock_state().cache.remove(key).is_some()
    }

    /// Empties the loader cache. In-flight requests are unaffected; a batch
    /// still running when this is called caches its values once it completes.
    pub fn clear_cache(&self) {
        self.inner.lock_state().cache.clear();
    }

    pub fn stats(&self) -> LoaderStats {
        self.inner.lock_state().stats.clone()
    }

    /// Requests waiting in the open window.
    pub fn pending_count(&self) -> usize {
        self.inner.lock_state().window.len()
    }

    pub fn cached_count(&self) -> usize {
        self.inner.lock_state().cache.len()
    }

    pub fn options(&self) -> LoaderOptions {
        self.inner.options
    }

    // == Dispatch ==
    /// Flushes the open window now.
    ///
    /// Takes the window and clears the scheduled flag in one step, so loads
    /// issued while the batch function runs open a fresh window. Does nothing
    /// when the window is empty. The scheduled dispatch task calls this; hosts
    /// that prefer an explicit flush per request cycle may call it directly.
    pub async fn dispatch(&self) {
        let window = {
            let mut state = self.inner.lock_state();
            state.scheduled = false;
            std::mem::take(&mut state.window)
        };
        if window.is_empty() {
            return;
        }

        let batch = Batch::from_window(window);
        debug!(
            requests = batch.request_count(),
            keys = batch.keys.len(),
            "Dispatching batch window"
        );

        let chunks = batch.split(self.inner.options.max_batch_size);
        join_all(chunks.into_iter().map(|chunk| self.run_batch(chunk))).await;
    }

    fn enqueue(&self, key: K) -> Ticket<V, E> {
        let mut state = self.inner.lock_state();
        state.stats.loads += 1;

        if self.inner.options.cache_enabled {
            if let Some(value) = state.cache.get(&key).cloned() {
                state.stats.cache_hits += 1;
                return Ticket::Ready(value);
            }
        }

        let (responder, receiver) = oneshot::channel();
        state.window.push(PendingRequest { key, responder });
        let needs_schedule = !state.scheduled;
        state.scheduled = true;
        drop(state);

        if needs_schedule {
            self.schedule_dispatch();
        }
        Ticket::Pending(receiver)
    }

    fn schedule_dispatch(&self) {
        let loader = self.clone();
        let delay = self.inner.options.batch_delay;

        tokio::spawn(async move {
            if delay.is_zero() {
                tokio::task::yield_now().await;
            } else {
                tokio::time::sleep(delay).await;
            }
            loader.dispatch().await;
        });
    }

    async fn run_batch(&self, batch: Batch<K, V, E>) {
        let Batch { keys, waiters } = batch;
        let expected = keys.len();

        self.inner.lock_state().stats.record_dispatch(expected);
        let batch_fn = &self.inner.batch_fn;
        let request = keys.clone();
        let outcome = AssertUnwindSafe(async move { batch_fn(request).await })
            .catch_unwind()
            .await;

        let values = match outcome {
            Ok(Ok(values)) if values.len() == expected => values,
            Ok(Ok(values)) => {
                warn!(
                    expected,
                    actual = values.len(),
                    "Batch function returned misaligned results"
                );
                self.fail(
                    waiters,
                    LoadError::MisalignedBatch {
                        expected,
                        actual: values.len(),
                    },
                );
                return;
            }
            Ok(Err(err)) => {
                warn!(keys = expected, error = %err, "Batch function failed");
                self.fail(waiters, LoadError::Batch(Arc::new(err)));
                return;
            }
            Err(_) => {
                warn!(keys = expected, "Batch function panicked");
                self.fail(waiters, LoadError::Cancelled);
                return;
            }
        };

        if self.inner.options.cache_enabled {
            let mut state = self.inner.lock_state();
            for (key, value) in keys.into_iter().zip(values.iter()) {
                state.cache.insert(key, value.clone());
            }
        }

        for (value, responders) in values.into_iter().zip(waiters) {
            for responder in responders {
                // A dropped receiver means the caller stopped waiting
                let _ = responder.send(Ok(value.clone()));
            }
        }
    }

    fn fail(&self, waiters: Vec<Vec<Responder<V, E>>>, error: LoadError<E>) {
        self.inner.lock_state().stats.failures += 1;
        for responder in waiters.into_iter().flatten() {
            let _ = responder.send(Err(error.clone()));
        }
    }
}
