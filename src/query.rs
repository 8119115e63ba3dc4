//! Cached Query Module
//!
//! Wraps an arbitrary async query so identical argument tuples are served
//! from a [`TtlCache`] until their entry expires.

use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use tokio::sync::RwLock;
use tracing::debug;

use crate::cache::{CacheOptions, CacheStats, TtlCache};

type QueryFn<A, R, E> = dyn Fn(A) -> BoxFuture<'static, Result<R, E>> + Send + Sync;

// == Cached Query ==
/// An async function memoized per argument tuple for a fixed TTL.
///
/// The cache key is the whole argument value `A`, typically a tuple, so
/// `(1, 2)` and `(2, 1)` are distinct keys. Errors are handed back to the
/// caller and never cached; the next call with the same arguments runs the
/// function again.
///
/// Two concurrent calls that both miss run the function twice; the later
/// result overwrites the earlier one.
pub struct CachedQuery<A, R, E> {
    func: Arc<QueryFn<A, R, E>>,
    cache: Arc<RwLock<TtlCache<A, R>>>,
}

impl<A, R, E> Clone for CachedQuery<A, R, E> {
    fn clone(&self) -> Self {
        Self {
            func: Arc::clone(&self.func),
            cache: Arc::clone(&self.cache),
        }
    }
}

/// Wraps `func` with a cache whose entries live for `ttl_seconds`.
///
/// # Example
/// ```ignore
/// let course_count = create_cached_query(
///     |(tenant_id, published): (u64, bool)| async move { repo.count(tenant_id, published).await },
///     300,
/// );
/// let total = course_count.call((42, true)).await?;
/// ```
pub fn create_cached_query<A, R, E, F, Fut>(func: F, ttl_seconds: u64) -> CachedQuery<A, R, E>
where
    A: Hash + Eq + Clone + Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
    E: Send + 'static,
    F: Fn(A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
{
    CachedQuery::with_options(
        func,
        CacheOptions {
            ttl_seconds,
            max_entries: None,
        },
    )
}

impl<A, R, E> CachedQuery<A, R, E>
where
    A: Hash + Eq + Clone + Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
    E: Send + 'static,
{
    pub fn with_options<F, Fut>(func: F, options: CacheOptions) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, E>> + Send + 'static,
    {
        let boxed: Arc<QueryFn<A, R, E>> = Arc::new(move |args: A| func(args).boxed());
        Self {
            func: boxed,
            cache: Arc::new(RwLock::new(TtlCache::with_options(options))),
        }
    }

    // == Call ==
    /// Runs the query, or returns the cached result for these arguments.
    pub async fn call(&self, args: A) -> Result<R, E> {
        // Write lock: a lookup may evict an expired entry and updates stats
        let cached = self.cache.write().await.get(&args);
        if let Some(value) = cached {
            return Ok(value);
        }

        debug!("Cached query miss, running query");
        let value = (self.func)(args.clone()).await?;
        self.cache.write().await.set(args, value.clone());
        Ok(value)
    }

    /// Drops the cached result for one argument tuple.
    pub async fn invalidate(&self, args: &A) -> bool {
        self.cache.write().await.delete(args)
    }

    pub async fn clear(&self) {
        self.cache.write().await.clear();
    }

    pub async fn stats(&self) -> CacheStats {
        self.cache.read().await.stats()
    }

    /// Shared handle to the underlying cache, e.g. for
    /// [`spawn_purge_task`](crate::tasks::spawn_purge_task).
    pub fn cache(&self) -> Arc<RwLock<TtlCache<A, R>>> {
        Arc::clone(&self.cache)
    }
}
