//! TTL Purge Task
//!
//! Optional background task that periodically drops expired cache entries.
//! Reads never depend on it; it only bounds memory in long-lived processes.

use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::TtlCache;

/// Spawns a task that calls [`TtlCache::purge_expired`] every `interval`.
///
/// The returned handle should be aborted on shutdown.
///
/// # Example
/// ```ignore
/// let query = create_cached_query(fetch_course_count, 300);
/// let purge_handle = spawn_purge_task(query.cache(), Duration::from_secs(60));
/// // Later, during shutdown:
/// purge_handle.abort();
/// ```
pub fn spawn_purge_task<K, V>(cache: Arc<RwLock<TtlCache<K, V>>>, interval: Duration) -> JoinHandle<()>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    tokio::spawn(async move {
        info!(interval_ms = interval.as_millis() as u64, "Starting TTL purge task");

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.write().await.purge_expired();

            if removed > 0 {
                info!("TTL purge: removed {} expired entries", removed);
            } else {
                debug!("TTL purge: no expired entries found");
            }
        }
    })
}
