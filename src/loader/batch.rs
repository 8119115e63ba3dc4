//! Batch Window Module
//!
//! Turns the requests collected in one window into distinct keys plus the
//! waiters interested in each key.

use std::collections::HashMap;
use std::hash::Hash;

use tokio::sync::oneshot;

use crate::error::Result;

/// Channel half used to answer one `load` call.
pub(crate) type Responder<V, E> = oneshot::Sender<Result<V, E>>;

// == Pending Request ==
/// A `load` call waiting for the next dispatch.
pub(crate) struct PendingRequest<K, V, E> {
    pub key: K,
    pub responder: Responder<V, E>,
}

// == Batch ==
/// Distinct keys of a window, in first-requested order.
///
/// `waiters[i]` holds every responder that asked for `keys[i]`, so one value
/// fetched for a duplicated key is broadcast to all of them.
pub(crate) struct Batch<K, V, E> {
    pub keys: Vec<K>,
    pub waiters: Vec<Vec<Responder<V, E>>>,
}

impl<K, V, E> Batch<K, V, E>
where
    K: Hash + Eq + Clone,
{
    pub fn from_window(window: Vec<PendingRequest<K, V, E>>) -> Self {
        let mut index: HashMap<K, usize> = HashMap::with_capacity(window.len());
        let mut keys = Vec::with_capacity(window.len());
        let mut waiters: Vec<Vec<Responder<V, E>>> = Vec::with_capacity(window.len());

        for PendingRequest { key, responder } in window {
            match index.get(&key) {
                Some(&slot) => waiters[slot].push(responder),
                None => {
                    index.insert(key.clone(), keys.len());
                    keys.push(key);
                    waiters.push(vec![responder]);
                }
            }
        }

        Self { keys, waiters }
    }

    /// Splits the batch into chunks of at most `max_size` keys.
    ///
    /// `None` or `Some(0)` keeps a single chunk.
    pub fn split(self, max_size: Option<usize>) -> Vec<Self> {
        let size = match max_size {
            Some(size) if size > 0 && size < self.keys.len() => size,
            _ => return vec![self],
        };

        let mut chunks = Vec::with_capacity(self.keys.len().div_ceil(size));
        let mut keys = self.keys.into_iter();
        let mut waiters = self.waiters.into_iter();
        loop {
            let chunk_keys: Vec<K> = keys.by_ref().take(size).collect();
            if chunk_keys.is_empty() {
                break;
            }
            let chunk_waiters = waiters.by_ref().take(chunk_keys.len()).collect();
            chunks.push(Self {
                keys: chunk_keys,
                waiters: chunk_waiters,
            });
        }
        chunks
    }

    /// Total number of `load` calls this batch answers.
    pub fn request_count(&self) -> usize {
        self.waiters.iter().map(Vec::len).sum()
    }
}
