//! LRU Tracker Module
//!
//! Access-order bookkeeping for caches created with a capacity bound.

use std::collections::VecDeque;

// == LRU Tracker ==
/// Tracks access order for LRU eviction.
///
/// Keys are stored in a VecDeque where:
/// - Front = Most recently used
/// - Back = Least recently used
#[derive(Debug)]
pub struct LruTracker<K> {
    order: VecDeque<K>,
}

impl<K> Default for LruTracker<K> {
    fn default() -> Self {
        Self {
            order: VecDeque::new(),
        }
    }
}

impl<K: Eq + Clone> LruTracker<K> {
    /// Creates a new empty LRU tracker.
    pub fn new() -> Self {
        Self::default()
    }

    // == Touch ==
    /// Marks a key as most recently used.
    pub fn touch(&mut self, key: &K) {
        self.remove(key);
        self.order.push_front(key.clone());
    }

    // == Remove ==
    pub fn remove(&mut self, key: &K) {
        self.order.retain(|k| k != key);
    }

    // == Evict Oldest ==
    /// Returns and removes the least recently used key.
    pub fn evict_oldest(&mut self) -> Option<K> {
        self.order.pop_back()
    }

    pub fn clear(&mut self) {
        self.order.clear();
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lru_new() {
        let mut lru: LruTracker<u32> = LruTracker::new();
        assert_eq!(lru.evict_oldest(), None);
    }

    #[test]
    fn test_lru_touch_existing_key() {
        let mut lru = LruTracker::new();

        lru.touch(&"key1");
        lru.touch(&"key2");
        lru.touch(&"key3");
        lru.touch(&"key1");

        // No duplicate left behind by the second touch
        assert_eq!(lru.evict_oldest(), Some("key2"));
        assert_eq!(lru.evict_oldest(), Some("key3"));
        assert_eq!(lru.evict_oldest(), Some("key1"));
        assert_eq!(lru.evict_oldest(), None);
    }

    #[test]
    fn test_lru_evict_order() {
        let mut lru = LruTracker::new();

        // touch(a): [a], touch(b): [b, a], touch(c): [c, b, a]
        // touch(a): [a, c, b], touch(c): [c, a, b], touch(b): [b, c, a]
        for key in [1, 2, 3, 1, 3, 2] {
            lru.touch(&key);
        }

        assert_eq!(lru.evict_oldest(), Some(1));
        assert_eq!(lru.evict_oldest(), Some(3));
        assert_eq!(lru.evict_oldest(), Some(2));
        assert_eq!(lru.evict_oldest(), None);
    }

    #[test]
    fn test_lru_remove_and_clear() {
        let mut lru = LruTracker::new();

        lru.touch(&(1, "a"));
        lru.touch(&(2, "b"));
        lru.remove(&(1, "a"));
        lru.remove(&(9, "missing"));

        assert_eq!(lru.evict_oldest(), Some((2, "b")));
        assert_eq!(lru.evict_oldest(), None);

        lru.touch(&(3, "c"));
        lru.clear();
        assert_eq!(lru.evict_oldest(), None);
    }
}
