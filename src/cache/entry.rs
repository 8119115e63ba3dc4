//! Cache Entry Module
//!
//! Defines a single cached value together with its expiry instant.

use std::time::Duration;

use tokio::time::Instant;

/// Lifetime given to entries whose TTL would overflow the clock.
const FAR_FUTURE: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

// == Cache Entry ==
/// A cached value and the instant after which it must no longer be served.
///
/// Instants come from `tokio::time`, so a paused test clock drives expiry
/// exactly like wall-clock time does in production.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Last instant at which the entry is still fresh
    pub expires_at: Instant,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates an entry that stays fresh for `ttl` from now.
    ///
    /// A `ttl` too large for the clock is capped at roughly a century, so the
    /// entry effectively never expires.
    pub fn new(value: V, ttl: Duration) -> Self {
        let now = Instant::now();
        let expires_at = now
            .checked_add(ttl)
            .or_else(|| now.checked_add(FAR_FUTURE))
            .unwrap_or(now);
        Self { value, expires_at }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// Boundary condition: an entry is expired only once the current time is
    /// strictly past `expires_at`. At exactly `write time + ttl` it is still
    /// served.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    /// Same as [`CacheEntry::is_expired`] against an explicit instant.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now > self.expires_at
    }

    // == Time To Live ==
    /// Returns the remaining lifetime, `Duration::ZERO` once expired.
    pub fn ttl_remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    #[tokio::test(start_paused = true)]
    async fn test_entry_creation() {
        let now = Instant::now();
        let entry = CacheEntry::new("test_value", Duration::from_secs(60));

        assert_eq!(entry.value, "test_value");
        assert_eq!(entry.expires_at - now, Duration::from_secs(60));
        assert!(!entry.is_expired());
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expiration() {
        let entry = CacheEntry::new("test_value", Duration::from_secs(1));

        assert!(!entry.is_expired());

        advance(Duration::from_millis(1100)).await;

        assert!(entry.is_expired());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiration_boundary_condition() {
        let entry = CacheEntry::new(7u32, Duration::from_secs(5));

        // Still fresh at exactly the expiry instant
        advance(Duration::from_secs(5)).await;
        assert!(!entry.is_expired(), "Entry should be fresh at the boundary");

        advance(Duration::from_millis(1)).await;
        assert!(entry.is_expired(), "Entry should expire right after the boundary");
    }

    #[tokio::test(start_paused = true)]
    async fn test_ttl_remaining() {
        let entry = CacheEntry::new((), Duration::from_secs(10));

        advance(Duration::from_secs(4)).await;
        assert_eq!(entry.ttl_remaining(), Duration::from_secs(6));

        advance(Duration::from_secs(20)).await;
        assert_eq!(entry.ttl_remaining(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_ttl_does_not_overflow() {
        let now = Instant::now();
        let entry = CacheEntry::new("forever", Duration::MAX);

        assert_eq!(entry.expires_at - now, FAR_FUTURE);
        assert!(!entry.is_expired());

        advance(Duration::from_secs(365 * 24 * 60 * 60)).await;
        assert!(!entry.is_expired());
        assert_eq!(
            entry.ttl_remaining(),
            FAR_FUTURE - Duration::from_secs(365 * 24 * 60 * 60)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_ttl_expires_on_next_tick() {
        let now = Instant::now();
        let entry = CacheEntry::new("x", Duration::ZERO);

        assert!(!entry.is_expired_at(now));
        assert!(entry.is_expired_at(now + Duration::from_nanos(1)));
    }
}
