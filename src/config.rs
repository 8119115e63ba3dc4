//! Configuration Module
//!
//! Loads data-access tuning knobs from environment variables.

use std::env;
use std::time::Duration;

use crate::cache::CacheOptions;
use crate::loader::LoaderOptions;

/// Default lifetime of cached query results, in seconds.
pub const DEFAULT_QUERY_CACHE_TTL: u64 = 300;

/// Default interval between background purge sweeps, in seconds.
pub const DEFAULT_PURGE_INTERVAL: u64 = 60;

/// Data-access configuration.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// TTL in seconds for cached query results
    pub query_cache_ttl: u64,
    /// Optional upper bound on cached query results
    pub query_cache_max_entries: Option<usize>,
    /// How long a batch window stays open; 0 means a single scheduler turn
    pub batch_delay_ms: u64,
    /// Optional upper bound on keys per batch function call
    pub max_batch_size: Option<usize>,
    /// Interval in seconds between background purge sweeps
    pub purge_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `QUERY_CACHE_TTL` - Query cache TTL in seconds (default: 300)
    /// - `QUERY_CACHE_MAX_ENTRIES` - Query cache capacity (default: unbounded)
    /// - `BATCH_DELAY_MS` - Batch window length in milliseconds (default: 0)
    /// - `MAX_BATCH_SIZE` - Keys per batch call (default: unbounded)
    /// - `PURGE_INTERVAL` - Purge sweep frequency in seconds (default: 60)
    ///
    /// Unparseable values fall back to the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            query_cache_ttl: parse_var("QUERY_CACHE_TTL").unwrap_or(defaults.query_cache_ttl),
            query_cache_max_entries: parse_var("QUERY_CACHE_MAX_ENTRIES"),
            batch_delay_ms: parse_var("BATCH_DELAY_MS").unwrap_or(defaults.batch_delay_ms),
            max_batch_size: parse_var("MAX_BATCH_SIZE"),
            purge_interval: parse_var("PURGE_INTERVAL").unwrap_or(defaults.purge_interval),
        }
    }

    pub fn cache_options(&self) -> CacheOptions {
        CacheOptions {
            ttl_seconds: self.query_cache_ttl,
            max_entries: self.query_cache_max_entries,
        }
    }

    pub fn loader_options(&self) -> LoaderOptions {
        LoaderOptions {
            batch_delay: Duration::from_millis(self.batch_delay_ms),
            max_batch_size: self.max_batch_size,
            ..LoaderOptions::default()
        }
    }

    pub fn purge_interval(&self) -> Duration {
        Duration::from_secs(self.purge_interval)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            query_cache_ttl: DEFAULT_QUERY_CACHE_TTL,
            query_cache_max_entries: None,
            batch_delay_ms: 0,
            max_batch_size: None,
            purge_interval: DEFAULT_PURGE_INTERVAL,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
