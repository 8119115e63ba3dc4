//! Query Optimizer - batched, deduplicated and time-bounded data access
//!
//! Provides a batch loader that coalesces per-key lookups into bulk fetches,
//! a TTL cache with a cached-query wrapper, and pagination helpers.

pub mod cache;
pub mod config;
pub mod error;
pub mod loader;
pub mod pagination;
pub mod query;
pub mod tasks;

pub use cache::TtlCache;
pub use config::Config;
pub use error::LoadError;
pub use loader::{BatchLoader, LoaderOptions};
pub use pagination::{
    create_paginated_result, get_pagination_params, PaginatedResult, PaginationParams,
};
pub use query::{create_cached_query, CachedQuery};
pub use tasks::spawn_purge_task;
