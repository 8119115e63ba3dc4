//! Loader Module
//!
//! Request coalescing over caller-supplied bulk fetch functions: scattered
//! per-key lookups become one batched fetch per scheduling turn.

mod batch;
mod batch_loader;
mod stats;

pub use batch_loader::{BatchLoader, LoaderOptions};
pub use stats::LoaderStats;
