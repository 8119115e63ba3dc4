//! Background Tasks Module
//!
//! # Tasks
//! - TTL Purge: drops expired cache entries at a configured interval

mod purge;

pub use purge::spawn_purge_task;
