//! Background Tasks Module
//!
//! Contains background tasks that run for the lifetime of a cache instance.
//!
//! # Tasks
//! - Expiry sweep: removes expired entries at the configured check interval

mod sweep;

pub use sweep::spawn_sweep_task;
