//! Cycle-level L1 data cache controller library.
//!
//! This crate models a 2-way set-associative, write-back, write-allocate data
//! cache at the signal level:
//! 1. **Core:** Controller state machine, set storage, recency-counter replacement, and the next-block prefetcher.
//! 2. **Memory:** A synchronous block memory answering the cache's read and write channels.
//! 3. **Simulation:** A cycle driver, trace loading, configuration, and statistics reporting.

/// Common types and constants (address layout, words and blocks, errors).
pub mod common;
/// Simulator configuration (defaults, enums, hierarchical config structures).
pub mod config;
/// Cache controller and prefetcher.
pub mod core;
/// Simulation driver and trace loader.
pub mod sim;
/// Components on the far side of the memory bus.
pub mod soc;
/// Statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// The cache controller; advance it with `DataCache::tick`.
pub use crate::core::DataCache;
/// Cache plus memory driver; construct with `Simulator::new`.
pub use crate::sim::Simulator;
