//! Simulation driver and trace loading.
//!
//! Couples the cache with its backing memory and replays CPU requests,
//! either one at a time or from a trace file.

/// Trace file parsing.
pub mod loader;

/// Cycle driver for cache + memory.
pub mod simulator;

pub use loader::{load_trace, parse_trace};
pub use simulator::{Access, Simulator};
