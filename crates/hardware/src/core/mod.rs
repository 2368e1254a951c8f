//! Cache controller core.
//!
//! This module contains the data cache controller and the functional units it
//! is built from.

/// Functional units (cache, prefetcher).
pub mod units;

pub use self::units::cache::DataCache;
