//! Functional units of the data cache.

/// L1 data cache controller with replacement policies.
pub mod cache;

/// Hardware prefetcher (next-block).
pub mod prefetch;
