//! Cache Replacement Policies.
//!
//! Replacement state lives in the per-way recency counters held by set
//! storage; a policy only defines how those counters move on a use and which
//! way they name as the victim.
//!
//! # Policies
//!
//! - `RecencyCounterPolicy`: 2-bit per-way recency counters.

/// 2-bit recency counter replacement policy.
pub mod recency;

pub use recency::RecencyCounterPolicy;

use crate::common::constants::WAYS;
use crate::core::units::cache::Way;

/// Trait for cache replacement policies.
///
/// Defines the interface for updating usage state and selecting victim lines
/// within one set.
pub trait ReplacementPolicy: Send + Sync {
    /// Updates the counters of a set when `way` is hit or filled.
    ///
    /// # Arguments
    ///
    /// * `counters` - Recency counters of the set, indexed by way.
    /// * `way` - The way that was used.
    fn touch(&self, counters: &mut [u8; WAYS], way: Way);

    /// Selects the way to evict from a set whose ways are all valid.
    ///
    /// # Returns
    ///
    /// The victim way, or `None` when the counters do not single one out.
    fn victim(&self, counters: &[u8; WAYS]) -> Option<Way>;
}
