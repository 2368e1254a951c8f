//! 2-bit Recency Counter Replacement Policy.
//!
//! Each way carries a saturating counter in `0..=3`. Using a way resets its
//! counter to 0; the sibling's counter is incremented only if it was at most
//! the used way's previous value. From any reachable state this keeps the two
//! counters of a filled set distinct, with the most recently used way at 0.
//!
//! # Victim selection
//!
//! 1. A way whose counter is saturated (3), way A first.
//! 2. Otherwise the way with the strictly greater counter.
//! 3. Equal counters name no victim; the controller stalls.

use std::cmp::Ordering;

use super::ReplacementPolicy;
use crate::common::constants::{RECENCY_MAX, WAYS};
use crate::core::units::cache::Way;

/// Recency counter policy; stateless, the counters live in the ways.
#[derive(Clone, Copy, Debug, Default)]
pub struct RecencyCounterPolicy;

impl RecencyCounterPolicy {
    /// Creates the policy.
    pub const fn new() -> Self {
        Self
    }
}

impl ReplacementPolicy for RecencyCounterPolicy {
    fn touch(&self, counters: &mut [u8; WAYS], way: Way) {
        let used = way.index();
        let sibling = way.sibling().index();
        let previous = counters[used];

        counters[used] = 0;
        if counters[sibling] <= previous {
            counters[sibling] = (counters[sibling] + 1).min(RECENCY_MAX);
        }
    }

    fn victim(&self, counters: &[u8; WAYS]) -> Option<Way> {
        if let Some(way) = Way::ALL
            .into_iter()
            .find(|way| counters[way.index()] == RECENCY_MAX)
        {
            return Some(way);
        }

        match counters[Way::A.index()].cmp(&counters[Way::B.index()]) {
            Ordering::Greater => Some(Way::A),
            Ordering::Less => Some(Way::B),
            Ordering::Equal => None,
        }
    }
}
