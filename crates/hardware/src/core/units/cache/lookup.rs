//! Hit/Miss Evaluator.
//!
//! Pure comparison of an address against the pre-edge contents of its set.
//! Runs before any mutation of the cycle and is shared by the `hit` output,
//! the controller, and prefetch insertion.

use super::storage::{SetStorage, Way};
use crate::common::DecodedAddr;

/// Outcome of a tag comparison.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lookup {
    /// The block is resident in the given way.
    Hit(Way),
    /// The block is not resident.
    Miss,
}

impl Lookup {
    /// Returns `true` on a hit.
    #[inline(always)]
    pub const fn is_hit(self) -> bool {
        matches!(self, Self::Hit(_))
    }

    /// The hitting way, if any.
    #[inline(always)]
    pub const fn way(self) -> Option<Way> {
        match self {
            Self::Hit(way) => Some(way),
            Self::Miss => None,
        }
    }
}

/// Compares `addr` against both ways of its set, way A first.
pub fn evaluate(storage: &SetStorage, addr: &DecodedAddr) -> Lookup {
    Way::ALL
        .into_iter()
        .find(|&way| {
            let line = storage.entry(addr.index, way);
            line.valid && line.tag == addr.tag
        })
        .map_or(Lookup::Miss, Lookup::Hit)
}
