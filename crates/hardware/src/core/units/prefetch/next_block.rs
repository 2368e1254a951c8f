//! Next-Block Prefetcher.
//!
//! A spatial prefetcher that names the block sequentially following every
//! serviced access or refill, hit or miss alike. Addresses wrap at the top of
//! the address space.

use super::Prefetcher;
use crate::common::CacheGeometry;

/// Next-Block Prefetcher state.
#[derive(Clone, Copy, Debug)]
pub struct NextBlockPrefetcher {
    geometry: CacheGeometry,
}

impl NextBlockPrefetcher {
    /// Creates a prefetcher for the block size and address width of `geometry`.
    pub const fn new(geometry: CacheGeometry) -> Self {
        Self { geometry }
    }
}

impl Prefetcher for NextBlockPrefetcher {
    /// Returns the block after the one containing `addr`.
    fn observe(&mut self, addr: u64, _hit: bool) -> Option<u64> {
        Some(self.geometry.next_block(addr))
    }
}
