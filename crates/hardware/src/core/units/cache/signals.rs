//! Boundary signals of the cache, sampled and driven once per cycle.

use serde::Serialize;

use crate::common::{Block, Word};

/// Inputs sampled in one cycle.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CacheInputs {
    /// Requested address.
    pub address: u64,
    /// Word to store on a write.
    pub write_data: Word,
    /// Read request.
    pub read_enable: bool,
    /// Write request; wins if asserted together with `read_enable`.
    pub write_enable: bool,
    /// Block returned by memory for the read requested in the previous cycle.
    pub memory_read_data: Block,
}

impl CacheInputs {
    /// A read request for `address`.
    pub fn read(address: u64) -> Self {
        Self {
            address,
            read_enable: true,
            ..Self::default()
        }
    }

    /// A write request storing `data` at `address`.
    pub fn write(address: u64, data: Word) -> Self {
        Self {
            address,
            write_data: data,
            write_enable: true,
            ..Self::default()
        }
    }

    /// Attaches the memory read data bus.
    #[must_use]
    pub fn with_memory_data(mut self, block: Block) -> Self {
        self.memory_read_data = block;
        self
    }

    /// Returns `true` when either enable is asserted.
    #[inline(always)]
    pub const fn is_active(&self) -> bool {
        self.read_enable || self.write_enable
    }
}

/// Outputs driven in one cycle.
///
/// `hit` and the memory request fields are combinational for the cycle's
/// inputs; `read_data` is the read-data register as of the end of the cycle.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CacheOutputs {
    /// The current address is resident (pre-edge).
    pub hit: bool,
    /// The request was serviced at this edge.
    pub ready: bool,
    /// Read-data register.
    pub read_data: Word,
    /// Memory read request.
    pub memory_read_enable: bool,
    /// Block address of the memory read.
    pub memory_read_address: u64,
    /// The memory read belongs to the prefetcher rather than a demand miss.
    pub memory_read_is_prefetch: bool,
    /// Memory write of an evicted dirty block; asserted for exactly one cycle.
    pub memory_write_enable: bool,
    /// Block address of the memory write.
    pub memory_write_address: u64,
    /// Block written back.
    pub memory_write_data: Block,
}

impl CacheOutputs {
    /// The requested read address, if a read is asserted.
    pub const fn memory_read(&self) -> Option<u64> {
        if self.memory_read_enable {
            Some(self.memory_read_address)
        } else {
            None
        }
    }

    /// The write-back address and data, if a write is asserted.
    pub const fn memory_write(&self) -> Option<(u64, &Block)> {
        if self.memory_write_enable {
            Some((self.memory_write_address, &self.memory_write_data))
        } else {
            None
        }
    }
}
