//! Address decomposition.
//!
//! This module splits a fixed-width address into the three contiguous bit
//! ranges the cache works with. It provides:
//! 1. **Geometry:** `CacheGeometry`, the validated bit widths of tag, index, and offset.
//! 2. **Decomposition:** `decompose` extracts the fields of an address.
//! 3. **Composition:** `compose` and `next_block` rebuild block addresses from fields.
//!
//! Width mismatches are rejected once, when the geometry is built; after that
//! every operation here is infallible.

use serde::Serialize;

use super::constants::WORD_BYTES;
use super::error::ConfigError;

/// Fields of an address as seen by the cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DecodedAddr {
    /// Identifies the resident block within its set.
    pub tag: u64,
    /// Selects the set.
    pub index: usize,
    /// Byte offset within the block.
    pub offset: usize,
}

/// Bit layout of addresses for one cache configuration.
///
/// Invariant: `tag_bits + index_bits + offset_bits == address_bits` and
/// `tag_bits >= 1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CacheGeometry {
    address_bits: u32,
    tag_bits: u32,
    index_bits: u32,
    offset_bits: u32,
    num_sets: usize,
    block_bytes: usize,
}

impl CacheGeometry {
    /// Builds the address layout for `num_sets` sets of `block_bytes`-byte blocks.
    ///
    /// # Arguments
    ///
    /// * `address_bits` - Width of an address (1..=64).
    /// * `num_sets` - Number of sets; must be a power of two.
    /// * `block_bytes` - Block size; a power of two holding at least one word.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` when a size is not a power of two, the block is
    /// narrower than a word, or the address cannot hold index, offset, and at
    /// least one tag bit.
    pub fn new(address_bits: u32, num_sets: usize, block_bytes: usize) -> Result<Self, ConfigError> {
        if !block_bytes.is_power_of_two() {
            return Err(ConfigError::NotPowerOfTwo {
                field: "block_bytes",
                value: block_bytes,
            });
        }
        if block_bytes < WORD_BYTES {
            return Err(ConfigError::BlockTooSmall(block_bytes));
        }
        if !num_sets.is_power_of_two() {
            return Err(ConfigError::NotPowerOfTwo {
                field: "num_sets",
                value: num_sets,
            });
        }
        if address_bits > 64 {
            return Err(ConfigError::AddressTooWide(address_bits));
        }

        let offset_bits = block_bytes.trailing_zeros();
        let index_bits = num_sets.trailing_zeros();
        if address_bits <= offset_bits + index_bits {
            return Err(ConfigError::AddressTooNarrow {
                address_bits,
                index_bits,
                offset_bits,
            });
        }

        Ok(Self {
            address_bits,
            tag_bits: address_bits - offset_bits - index_bits,
            index_bits,
            offset_bits,
            num_sets,
            block_bytes,
        })
    }

    /// Width of an address in bits.
    pub const fn address_bits(&self) -> u32 {
        self.address_bits
    }

    /// Width of the tag field in bits.
    pub const fn tag_bits(&self) -> u32 {
        self.tag_bits
    }

    /// Width of the index field in bits.
    pub const fn index_bits(&self) -> u32 {
        self.index_bits
    }

    /// Width of the offset field in bits.
    pub const fn offset_bits(&self) -> u32 {
        self.offset_bits
    }

    /// Number of sets.
    pub const fn num_sets(&self) -> usize {
        self.num_sets
    }

    /// Block size in bytes.
    pub const fn block_bytes(&self) -> usize {
        self.block_bytes
    }

    /// Number of CPU words per block.
    pub const fn words_per_block(&self) -> usize {
        self.block_bytes / WORD_BYTES
    }

    /// Byte offset at which the upper half of a block starts.
    pub const fn midpoint(&self) -> usize {
        self.block_bytes / 2
    }

    /// Mask of the bits that belong to an address.
    #[inline(always)]
    pub const fn address_mask(&self) -> u64 {
        if self.address_bits == 64 {
            u64::MAX
        } else {
            (1u64 << self.address_bits) - 1
        }
    }

    /// Splits an address into tag, index, and offset.
    ///
    /// Bits above `address_bits` are ignored.
    #[inline(always)]
    pub const fn decompose(&self, addr: u64) -> DecodedAddr {
        let addr = addr & self.address_mask();
        let offset = addr & ((1u64 << self.offset_bits) - 1);
        let index = (addr >> self.offset_bits) & ((1u64 << self.index_bits) - 1);
        DecodedAddr {
            tag: addr >> (self.offset_bits + self.index_bits),
            index: index as usize,
            offset: offset as usize,
        }
    }

    /// Rebuilds the block address (offset zero) of a `(tag, index)` pair.
    #[inline(always)]
    pub const fn compose(&self, tag: u64, index: usize) -> u64 {
        let addr = (tag << (self.offset_bits + self.index_bits)) | ((index as u64) << self.offset_bits);
        addr & self.address_mask()
    }

    /// Clears the offset bits of an address.
    #[inline(always)]
    pub const fn block_address(&self, addr: u64) -> u64 {
        addr & self.address_mask() & !((self.block_bytes as u64) - 1)
    }

    /// Address of the block following the one containing `addr`.
    ///
    /// Wraps around at the top of the address space.
    #[inline(always)]
    pub const fn next_block(&self, addr: u64) -> u64 {
        self.block_address(addr).wrapping_add(self.block_bytes as u64) & self.address_mask()
    }
}
