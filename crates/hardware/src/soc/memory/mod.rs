//! Backing Memory.
//!
//! This module implements the block-wide memory behind the cache. It provides:
//! 1. **Storage:** Sparse block store keyed by block address; untouched blocks follow a fill pattern.
//! 2. **Ports:** A write port and a registered read port, both clocked by `clock`.
//! 3. **Backdoor:** Direct block and word access for loading and checking contents.
//!
//! The memory honours the cache's synchronous contract: a read requested in
//! cycle *t* is on `read_data` in cycle *t + 1*, and a write asserted in cycle
//! *t* is accepted unconditionally at the edge of *t*.

use std::collections::HashMap;

use tracing::trace;

use crate::common::{Block, CacheGeometry, WORD_BYTES, Word};
use crate::config::FillPattern;
use crate::core::units::cache::CacheOutputs;

/// Synchronous block memory.
#[derive(Debug)]
pub struct Memory {
    geometry: CacheGeometry,
    blocks: HashMap<u64, Block>,
    fill: FillPattern,
    read_data: Block,
    reads: u64,
    writes: u64,
}

impl Memory {
    /// Creates a memory whose block size and address width match `geometry`.
    pub fn new(geometry: &CacheGeometry, fill: FillPattern) -> Self {
        Self {
            geometry: *geometry,
            blocks: HashMap::new(),
            fill,
            read_data: Block::zeroed(geometry.words_per_block()),
            reads: 0,
            writes: 0,
        }
    }

    /// Registered read data: the block requested in the previous cycle.
    pub const fn read_data(&self) -> &Block {
        &self.read_data
    }

    /// Number of reads served.
    pub const fn reads(&self) -> u64 {
        self.reads
    }

    /// Number of writes accepted.
    pub const fn writes(&self) -> u64 {
        self.writes
    }

    fn untouched(&self, block_addr: u64) -> Block {
        let words = self.geometry.words_per_block();
        match self.fill {
            FillPattern::Zero => Block::zeroed(words),
            FillPattern::Address => Block::from_words(
                (0..words)
                    .map(|i| block_addr.wrapping_add((i * WORD_BYTES) as u64) as Word)
                    .collect(),
            ),
        }
    }

    /// Current contents of the block containing `addr`.
    pub fn peek_block(&self, addr: u64) -> Block {
        let block_addr = self.geometry.block_address(addr);
        self.blocks
            .get(&block_addr)
            .cloned()
            .unwrap_or_else(|| self.untouched(block_addr))
    }

    /// Replaces the block containing `addr`.
    pub fn load_block(&mut self, addr: u64, block: Block) {
        let block_addr = self.geometry.block_address(addr);
        let _ = self.blocks.insert(block_addr, block);
    }

    /// Reads the word containing byte address `addr`.
    pub fn peek_word(&self, addr: u64) -> Word {
        let offset = self.geometry.decompose(addr).offset;
        self.peek_block(addr).word_at(offset)
    }

    /// Writes the word containing byte address `addr`.
    pub fn poke_word(&mut self, addr: u64, value: Word) {
        let offset = self.geometry.decompose(addr).offset;
        let mut block = self.peek_block(addr);
        block.set_word_at(offset, value);
        self.load_block(addr, block);
    }

    /// Clock edge: accepts the cycle's write, then latches the requested read.
    pub fn clock(&mut self, outputs: &CacheOutputs) {
        if let Some((addr, block)) = outputs.memory_write() {
            trace!(address = addr, data = %block, "memory write");
            self.load_block(addr, block.clone());
            self.writes += 1;
        }
        if let Some(addr) = outputs.memory_read() {
            self.read_data = self.peek_block(addr);
            self.reads += 1;
        }
    }

    /// Clears the read register. Stored contents survive, as DRAM does across a cache reset.
    pub fn reset(&mut self) {
        self.read_data = Block::zeroed(self.geometry.words_per_block());
    }
}
