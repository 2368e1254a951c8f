//! Set Storage.
//!
//! A fixed table of `num_sets * 2` ways, indexed by `(set, way)`. Mutations
//! are staged while a cycle is evaluated and applied by `commit` at the clock
//! edge, in the order they were issued; reads during the cycle always see the
//! pre-edge contents.

use serde::Serialize;

use super::policies::{RecencyCounterPolicy, ReplacementPolicy};
use crate::common::constants::WAYS;
use crate::common::{Block, Word};
use crate::config::ResetPolicy;

/// One of the two ways of a set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Way {
    /// Way 0.
    A,
    /// Way 1.
    B,
}

impl Way {
    /// Both ways, in priority order.
    pub const ALL: [Self; WAYS] = [Self::A, Self::B];

    /// Position of the way within its set.
    #[inline(always)]
    pub const fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
        }
    }

    /// The other way of the same set.
    #[inline(always)]
    pub const fn sibling(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }
}

/// Contents of one way.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WayEntry {
    /// The way holds a block.
    pub valid: bool,
    /// The block was written since it was filled.
    pub dirty: bool,
    /// Tag of the resident block.
    pub tag: u64,
    /// 2-bit recency counter; 0 is most recently used.
    pub recency: u8,
    /// Block data.
    pub data: Block,
}

impl WayEntry {
    /// An invalid, clean, zeroed way.
    pub fn empty(words_per_block: usize) -> Self {
        Self {
            valid: false,
            dirty: false,
            tag: 0,
            recency: 0,
            data: Block::zeroed(words_per_block),
        }
    }
}

/// A mutation waiting for the clock edge.
#[derive(Clone, Debug, PartialEq, Eq)]
enum StagedOp {
    Write {
        index: usize,
        way: Way,
        offset: usize,
        value: Word,
    },
    Fill {
        index: usize,
        way: Way,
        tag: u64,
        block: Block,
    },
    Touch {
        index: usize,
        way: Way,
    },
}

/// Way table of the cache, owned by the controller.
pub struct SetStorage {
    lines: Vec<WayEntry>,
    num_sets: usize,
    words_per_block: usize,
    staged: Vec<StagedOp>,
    policy: Box<dyn ReplacementPolicy + Send + Sync>,
}

impl std::fmt::Debug for SetStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SetStorage")
            .field("num_sets", &self.num_sets)
            .field("words_per_block", &self.words_per_block)
            .field("staged", &self.staged.len())
            .finish_non_exhaustive()
    }
}

impl SetStorage {
    /// Creates storage with every way invalid, using the recency counter policy.
    pub fn new(num_sets: usize, words_per_block: usize) -> Self {
        Self::with_policy(num_sets, words_per_block, Box::new(RecencyCounterPolicy::new()))
    }

    /// Creates storage with an explicit replacement policy.
    pub fn with_policy(
        num_sets: usize,
        words_per_block: usize,
        policy: Box<dyn ReplacementPolicy + Send + Sync>,
    ) -> Self {
        Self {
            lines: vec![WayEntry::empty(words_per_block); num_sets * WAYS],
            num_sets,
            words_per_block,
            staged: Vec::new(),
            policy,
        }
    }

    /// Number of sets.
    pub const fn num_sets(&self) -> usize {
        self.num_sets
    }

    #[inline(always)]
    const fn slot(index: usize, way: Way) -> usize {
        index * WAYS + way.index()
    }

    /// Pre-edge contents of a way.
    ///
    /// # Panics
    ///
    /// Panics if `index >= num_sets`.
    #[inline]
    pub fn entry(&self, index: usize, way: Way) -> &WayEntry {
        &self.lines[Self::slot(index, way)]
    }

    /// Pre-edge contents of both ways of a set.
    pub fn set(&self, index: usize) -> &[WayEntry] {
        let base = index * WAYS;
        &self.lines[base..base + WAYS]
    }

    /// Recency counters of a set, indexed by way.
    pub fn recency(&self, index: usize) -> [u8; WAYS] {
        Way::ALL.map(|way| self.entry(index, way).recency)
    }

    /// Number of valid ways in a set.
    pub fn valid_count(&self, index: usize) -> usize {
        self.set(index).iter().filter(|line| line.valid).count()
    }

    /// First invalid way of a set, way A first.
    pub fn first_invalid(&self, index: usize) -> Option<Way> {
        Way::ALL
            .into_iter()
            .find(|&way| !self.entry(index, way).valid)
    }

    /// Reads the word at a byte offset of a way.
    pub fn read(&self, index: usize, way: Way, offset: usize) -> Word {
        self.entry(index, way).data.word_at(offset)
    }

    /// Stages a word write; the way becomes dirty at the edge.
    pub fn write(&mut self, index: usize, way: Way, offset: usize, value: Word) {
        self.staged.push(StagedOp::Write {
            index,
            way,
            offset,
            value,
        });
    }

    /// Stages a fill: the way becomes valid and clean with the given tag and block.
    pub fn fill(&mut self, index: usize, way: Way, tag: u64, block: Block) {
        self.staged.push(StagedOp::Fill {
            index,
            way,
            tag,
            block,
        });
    }

    /// Stages a recency update for a use of `way`.
    pub fn touch(&mut self, index: usize, way: Way) {
        self.staged.push(StagedOp::Touch { index, way });
    }

    /// Way whose recency counters make it the eviction candidate, if any.
    pub fn evict_candidate(&self, index: usize) -> Option<Way> {
        self.policy.victim(&self.recency(index))
    }

    /// Number of mutations waiting for the edge.
    pub fn staged_len(&self) -> usize {
        self.staged.len()
    }

    /// Applies all staged mutations in issue order.
    pub fn commit(&mut self) {
        let words_per_block = self.words_per_block;
        for op in std::mem::take(&mut self.staged) {
            match op {
                StagedOp::Write {
                    index,
                    way,
                    offset,
                    value,
                } => {
                    let line = &mut self.lines[Self::slot(index, way)];
                    line.data.set_word_at(offset, value);
                    line.dirty = true;
                }
                StagedOp::Fill {
                    index,
                    way,
                    tag,
                    mut block,
                } => {
                    // A short bus is padded with zeros so every line keeps its width.
                    if block.len() != words_per_block {
                        let mut words = block.words().to_vec();
                        words.resize(words_per_block, 0);
                        block = Block::from_words(words);
                    }
                    let line = &mut self.lines[Self::slot(index, way)];
                    line.valid = true;
                    line.dirty = false;
                    line.tag = tag;
                    line.data = block;
                }
                StagedOp::Touch { index, way } => {
                    let mut counters = self.recency(index);
                    self.policy.touch(&mut counters, way);
                    for w in Way::ALL {
                        self.lines[Self::slot(index, w)].recency = counters[w.index()];
                    }
                }
            }
        }
    }

    /// Drops staged mutations and applies the reset policy to the lines.
    pub fn reset(&mut self, policy: ResetPolicy) {
        self.staged.clear();
        if policy == ResetPolicy::ClearLines {
            let empty = WayEntry::empty(self.words_per_block);
            self.lines.fill(empty);
        }
    }
}
