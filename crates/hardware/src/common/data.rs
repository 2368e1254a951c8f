//! Data path units.
//!
//! A `Word` is one CPU bus transfer; a `Block` is one memory bus transfer and
//! holds several words addressed by the byte offset of an address.

use std::fmt;

use serde::Serialize;

use super::constants::WORD_BYTES;

/// One CPU bus word.
pub type Word = u32;

/// One memory bus transfer: the unit of fill, write-back, and prefetch.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Block(Vec<Word>);

impl Block {
    /// Creates a block of `words` zero words.
    pub fn zeroed(words: usize) -> Self {
        Self(vec![0; words])
    }

    /// Wraps an explicit list of words.
    pub fn from_words(words: Vec<Word>) -> Self {
        Self(words)
    }

    /// Returns the words of the block, lowest offset first.
    pub fn words(&self) -> &[Word] {
        &self.0
    }

    /// Number of words in the block.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` for a block with no words (an unconnected data bus).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Reads the word selected by a byte offset within the block.
    ///
    /// Offsets past the end of the block read as zero, the value of an
    /// undriven bus.
    #[inline]
    pub fn word_at(&self, offset: usize) -> Word {
        self.0.get(offset / WORD_BYTES).copied().unwrap_or(0)
    }

    /// Stores a word at the byte offset within the block.
    ///
    /// Out-of-range offsets are ignored.
    #[inline]
    pub fn set_word_at(&mut self, offset: usize, value: Word) {
        if let Some(slot) = self.0.get_mut(offset / WORD_BYTES) {
            *slot = value;
        }
    }
}

impl From<Vec<Word>> for Block {
    fn from(words: Vec<Word>) -> Self {
        Self(words)
    }
}

impl fmt::Display for Block {
    /// Formats the block as hex words, highest offset first, like a bus dump.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, word) in self.0.iter().rev().enumerate() {
            if i > 0 {
                write!(f, "_")?;
            }
            write!(f, "{word:08x}")?;
        }
        Ok(())
    }
}
