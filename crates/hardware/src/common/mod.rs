//! Common types shared by every part of the cache model.
//!
//! It includes:
//! 1. **Address Decomposition:** Cache geometry and tag/index/offset extraction.
//! 2. **Constants:** Associativity, word width, and recency counter limits.
//! 3. **Data Path Units:** CPU words and memory blocks.
//! 4. **Error Handling:** Configuration and simulation errors.

/// Address geometry and decomposition.
pub mod addr;

/// Structural constants of the cache.
pub mod constants;

/// Words and blocks.
pub mod data;

/// Error types.
pub mod error;

pub use addr::{CacheGeometry, DecodedAddr};
pub use constants::{RECENCY_MAX, WAYS, WORD_BYTES};
pub use data::{Block, Word};
pub use error::{ConfigError, SimError};
