//! Global Cache Constants.
//!
//! Structural constants of the cache that are fixed by the design rather than
//! by configuration:
//! 1. **Associativity:** The controller is strictly 2-way.
//! 2. **Bus Widths:** CPU word width in bytes.
//! 3. **Replacement:** Width and saturation value of the recency counters.

/// Number of ways in every set.
pub const WAYS: usize = 2;

/// Width of one CPU bus word in bytes.
pub const WORD_BYTES: usize = 4;

/// Largest value a 2-bit recency counter can hold.
pub const RECENCY_MAX: u8 = 3;
