//! Error definitions.
//!
//! The clocked model itself has no runtime error path: contract violations are
//! resolved deterministically and a missing victim surfaces as a stall. Errors
//! exist only at the edges of the model:
//! 1. **Configuration:** `ConfigError` rejects geometries the controller cannot implement.
//! 2. **Simulation:** `SimError` covers file I/O, JSON, trace parsing, and requests that never complete.

use thiserror::Error;

/// A cache configuration that cannot be built.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The controller only implements 2-way sets.
    #[error("unsupported associativity {0}: the controller is strictly 2-way")]
    UnsupportedWays(usize),

    /// A size that must be a power of two is not.
    #[error("{field} must be a non-zero power of two, got {value}")]
    NotPowerOfTwo {
        /// Name of the offending field.
        field: &'static str,
        /// Value that was supplied.
        value: usize,
    },

    /// The block cannot hold a single CPU word.
    #[error("block of {0} bytes cannot hold a 4-byte word")]
    BlockTooSmall(usize),

    /// The cache size is not a whole number of 2-way sets.
    #[error("cache size {size} is not a whole number of 2-way sets of {block_bytes}-byte blocks")]
    SizeMismatch {
        /// Configured cache size in bytes.
        size: usize,
        /// Configured block size in bytes.
        block_bytes: usize,
    },

    /// The address leaves no room for a tag.
    #[error(
        "{address_bits}-bit addresses leave no tag bits after {index_bits} index and {offset_bits} offset bits"
    )]
    AddressTooNarrow {
        /// Configured address width.
        address_bits: u32,
        /// Index bits implied by the number of sets.
        index_bits: u32,
        /// Offset bits implied by the block size.
        offset_bits: u32,
    },

    /// Addresses are modelled as `u64`.
    #[error("address width {0} exceeds 64 bits")]
    AddressTooWide(u32),
}

/// Errors raised while loading inputs for, or driving, a simulation.
#[derive(Debug, Error)]
pub enum SimError {
    /// The cache configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A file could not be read.
    #[error("could not read '{path}': {source}")]
    Io {
        /// Path that was being read.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// A configuration document is not valid JSON for `Config`.
    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// A trace line could not be parsed.
    #[error("trace line {line}: {reason}")]
    Trace {
        /// 1-based line number.
        line: usize,
        /// What was wrong with it.
        reason: String,
    },

    /// A request was re-issued for the configured number of cycles without being serviced.
    #[error("request to {address:#x} made no progress after {cycles} cycles")]
    Stalled {
        /// Address of the stuck request.
        address: u64,
        /// Cycles spent re-issuing it.
        cycles: u64,
    },
}
