//! Configuration system for the cache model.
//!
//! This module defines all configuration structures and enums used to
//! parameterize the model. It provides:
//! 1. **Defaults:** Baseline geometry constants (4 sets of two 8-byte blocks, 32-bit addresses).
//! 2. **Structures:** Hierarchical config for general, cache, and memory settings.
//! 3. **Enums:** Prefetcher, reset policy, and backing memory fill pattern.
//! 4. **Validation:** `CacheConfig::geometry` turns sizes into a checked `CacheGeometry`.
//!
//! Configuration is supplied as JSON (`Config::load`) or built with `Config::default()`.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::common::constants::WAYS;
use crate::common::{CacheGeometry, ConfigError, SimError};

/// Default configuration constants.
mod defaults {
    /// Total data capacity in bytes (4 sets x 2 ways x 8 bytes).
    pub const SIZE_BYTES: usize = 64;

    /// Block size in bytes: one 64-bit memory bus transfer, two CPU words.
    pub const BLOCK_BYTES: usize = 8;

    /// Associativity.
    pub const WAYS: usize = 2;

    /// Address width in bits.
    pub const ADDRESS_BITS: u32 = 32;

    /// Cycles a blocking request may be re-issued before it is reported as stalled.
    pub const MAX_STALL_CYCLES: u64 = 64;
}

/// Hardware prefetcher selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub enum Prefetcher {
    /// No prefetching; triggers are ignored.
    None,
    /// Fetch the next sequential block after every serviced access or refill.
    #[default]
    NextBlock,
}

/// What a reset pulse does to the line contents.
///
/// Reset always returns the controller to Servicing and clears the
/// prefetcher; only the treatment of the ways differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub enum ResetPolicy {
    /// Every way becomes invalid, clean, and zeroed, with recency 0.
    #[default]
    ClearLines,
    /// Ways keep their contents; only power-up starts from invalid lines.
    KeepLines,
}

/// Initial contents of backing memory blocks that were never written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub enum FillPattern {
    /// Untouched memory reads as zero.
    #[default]
    Zero,
    /// Each untouched word reads as its own byte address, truncated to 32 bits.
    Address,
}

/// Root configuration structure.
///
/// # Examples
///
/// ```
/// use l1d_core::config::{Config, Prefetcher};
///
/// let json = r#"{
///     "cache": { "size_bytes": 128, "block_bytes": 16, "prefetcher": "None" }
/// }"#;
///
/// let config = Config::from_json_str(json).unwrap();
/// assert_eq!(config.cache.prefetcher, Prefetcher::None);
/// assert_eq!(config.cache.geometry().unwrap().num_sets(), 4);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// General simulation settings
    pub general: GeneralConfig,
    /// Cache geometry and behaviour
    pub cache: CacheConfig,
    /// Backing memory model
    pub memory: MemoryConfig,
}

impl Config {
    /// Parses a configuration from a JSON document; missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns `SimError::Json` when the document does not describe a `Config`.
    pub fn from_json_str(json: &str) -> Result<Self, SimError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns `SimError::Io` if the file cannot be read, or `SimError::Json`
    /// if it cannot be parsed.
    pub fn load(path: &Path) -> Result<Self, SimError> {
        let text = fs::read_to_string(path).map_err(|source| SimError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }
}

/// General simulation settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Emit per-access debug events from the simulator driver.
    pub trace: bool,
    /// Cycles a blocking `read`/`write` may re-issue its request before giving up.
    pub max_stall_cycles: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            trace: false,
            max_stall_cycles: defaults::MAX_STALL_CYCLES,
        }
    }
}

/// Cache geometry and behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Total data capacity in bytes.
    pub size_bytes: usize,
    /// Block size in bytes.
    pub block_bytes: usize,
    /// Associativity; must be 2.
    pub ways: usize,
    /// Address width in bits.
    pub address_bits: u32,
    /// Prefetcher attached to the controller.
    pub prefetcher: Prefetcher,
    /// Effect of `reset` on the line contents.
    pub reset_policy: ResetPolicy,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            size_bytes: defaults::SIZE_BYTES,
            block_bytes: defaults::BLOCK_BYTES,
            ways: defaults::WAYS,
            address_bits: defaults::ADDRESS_BITS,
            prefetcher: Prefetcher::default(),
            reset_policy: ResetPolicy::default(),
        }
    }
}

impl CacheConfig {
    /// Creates a configuration for `num_sets` sets with default block size and address width.
    ///
    /// A set count whose size overflows `usize` saturates and is rejected by
    /// [`CacheConfig::geometry`].
    pub fn with_sets(num_sets: usize) -> Self {
        Self {
            size_bytes: num_sets.saturating_mul(WAYS * defaults::BLOCK_BYTES),
            ..Self::default()
        }
    }

    /// Validates the sizes and derives the address layout.
    ///
    /// Enforces `size_bytes == ways * sets * block_bytes` and
    /// `tag + index + offset bits == address_bits`.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` found.
    pub fn geometry(&self) -> Result<CacheGeometry, ConfigError> {
        if self.ways != WAYS {
            return Err(ConfigError::UnsupportedWays(self.ways));
        }
        if !self.block_bytes.is_power_of_two() {
            return Err(ConfigError::NotPowerOfTwo {
                field: "block_bytes",
                value: self.block_bytes,
            });
        }
        let mismatch = ConfigError::SizeMismatch {
            size: self.size_bytes,
            block_bytes: self.block_bytes,
        };
        let Some(set_bytes) = self.ways.checked_mul(self.block_bytes) else {
            return Err(mismatch);
        };
        if self.size_bytes == 0 || self.size_bytes % set_bytes != 0 {
            return Err(mismatch);
        }
        CacheGeometry::new(self.address_bits, self.size_bytes / set_bytes, self.block_bytes)
    }
}

/// Backing memory model settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Contents of never-written blocks.
    pub fill_pattern: FillPattern,
}
