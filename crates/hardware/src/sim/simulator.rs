//! Simulator: owns the cache and its backing memory side by side.
//!
//! Each `step` is one clock cycle: the memory's registered read data is fed to
//! the cache, the cache is ticked, and the cache's memory requests are clocked
//! into the memory. On top of that, `access` plays the requester: it holds a
//! request on the bus until the cache reports it serviced.

use serde::Serialize;
use tracing::debug;

use crate::common::{ConfigError, SimError, Word};
use crate::config::Config;
use crate::core::units::cache::{CacheInputs, CacheOutputs, DataCache};
use crate::soc::Memory;
use crate::stats::RunReport;

/// One CPU request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Access {
    /// Load the word at an address.
    Read(u64),
    /// Store a word at an address.
    Write {
        /// Target address.
        address: u64,
        /// Word to store.
        data: Word,
    },
}

impl Access {
    /// Address of the request.
    pub const fn address(self) -> u64 {
        match self {
            Self::Read(address) | Self::Write { address, .. } => address,
        }
    }

    /// Request signals for this access.
    pub fn inputs(self) -> CacheInputs {
        match self {
            Self::Read(address) => CacheInputs::read(address),
            Self::Write { address, data } => CacheInputs::write(address, data),
        }
    }
}

/// Top-level simulator: cache controller + backing memory.
#[derive(Debug)]
pub struct Simulator {
    /// The cache under test.
    pub cache: DataCache,
    /// Memory behind the cache.
    pub memory: Memory,
    cycles: u64,
    requests: u64,
    max_stall_cycles: u64,
    trace: bool,
}

impl Simulator {
    /// Builds the cache and a memory matching its geometry.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the cache configuration is invalid.
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let cache = DataCache::new(&config.cache)?;
        let memory = Memory::new(cache.geometry(), config.memory.fill_pattern);
        Ok(Self {
            cache,
            memory,
            cycles: 0,
            requests: 0,
            max_stall_cycles: config.general.max_stall_cycles,
            trace: config.general.trace,
        })
    }

    /// Cycles simulated so far.
    pub const fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Requests completed so far.
    pub const fn requests(&self) -> u64 {
        self.requests
    }

    /// Advances one clock cycle with the given request signals.
    ///
    /// The memory data bus of `inputs` is replaced by the memory's registered
    /// read data.
    pub fn step(&mut self, inputs: CacheInputs) -> CacheOutputs {
        let inputs = inputs.with_memory_data(self.memory.read_data().clone());
        let outputs = self.cache.tick(&inputs);
        self.memory.clock(&outputs);
        self.cycles += 1;
        outputs
    }

    /// Advances one clock cycle with no request asserted.
    pub fn idle(&mut self) -> CacheOutputs {
        self.step(CacheInputs::default())
    }

    /// Holds `access` on the bus until it is serviced.
    ///
    /// # Returns
    ///
    /// The outputs of the cycle that serviced the request.
    ///
    /// # Errors
    ///
    /// Returns `SimError::Stalled` if the request is not serviced within
    /// `max_stall_cycles` cycles.
    pub fn access(&mut self, access: Access) -> Result<CacheOutputs, SimError> {
        let start = self.cycles;
        loop {
            let outputs = self.step(access.inputs());
            let spent = self.cycles - start;
            if outputs.ready {
                self.requests += 1;
                if self.trace {
                    debug!(
                        request = ?access,
                        cycles = spent,
                        read_data = outputs.read_data,
                        "request serviced"
                    );
                }
                return Ok(outputs);
            }
            if spent >= self.max_stall_cycles {
                return Err(SimError::Stalled {
                    address: access.address(),
                    cycles: spent,
                });
            }
        }
    }

    /// Blocking read of the word at `address`.
    ///
    /// # Errors
    ///
    /// See [`Simulator::access`].
    pub fn read(&mut self, address: u64) -> Result<Word, SimError> {
        Ok(self.access(Access::Read(address))?.read_data)
    }

    /// Blocking write of `data` at `address`.
    ///
    /// # Errors
    ///
    /// See [`Simulator::access`].
    pub fn write(&mut self, address: u64, data: Word) -> Result<(), SimError> {
        self.access(Access::Write { address, data }).map(|_| ())
    }

    /// Replays a sequence of requests and returns the resulting report.
    ///
    /// # Errors
    ///
    /// Stops at the first request that stalls.
    pub fn run(&mut self, accesses: &[Access]) -> Result<RunReport, SimError> {
        for access in accesses {
            let _ = self.access(*access)?;
        }
        Ok(self.report())
    }

    /// Pulses reset on the cache and clears the memory read register.
    pub fn reset(&mut self) {
        self.cache.reset();
        self.memory.reset();
    }

    /// Snapshot of the run statistics.
    pub fn report(&self) -> RunReport {
        RunReport {
            requests: self.requests,
            cycles: self.cycles,
            memory_reads: self.memory.reads(),
            memory_writes: self.memory.writes(),
            cache: self.cache.stats().clone(),
        }
    }
}
