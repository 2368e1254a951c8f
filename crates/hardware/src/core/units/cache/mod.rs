//! 2-Way Set-Associative Data Cache Controller.
//!
//! This module implements the cycle-level controller of an L1 data cache. It
//! models hit/miss evaluation, recency-counter replacement, dirty-line
//! write-back, and a single-block-ahead prefetcher. Each call to
//! [`DataCache::tick`] is one clock cycle: outputs are evaluated from the
//! pre-edge state, then every staged effect commits at the edge.

/// Controller state machine.
pub mod fsm;
/// Hit/miss evaluator.
pub mod lookup;
/// Cache replacement policy implementations.
pub mod policies;
/// Per-cycle boundary signals.
pub mod signals;
/// Way table with edge-committed writes.
pub mod storage;

pub use self::fsm::{ControllerState, Observation};
pub use self::lookup::Lookup;
pub use self::signals::{CacheInputs, CacheOutputs};
pub use self::storage::{SetStorage, Way, WayEntry};

use tracing::{debug, trace, warn};

use crate::common::{Block, CacheGeometry, ConfigError, DecodedAddr, Word};
use crate::config::{CacheConfig, Prefetcher as PrefetcherType, ResetPolicy};
use crate::core::units::prefetch::{NextBlockPrefetcher, PrefetchUnit, SlotState};
use crate::stats::CacheStats;

/// Cycle-level model of the 2-way L1 data cache controller.
#[derive(Debug)]
pub struct DataCache {
    geometry: CacheGeometry,
    storage: SetStorage,
    state: ControllerState,
    /// Block address of the refill in progress.
    miss_block: u64,
    read_data: Word,
    prefetch: Option<PrefetchUnit>,
    reset_policy: ResetPolicy,
    stats: CacheStats,
}

impl DataCache {
    /// Creates a cache with every way invalid, in the Servicing state.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the geometry is not implementable.
    pub fn new(config: &CacheConfig) -> Result<Self, ConfigError> {
        let geometry = config.geometry()?;
        let prefetch = match config.prefetcher {
            PrefetcherType::NextBlock => Some(PrefetchUnit::new(Box::new(
                NextBlockPrefetcher::new(geometry),
            ))),
            PrefetcherType::None => None,
        };

        debug!(
            sets = geometry.num_sets(),
            block_bytes = geometry.block_bytes(),
            tag_bits = geometry.tag_bits(),
            index_bits = geometry.index_bits(),
            offset_bits = geometry.offset_bits(),
            "data cache created"
        );

        Ok(Self {
            geometry,
            storage: SetStorage::new(geometry.num_sets(), geometry.words_per_block()),
            state: ControllerState::Servicing,
            miss_block: 0,
            read_data: 0,
            prefetch,
            reset_policy: config.reset_policy,
            stats: CacheStats::default(),
        })
    }

    /// Address layout of this cache.
    pub const fn geometry(&self) -> &CacheGeometry {
        &self.geometry
    }

    /// Current controller state.
    pub const fn state(&self) -> ControllerState {
        self.state
    }

    /// Controller counters.
    pub const fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// The way table.
    pub const fn storage(&self) -> &SetStorage {
        &self.storage
    }

    /// Contents of one way.
    pub fn line(&self, index: usize, way: Way) -> &WayEntry {
        self.storage.entry(index, way)
    }

    /// Current value of the read-data register.
    pub const fn read_data(&self) -> Word {
        self.read_data
    }

    /// State of the prefetch slot, or `None` when prefetching is disabled.
    pub fn prefetch_slot(&self) -> Option<SlotState> {
        self.prefetch.as_ref().map(PrefetchUnit::slot)
    }

    /// Evaluates hit/miss for an address against the current contents.
    pub fn probe(&self, address: u64) -> Lookup {
        lookup::evaluate(&self.storage, &self.geometry.decompose(address))
    }

    /// Returns `true` if the block containing `address` is resident.
    pub fn contains(&self, address: u64) -> bool {
        self.probe(address).is_hit()
    }

    /// Forces the controller to Servicing, clears the prefetcher and read
    /// register, and applies the configured reset policy to the lines.
    pub fn reset(&mut self) {
        self.state = ControllerState::Servicing;
        self.miss_block = 0;
        self.read_data = 0;
        if let Some(unit) = self.prefetch.as_mut() {
            unit.reset();
        }
        self.storage.reset(self.reset_policy);
        debug!(policy = ?self.reset_policy, "data cache reset");
    }

    /// Advances the controller by one clock cycle.
    ///
    /// # Arguments
    ///
    /// * `inputs` - Request and memory data bus sampled this cycle.
    ///
    /// # Returns
    ///
    /// The outputs driven this cycle.
    pub fn tick(&mut self, inputs: &CacheInputs) -> CacheOutputs {
        let addr = self.geometry.decompose(inputs.address);
        let block_addr = self.geometry.compose(addr.tag, addr.index);
        let active = inputs.is_active();
        let lookup = lookup::evaluate(&self.storage, &addr);
        let demand_miss = active && !lookup.is_hit();

        self.stats.cycles += 1;
        let mut out = CacheOutputs {
            hit: lookup.is_hit(),
            ..CacheOutputs::default()
        };

        // Demand misses own the read channel; the prefetcher only gets it otherwise.
        let mut granted = false;
        if demand_miss {
            out.memory_read_enable = true;
            out.memory_read_address = block_addr;
        } else if let Some(target) = self.prefetch.as_ref().and_then(PrefetchUnit::read_request) {
            out.memory_read_enable = true;
            out.memory_read_address = target;
            out.memory_read_is_prefetch = true;
            granted = true;
            self.stats.prefetch_issued += 1;
        }

        let mut serviced_block = None;
        let mut refilled_set = None;
        let mut can_fill = true;
        match self.state {
            ControllerState::Servicing => {
                if !active {
                    self.stats.idle_cycles += 1;
                } else if let Lookup::Hit(way) = lookup {
                    self.service_hit(&addr, way, inputs);
                    out.ready = true;
                    serviced_block = Some((block_addr, true));
                } else {
                    self.miss_block = block_addr;
                    self.stats.misses += 1;
                    debug!(
                        address = inputs.address,
                        set = addr.index,
                        tag = addr.tag,
                        write = inputs.write_enable,
                        "miss"
                    );
                }
            }
            ControllerState::MissHandling => {
                if !active || block_addr != self.miss_block {
                    self.stats.abandoned_misses += 1;
                    debug!(block = self.miss_block, "refill abandoned");
                } else if lookup.is_hit() {
                    self.stats.prefetch_covered_misses += 1;
                    debug!(block = block_addr, "refill covered by prefetch");
                } else {
                    can_fill = self.refill(&addr, &inputs.memory_read_data, &mut out);
                    if can_fill {
                        serviced_block = Some((block_addr, false));
                        refilled_set = Some(addr.index);
                    }
                }
            }
        }

        if let Some(target) = self.prefetch.as_ref().and_then(PrefetchUnit::arriving) {
            self.insert_prefetch(target, &inputs.memory_read_data, refilled_set);
        }

        let next = fsm::next_state(
            self.state,
            Observation {
                active,
                hit: lookup.is_hit(),
                same_request: block_addr == self.miss_block,
                can_fill,
            },
        );
        if next != self.state {
            debug!(from = ?self.state, to = ?next, "controller state");
        }

        // Clock edge.
        self.storage.commit();
        if let Some(unit) = self.prefetch.as_mut() {
            let trigger = serviced_block.and_then(|(block, hit)| unit.target(block, hit));
            let edge = unit.clock(granted, trigger);
            if edge.accepted {
                self.stats.prefetch_triggers += 1;
            }
            if edge.superseded {
                self.stats.prefetch_superseded += 1;
            }
        }
        self.state = next;

        out.read_data = self.read_data;
        out
    }

    fn service_hit(&mut self, addr: &DecodedAddr, way: Way, inputs: &CacheInputs) {
        if inputs.write_enable {
            self.storage.write(addr.index, way, addr.offset, inputs.write_data);
            self.stats.write_hits += 1;
        } else {
            self.read_data = self.storage.read(addr.index, way, addr.offset);
            self.stats.read_hits += 1;
        }
        self.storage.touch(addr.index, way);
        trace!(
            set = addr.index,
            way = ?way,
            offset = addr.offset,
            write = inputs.write_enable,
            "hit"
        );
    }

    /// Installs the refill block; returns `false` if no way could take it.
    fn refill(&mut self, addr: &DecodedAddr, block: &Block, out: &mut CacheOutputs) -> bool {
        let index = addr.index;
        let way = if let Some(way) = self.storage.first_invalid(index) {
            way
        } else if let Some(victim) = self.storage.evict_candidate(index) {
            let line = self.storage.entry(index, victim);
            self.stats.evictions += 1;
            if line.dirty {
                out.memory_write_enable = true;
                out.memory_write_address = self.geometry.compose(line.tag, index);
                out.memory_write_data = line.data.clone();
                self.stats.writebacks += 1;
                debug!(
                    set = index,
                    way = ?victim,
                    address = out.memory_write_address,
                    data = %line.data,
                    "write-back"
                );
            }
            victim
        } else {
            self.stats.stall_cycles += 1;
            warn!(
                set = index,
                recency = ?self.storage.recency(index),
                "no eviction candidate; refill stalled"
            );
            return false;
        };

        debug!(
            set = index,
            way = ?way,
            tag = addr.tag,
            "fill"
        );
        self.storage.fill(index, way, addr.tag, block.clone());
        self.storage.touch(index, way);
        self.stats.fills += 1;
        true
    }

    /// Places a prefetched block into a free way; never evicts.
    ///
    /// A set already taking a demand refill this cycle is treated as full.
    fn insert_prefetch(&mut self, block_addr: u64, block: &Block, refilled_set: Option<usize>) {
        let addr = self.geometry.decompose(block_addr);
        if refilled_set == Some(addr.index) {
            self.stats.prefetch_dropped += 1;
            trace!(block = block_addr, "prefetch dropped: set refilling");
        } else if lookup::evaluate(&self.storage, &addr).is_hit() {
            self.stats.prefetch_dropped += 1;
            trace!(block = block_addr, "prefetch dropped: resident");
        } else if let Some(way) = self.storage.first_invalid(addr.index) {
            self.storage.fill(addr.index, way, addr.tag, block.clone());
            self.storage.touch(addr.index, way);
            self.stats.prefetch_inserted += 1;
            debug!(
                block = block_addr,
                set = addr.index,
                way = ?way,
                "prefetch inserted"
            );
        } else {
            self.stats.prefetch_dropped += 1;
            trace!(block = block_addr, "prefetch dropped: set full");
        }
    }
}
