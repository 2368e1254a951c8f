//! Hardware Prefetcher.
//!
//! A prefetcher is split in two parts:
//! 1. **Address generation:** a `Prefetcher` decides which block to fetch after a serviced access.
//! 2. **Slot:** a `PrefetchUnit` tracks the single in-flight request through
//!    `Idle -> Issue -> Await` and hands the arriving block to the controller.
//!
//! The slot never blocks demand traffic: it only drives the memory read
//! channel in cycles where no demand miss owns it, and a new trigger replaces
//! a pending request instead of queueing behind it.

/// Next-block prefetcher (prefetches the sequentially following block).
pub mod next_block;

pub use self::next_block::NextBlockPrefetcher;

use serde::Serialize;

/// Trait for prefetch address generators.
pub trait Prefetcher: Send + Sync {
    /// Observes a serviced access or refill and names the block to prefetch.
    ///
    /// # Arguments
    ///
    /// * `addr` - Block address of the access.
    /// * `hit` - Whether the access was a hit (false for a completed refill).
    ///
    /// # Returns
    ///
    /// The block address to prefetch, or `None`.
    fn observe(&mut self, addr: u64, hit: bool) -> Option<u64>;
}

/// Progress of the single prefetch slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum SlotState {
    /// Nothing pending.
    #[default]
    Idle,
    /// Waiting for a cycle in which the memory read channel is free.
    Issue(u64),
    /// The read was issued last cycle; the block is on the memory data bus now.
    Await(u64),
}

impl SlotState {
    /// Block address tracked by the slot.
    pub const fn address(self) -> Option<u64> {
        match self {
            Self::Idle => None,
            Self::Issue(addr) | Self::Await(addr) => Some(addr),
        }
    }
}

/// Slot state after one edge, and whether a pending request was replaced.
///
/// The in-flight request advances first (`Issue` moves to `Await` when the
/// channel was granted, `Await` completes); then a trigger for a different
/// block than the one tracked before the edge takes over the slot.
pub const fn next_slot(slot: SlotState, granted: bool, trigger: Option<u64>) -> (SlotState, bool) {
    let advanced = match slot {
        SlotState::Idle | SlotState::Await(_) => SlotState::Idle,
        SlotState::Issue(addr) => {
            if granted {
                SlotState::Await(addr)
            } else {
                SlotState::Issue(addr)
            }
        }
    };

    match (trigger, slot.address()) {
        (None, _) => (advanced, false),
        (Some(target), Some(tracked)) if target == tracked => (advanced, false),
        (Some(target), _) => (
            SlotState::Issue(target),
            matches!(advanced, SlotState::Issue(_) | SlotState::Await(_)),
        ),
    }
}

/// Effect of one clock edge on the slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SlotEdge {
    /// The trigger named a block other than the tracked one and took the slot.
    pub accepted: bool,
    /// A pending request was replaced by the trigger.
    pub superseded: bool,
}

/// Single-slot prefetch engine attached to the cache controller.
pub struct PrefetchUnit {
    generator: Box<dyn Prefetcher + Send + Sync>,
    slot: SlotState,
}

impl std::fmt::Debug for PrefetchUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrefetchUnit")
            .field("slot", &self.slot)
            .finish_non_exhaustive()
    }
}

impl PrefetchUnit {
    /// Creates an idle unit around an address generator.
    pub fn new(generator: Box<dyn Prefetcher + Send + Sync>) -> Self {
        Self {
            generator,
            slot: SlotState::Idle,
        }
    }

    /// Current slot state.
    pub const fn slot(&self) -> SlotState {
        self.slot
    }

    /// Block address that wants the memory read channel this cycle.
    pub const fn read_request(&self) -> Option<u64> {
        match self.slot {
            SlotState::Issue(addr) => Some(addr),
            _ => None,
        }
    }

    /// Block address whose data is on the memory data bus this cycle.
    pub const fn arriving(&self) -> Option<u64> {
        match self.slot {
            SlotState::Await(addr) => Some(addr),
            _ => None,
        }
    }

    /// Asks the generator for the block to prefetch after an access to `addr`.
    pub fn target(&mut self, addr: u64, hit: bool) -> Option<u64> {
        self.generator.observe(addr, hit)
    }

    /// Advances the slot at the clock edge.
    pub fn clock(&mut self, granted: bool, trigger: Option<u64>) -> SlotEdge {
        let accepted = trigger.is_some_and(|target| self.slot.address() != Some(target));
        let (next, superseded) = next_slot(self.slot, granted, trigger);
        if next != self.slot {
            tracing::trace!(from = ?self.slot, to = ?next, "prefetch slot");
        }
        self.slot = next;
        SlotEdge {
            accepted,
            superseded,
        }
    }

    /// Drops any pending request.
    pub fn reset(&mut self) {
        self.slot = SlotState::Idle;
    }
}
