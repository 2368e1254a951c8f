//! Data Cache Controller Unit Tests.
//!
//! Drives `DataCache::tick` one cycle at a time with hand-supplied memory
//! data, so every output can be checked in the cycle it is driven.
//!
//! Default geometry: 4 sets of 8-byte blocks. Address `tag << 5 | index << 3
//! | offset`, so 0x20, 0x40, 0x60 are tags 1, 2, 3 of set 0 and 0x28 is tag 1
//! of set 1.

use l1d_core::common::{Block, Word};
use l1d_core::config::{CacheConfig, Prefetcher, ResetPolicy};
use l1d_core::core::units::cache::{
    CacheInputs, CacheOutputs, ControllerState, DataCache, Lookup, Way,
};
use l1d_core::core::units::prefetch::SlotState;
use pretty_assertions::assert_eq;

use crate::common::harness::{bare_cache, cache_config, init_tracing};

fn block(words: &[Word]) -> Block {
    Block::from_words(words.to_vec())
}

fn next_block_cache() -> DataCache {
    init_tracing();
    DataCache::new(&cache_config(4, Prefetcher::NextBlock)).unwrap()
}

/// Miss cycle followed by the refill cycle; returns the refill outputs.
fn install(cache: &mut DataCache, addr: u64, words: &[Word]) -> CacheOutputs {
    let miss = cache.tick(&CacheInputs::read(addr));
    assert!(!miss.hit, "{addr:#x} should miss before install");
    cache.tick(&CacheInputs::read(addr).with_memory_data(block(words)))
}

// ══════════════════════════════════════════════════════════
// 1. Miss and Refill
// ══════════════════════════════════════════════════════════

#[test]
fn cold_read_miss_requests_the_block() {
    let mut cache = bare_cache();
    let out = cache.tick(&CacheInputs::read(0x24));

    assert!(!out.hit);
    assert!(!out.ready);
    assert_eq!(out.memory_read(), Some(0x20));
    assert!(!out.memory_read_is_prefetch);
    assert_eq!(out.memory_write(), None);
    assert_eq!(cache.state(), ControllerState::MissHandling);
    assert_eq!(cache.stats().misses, 1);
}

#[test]
fn refill_installs_the_block_then_the_retry_hits() {
    let mut cache = bare_cache();
    let refill = install(&mut cache, 0x24, &[0x11, 0x22]);

    assert!(!refill.ready, "the refill cycle does not service the request");
    assert_eq!(refill.memory_read(), Some(0x20));
    assert_eq!(cache.state(), ControllerState::Servicing);

    let line = cache.line(0, Way::A);
    assert!(line.valid);
    assert!(!line.dirty);
    assert_eq!(line.tag, 1);
    assert_eq!(line.data.words(), &[0x11, 0x22]);

    let retry = cache.tick(&CacheInputs::read(0x24));
    assert!(retry.hit);
    assert!(retry.ready);
    assert_eq!(retry.read_data, 0x22);
    assert_eq!(retry.memory_read(), None);

    assert_eq!(cache.stats().fills, 1);
    assert_eq!(cache.stats().read_hits, 1);
}

#[test]
fn second_block_in_a_set_fills_the_free_way() {
    let mut cache = bare_cache();
    let _ = install(&mut cache, 0x20, &[1, 2]);
    let out = install(&mut cache, 0x40, &[3, 4]);

    assert_eq!(out.memory_write(), None);
    assert_eq!(cache.line(0, Way::B).tag, 2);
    assert_eq!(cache.line(0, Way::A).tag, 1);
    assert_eq!(cache.stats().evictions, 0);
    assert_eq!(cache.storage().recency(0), [1, 0]);
}

// ══════════════════════════════════════════════════════════
// 2. Hits
// ══════════════════════════════════════════════════════════

#[test]
fn write_hit_dirties_the_line_and_keeps_read_data() {
    let mut cache = bare_cache();
    let _ = install(&mut cache, 0x20, &[0x11, 0x22]);
    assert_eq!(cache.tick(&CacheInputs::read(0x20)).read_data, 0x11);

    let out = cache.tick(&CacheInputs::write(0x24, 0xbeef));
    assert!(out.ready);
    assert_eq!(out.read_data, 0x11);

    let line = cache.line(0, Way::A);
    assert!(line.dirty);
    assert_eq!(line.data.words(), &[0x11, 0xbeef]);
    assert_eq!(cache.stats().write_hits, 1);
}

#[test]
fn write_wins_when_both_enables_are_asserted() {
    let mut cache = bare_cache();
    let _ = install(&mut cache, 0x20, &[0x11, 0x22]);

    let out = cache.tick(&CacheInputs {
        address: 0x20,
        write_data: 5,
        read_enable: true,
        write_enable: true,
        ..CacheInputs::default()
    });

    assert!(out.ready);
    assert_eq!(out.read_data, 0);
    assert_eq!(cache.line(0, Way::A).data.words(), &[5, 0x22]);
    assert_eq!(cache.stats().write_hits, 1);
    assert_eq!(cache.stats().read_hits, 0);
}

#[test]
fn idle_cycle_drives_nothing() {
    let mut cache = bare_cache();
    let out = cache.tick(&CacheInputs::default());

    assert_eq!(out, CacheOutputs::default());
    assert_eq!(cache.state(), ControllerState::Servicing);
    assert_eq!(cache.stats().idle_cycles, 1);
}

#[test]
fn hit_output_does_not_depend_on_enables() {
    let mut cache = bare_cache();
    let _ = install(&mut cache, 0x20, &[1, 2]);

    let out = cache.tick(&CacheInputs {
        address: 0x24,
        ..CacheInputs::default()
    });
    assert!(out.hit);
    assert!(!out.ready);
    assert_eq!(out.memory_read(), None);
    assert_eq!(cache.stats().read_hits, 0);
}

#[test]
fn probe_reports_the_hitting_way() {
    let mut cache = bare_cache();
    let _ = install(&mut cache, 0x20, &[1, 2]);
    let _ = install(&mut cache, 0x40, &[3, 4]);

    assert_eq!(cache.probe(0x24), Lookup::Hit(Way::A));
    assert_eq!(cache.probe(0x40).way(), Some(Way::B));
    assert_eq!(cache.probe(0x60), Lookup::Miss);
    assert!(cache.contains(0x44));
    assert!(!cache.contains(0x28));
}

// ══════════════════════════════════════════════════════════
// 3. Abandoned Refills
// ══════════════════════════════════════════════════════════

#[test]
fn withdrawn_request_abandons_the_refill() {
    let mut cache = bare_cache();
    let _ = cache.tick(&CacheInputs::read(0x20));
    let _ = cache.tick(&CacheInputs::default().with_memory_data(block(&[1, 2])));

    assert_eq!(cache.state(), ControllerState::Servicing);
    assert_eq!(cache.storage().valid_count(0), 0);
    assert_eq!(cache.stats().abandoned_misses, 1);
    assert_eq!(cache.stats().fills, 0);
}

#[test]
fn changed_address_abandons_the_refill() {
    let mut cache = bare_cache();
    let _ = cache.tick(&CacheInputs::read(0x20));
    let out = cache.tick(&CacheInputs::read(0x40).with_memory_data(block(&[1, 2])));

    assert_eq!(out.memory_read(), Some(0x40));
    assert_eq!(cache.state(), ControllerState::Servicing);
    assert_eq!(cache.storage().valid_count(0), 0);
    assert_eq!(cache.stats().abandoned_misses, 1);

    let _ = cache.tick(&CacheInputs::read(0x40));
    assert_eq!(cache.state(), ControllerState::MissHandling);
    assert_eq!(cache.stats().misses, 2);
}

// ══════════════════════════════════════════════════════════
// 4. Replacement and Write-Back
// ══════════════════════════════════════════════════════════

/// Tag 1 fills A, gets written, tag 2 fills B, tag 3 evicts A and its dirty
/// data is written back in the same cycle as the replacing fill.
#[test]
fn dirty_victim_is_written_back_during_the_fill() {
    let mut cache = bare_cache();
    let _ = install(&mut cache, 0x20, &[1, 2]);
    assert!(cache.tick(&CacheInputs::write(0x20, 0xaa)).ready);
    let _ = install(&mut cache, 0x40, &[3, 4]);
    assert!(cache.tick(&CacheInputs::read(0x40)).ready);
    assert_eq!(cache.storage().evict_candidate(0), Some(Way::A));

    let miss = cache.tick(&CacheInputs::read(0x60));
    assert_eq!(miss.memory_read(), Some(0x60));
    assert_eq!(miss.memory_write(), None);

    let fill = cache.tick(&CacheInputs::read(0x60).with_memory_data(block(&[5, 6])));
    assert_eq!(fill.memory_write(), Some((0x20, &block(&[0xaa, 2]))));

    let line = cache.line(0, Way::A);
    assert_eq!(line.tag, 3);
    assert!(!line.dirty);
    assert_eq!(line.data.words(), &[5, 6]);
    assert_eq!(cache.line(0, Way::B).tag, 2);

    let retry = cache.tick(&CacheInputs::read(0x60));
    assert!(retry.ready);
    assert_eq!(retry.read_data, 5);
    assert_eq!(retry.memory_write(), None, "write-back lasts one cycle");

    assert_eq!(cache.stats().evictions, 1);
    assert_eq!(cache.stats().writebacks, 1);
}

#[test]
fn clean_victim_is_replaced_without_memory_write() {
    let mut cache = bare_cache();
    let _ = install(&mut cache, 0x20, &[1, 2]);
    let _ = install(&mut cache, 0x40, &[3, 4]);
    let fill = install(&mut cache, 0x60, &[5, 6]);

    assert_eq!(fill.memory_write(), None);
    assert_eq!(cache.line(0, Way::A).tag, 3);
    assert_eq!(cache.stats().evictions, 1);
    assert_eq!(cache.stats().writebacks, 0);
}

#[test]
fn alternating_hits_move_the_victim() {
    let mut cache = bare_cache();
    let _ = install(&mut cache, 0x20, &[1, 2]);
    let _ = install(&mut cache, 0x40, &[3, 4]);

    for (addr, victim) in [(0x20, Way::B), (0x40, Way::A), (0x20, Way::B)] {
        assert!(cache.tick(&CacheInputs::read(addr)).ready);
        assert_eq!(cache.storage().evict_candidate(0), Some(victim));
    }

    let _ = install(&mut cache, 0x60, &[5, 6]);
    assert_eq!(cache.line(0, Way::A).tag, 1);
    assert_eq!(cache.line(0, Way::B).tag, 3);
}

// ══════════════════════════════════════════════════════════
// 5. Reset
// ══════════════════════════════════════════════════════════

#[test]
fn reset_clears_lines_and_returns_to_servicing() {
    let mut cache = bare_cache();
    let _ = install(&mut cache, 0x20, &[1, 2]);
    let _ = cache.tick(&CacheInputs::read(0x20));
    let _ = cache.tick(&CacheInputs::read(0x40));
    assert_eq!(cache.state(), ControllerState::MissHandling);

    cache.reset();
    assert_eq!(cache.state(), ControllerState::Servicing);
    assert_eq!(cache.read_data(), 0);
    assert_eq!(cache.storage().valid_count(0), 0);
    assert!(!cache.contains(0x20));
}

#[test]
fn keep_lines_reset_preserves_contents() {
    init_tracing();
    let mut cache = DataCache::new(&CacheConfig {
        reset_policy: ResetPolicy::KeepLines,
        ..cache_config(4, Prefetcher::None)
    })
    .unwrap();
    let _ = install(&mut cache, 0x20, &[1, 2]);
    assert!(cache.tick(&CacheInputs::write(0x20, 9)).ready);

    cache.reset();
    assert!(cache.contains(0x20));
    assert!(cache.line(0, Way::A).dirty);
    assert_eq!(cache.read_data(), 0);
}

// ══════════════════════════════════════════════════════════
// 6. Prefetching
// ══════════════════════════════════════════════════════════

#[test]
fn disabled_prefetcher_never_reads() {
    let mut cache = bare_cache();
    assert_eq!(cache.prefetch_slot(), None);

    let _ = install(&mut cache, 0x20, &[1, 2]);
    let hit = cache.tick(&CacheInputs::read(0x20));
    let idle = cache.tick(&CacheInputs::default());
    assert_eq!(hit.memory_read(), None);
    assert_eq!(idle.memory_read(), None);
    assert_eq!(cache.stats().prefetch_triggers, 0);
}

#[test]
fn refill_prefetches_the_next_block() {
    let mut cache = next_block_cache();
    let _ = cache.tick(&CacheInputs::read(0x20));
    assert_eq!(cache.prefetch_slot(), Some(SlotState::Idle));

    let _ = cache.tick(&CacheInputs::read(0x20).with_memory_data(block(&[1, 2])));
    assert_eq!(cache.prefetch_slot(), Some(SlotState::Issue(0x28)));

    let hit = cache.tick(&CacheInputs::read(0x20));
    assert!(hit.ready);
    assert_eq!(hit.memory_read(), Some(0x28));
    assert!(hit.memory_read_is_prefetch);
    assert_eq!(cache.prefetch_slot(), Some(SlotState::Await(0x28)));

    let arrival = cache.tick(&CacheInputs::default().with_memory_data(block(&[7, 8])));
    assert_eq!(arrival.memory_read(), None);
    assert_eq!(cache.prefetch_slot(), Some(SlotState::Idle));
    assert!(cache.contains(0x28));
    assert_eq!(cache.line(1, Way::A).data.words(), &[7, 8]);
    assert_eq!(cache.storage().recency(1), [0, 1]);

    let stats = cache.stats();
    assert_eq!(stats.prefetch_triggers, 1);
    assert_eq!(stats.prefetch_issued, 1);
    assert_eq!(stats.prefetch_inserted, 1);
}

#[test]
fn hits_on_one_block_count_one_trigger() {
    let mut cache = next_block_cache();
    let _ = install(&mut cache, 0x20, &[1, 2]);
    assert_eq!(cache.stats().prefetch_triggers, 1);

    assert!(cache.tick(&CacheInputs::read(0x20)).ready);
    assert_eq!(cache.prefetch_slot(), Some(SlotState::Await(0x28)));
    assert!(cache.tick(&CacheInputs::read(0x24)).ready);
    assert_eq!(cache.prefetch_slot(), Some(SlotState::Idle));

    let stats = cache.stats();
    assert_eq!(stats.prefetch_triggers, 1);
    assert_eq!(stats.prefetch_issued, 1);
    assert_eq!(stats.read_hits, 2);
}

#[test]
fn demand_miss_owns_the_read_channel() {
    let mut cache = next_block_cache();
    let _ = install(&mut cache, 0x20, &[1, 2]);
    assert_eq!(cache.prefetch_slot(), Some(SlotState::Issue(0x28)));

    let miss = cache.tick(&CacheInputs::read(0x40));
    assert_eq!(miss.memory_read(), Some(0x40));
    assert!(!miss.memory_read_is_prefetch);
    assert_eq!(cache.prefetch_slot(), Some(SlotState::Issue(0x28)));

    let _ = cache.tick(&CacheInputs::read(0x40).with_memory_data(block(&[3, 4])));
    assert_eq!(cache.prefetch_slot(), Some(SlotState::Issue(0x48)));
    assert_eq!(cache.stats().prefetch_superseded, 1);
    assert_eq!(cache.stats().prefetch_issued, 0);
}

#[test]
fn prefetch_into_a_full_set_changes_nothing() {
    let mut cache = next_block_cache();
    let mut outputs = vec![
        install(&mut cache, 0x48, &[2, 2]),
        install(&mut cache, 0x68, &[3, 3]),
        install(&mut cache, 0x20, &[1, 1]),
    ];
    assert_eq!(cache.prefetch_slot(), Some(SlotState::Issue(0x28)));
    let before = cache.storage().set(1).to_vec();

    outputs.push(cache.tick(&CacheInputs::default()));
    assert_eq!(cache.prefetch_slot(), Some(SlotState::Await(0x28)));
    outputs.push(cache.tick(&CacheInputs::default().with_memory_data(block(&[9, 9]))));

    assert_eq!(cache.storage().set(1), before.as_slice());
    assert!(!cache.contains(0x28));
    assert!(outputs.iter().all(|out| out.memory_write().is_none()));
    assert_eq!(cache.stats().prefetch_dropped, 1);
    assert_eq!(cache.stats().evictions, 0);
}

#[test]
fn prefetch_of_a_resident_block_is_dropped() {
    let mut cache = next_block_cache();
    let _ = install(&mut cache, 0x28, &[1, 2]);
    let _ = install(&mut cache, 0x20, &[3, 4]);
    assert_eq!(cache.prefetch_slot(), Some(SlotState::Issue(0x28)));

    let _ = cache.tick(&CacheInputs::default());
    let _ = cache.tick(&CacheInputs::default().with_memory_data(block(&[9, 9])));

    assert_eq!(cache.storage().valid_count(1), 1);
    assert_eq!(cache.line(1, Way::A).data.words(), &[1, 2]);
    assert_eq!(cache.stats().prefetch_dropped, 1);
}
