//! Simulation statistics collection and reporting.
//!
//! This module tracks performance metrics for the cache model. It provides:
//! 1. **Controller events:** Hits, misses, fills, evictions, write-backs, stalls.
//! 2. **Prefetch outcomes:** Triggers, issued reads, insertions, drops, supersessions.
//! 3. **Run report:** Request-level totals combined with the controller counters.

use serde::Serialize;

/// Counters maintained by the cache controller.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Clock cycles seen by the controller.
    pub cycles: u64,
    /// Cycles with neither enable asserted.
    pub idle_cycles: u64,
    /// Reads serviced from a resident block.
    pub read_hits: u64,
    /// Writes serviced into a resident block.
    pub write_hits: u64,
    /// Requests that found their block absent and started a refill.
    pub misses: u64,
    /// Blocks installed by demand refills.
    pub fills: u64,
    /// Valid blocks replaced by demand refills.
    pub evictions: u64,
    /// Dirty blocks written back on eviction.
    pub writebacks: u64,
    /// Refill cycles that found no eviction candidate.
    pub stall_cycles: u64,
    /// Refills dropped because the request changed or was withdrawn.
    pub abandoned_misses: u64,
    /// Refills that became unnecessary because a prefetch brought the block in.
    pub prefetch_covered_misses: u64,
    /// Prefetch targets that took over the slot; repeats of the tracked block are not counted.
    pub prefetch_triggers: u64,
    /// Prefetch reads driven on the memory read channel.
    pub prefetch_issued: u64,
    /// Prefetched blocks installed into a free way.
    pub prefetch_inserted: u64,
    /// Prefetched blocks discarded (set full or block already resident).
    pub prefetch_dropped: u64,
    /// Pending prefetches replaced by a newer trigger.
    pub prefetch_superseded: u64,
}

impl CacheStats {
    /// Total serviced hits, including the re-issue that follows each refill.
    pub const fn hits(&self) -> u64 {
        self.read_hits + self.write_hits
    }
}

/// Summary of a simulation run.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RunReport {
    /// CPU requests completed.
    pub requests: u64,
    /// Total simulated cycles.
    pub cycles: u64,
    /// Memory blocks written by the backing store.
    pub memory_writes: u64,
    /// Memory blocks read by the backing store.
    pub memory_reads: u64,
    /// Controller counters.
    pub cache: CacheStats,
}

impl RunReport {
    /// Fraction of requests that missed on first issue.
    pub fn miss_ratio(&self) -> f64 {
        if self.requests == 0 {
            0.0
        } else {
            self.cache.misses as f64 / self.requests as f64
        }
    }

    /// Average cycles per completed request.
    pub fn cycles_per_request(&self) -> f64 {
        let req = if self.requests == 0 { 1 } else { self.requests };
        self.cycles as f64 / req as f64
    }

    /// Prints the report to stdout.
    pub fn print(&self) {
        let s = &self.cache;
        let cyc = if self.cycles == 0 { 1 } else { self.cycles };
        println!("\n==========================================================");
        println!("L1 DATA CACHE SIMULATION STATISTICS");
        println!("==========================================================");
        println!("sim_cycles               {}", self.cycles);
        println!("sim_requests             {}", self.requests);
        println!("sim_cycles_per_request   {:.4}", self.cycles_per_request());
        println!("----------------------------------------------------------");
        println!("CONTROLLER");
        println!("  hits.read              {}", s.read_hits);
        println!("  hits.write             {}", s.write_hits);
        println!("  misses                 {}", s.misses);
        println!("  miss_ratio             {:.2}%", self.miss_ratio() * 100.0);
        println!("  fills                  {}", s.fills);
        println!("  evictions              {}", s.evictions);
        println!("  writebacks             {}", s.writebacks);
        println!(
            "  stalls.refill          {} ({:.2}%)",
            s.stall_cycles,
            (s.stall_cycles as f64 / cyc as f64) * 100.0
        );
        println!(
            "  cycles.idle            {} ({:.2}%)",
            s.idle_cycles,
            (s.idle_cycles as f64 / cyc as f64) * 100.0
        );
        println!("  misses.abandoned       {}", s.abandoned_misses);
        println!("----------------------------------------------------------");
        println!("PREFETCH");
        println!("  pf.triggers            {}", s.prefetch_triggers);
        println!("  pf.issued              {}", s.prefetch_issued);
        println!("  pf.inserted            {}", s.prefetch_inserted);
        println!("  pf.dropped             {}", s.prefetch_dropped);
        println!("  pf.superseded          {}", s.prefetch_superseded);
        println!("  pf.covered_misses      {}", s.prefetch_covered_misses);
        println!("----------------------------------------------------------");
        println!("MEMORY");
        println!("  mem.reads              {}", self.memory_reads);
        println!("  mem.writes             {}", self.memory_writes);
        println!("==========================================================");
    }
}
