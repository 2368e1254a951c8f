//! System Components.
//!
//! Everything outside the cache controller that it talks to. Currently the
//! backing memory on the far side of the memory bus.

/// Synchronous block memory.
pub mod memory;

pub use memory::Memory;
