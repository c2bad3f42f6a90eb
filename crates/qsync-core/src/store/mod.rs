//! Store implementations that need no infrastructure.

mod glob;
mod memory;

pub use memory::MemoryCacheStore;
