// Adapters layer: concrete storers and seed data sources.

pub mod fixtures;
pub mod memory;

pub use memory::MemoryStorer;
