// sentinel-core/src/infrastructure/store/mod.rs

pub mod json;
pub mod memory;

pub use json::JsonRunStore;
pub use memory::InMemoryRunStore;
