//! Wheel Store: key-value store implementations.
//!
//! `JsonFileStore` keeps every entry in one JSON object on disk; it is the
//! store the API server uses. `MemoryStore` keeps entries for the life of
//! the process only.

pub mod json_file_store;
pub mod memory_store;

pub use json_file_store::JsonFileStore;
pub use memory_store::MemoryStore;
