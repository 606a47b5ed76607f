//! In-process storage backend.
//!
//! Selected with a `memory://` connection string. State lives only as long
//! as the process.

pub mod memory_store;

pub use memory_store::MemoryStore;
