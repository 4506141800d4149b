pub mod coerce;
pub mod keys;
pub mod memory;
pub mod store;

pub use memory::MemoryStore;
pub use store::{KeyValueStore, StorageError};
