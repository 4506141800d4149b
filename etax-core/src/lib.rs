pub mod archive;
pub mod calc;
pub mod models;
pub mod nap;
pub mod records;
pub mod storage;
pub mod validators;

pub use archive::{Archive, MigrationReport};
pub use calc::{TaxInput, TaxResult, calculate_tax, net_calc};
pub use models::*;
pub use nap::{NapPayload, generate_nap_xml};
pub use records::RecordStore;
pub use storage::{KeyValueStore, MemoryStore, StorageError};
