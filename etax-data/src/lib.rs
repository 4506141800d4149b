pub mod loader;

pub use loader::{IncomeCsvLoader, IncomeImportError};
