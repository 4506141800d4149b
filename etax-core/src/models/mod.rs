mod archive_record;
mod declaration;
mod deduction;
mod income;
mod person;

pub use archive_record::{Attachment, DeclarationRecord};
pub use declaration::{Declaration, DeclarationStatus};
pub use deduction::Deduction;
pub use income::{ImportedIncome, Income, IncomeType};
pub use person::Person;
