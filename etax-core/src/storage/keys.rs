//! Storage key layout.
//!
//! | key                           | contents                                 |
//! |-------------------------------|------------------------------------------|
//! | `@declarations_index`         | JSON array of archive record ids         |
//! | `@declaration:<id>`           | one archived `DeclarationRecord`         |
//! | `archive:<...>`               | pre-migration legacy blob (object/array) |
//! | `etaxes.incomes.<year>`       | canonical incomes for a year             |
//! | `etaxes.deductions.<year>`    | canonical deductions for a year          |
//! | `etaxes.declarations.<year>`  | the year's declaration                   |
//! | `etaxes.person`               | the taxpayer profile                     |
//! | `incomes_<year>`              | CSV-imported income cache                |

pub const INDEX_KEY: &str = "@declarations_index";
pub const ITEM_PREFIX: &str = "@declaration:";
pub const LEGACY_PREFIX: &str = "archive:";

pub const INCOMES_PREFIX: &str = "etaxes.incomes.";
pub const DEDUCTIONS_PREFIX: &str = "etaxes.deductions.";
pub const DECLARATIONS_PREFIX: &str = "etaxes.declarations.";
pub const PERSON_KEY: &str = "etaxes.person";
pub const IMPORTED_INCOMES_PREFIX: &str = "incomes_";

pub fn incomes_key(year: i32) -> String {
    format!("{INCOMES_PREFIX}{year}")
}

pub fn deductions_key(year: i32) -> String {
    format!("{DEDUCTIONS_PREFIX}{year}")
}

pub fn declaration_key(year: i32) -> String {
    format!("{DECLARATIONS_PREFIX}{year}")
}

pub fn item_key(id: &str) -> String {
    format!("{ITEM_PREFIX}{id}")
}

pub fn legacy_key(id: &str) -> String {
    format!("{LEGACY_PREFIX}{id}")
}

pub fn imported_incomes_key(year: i32) -> String {
    format!("{IMPORTED_INCOMES_PREFIX}{year}")
}
