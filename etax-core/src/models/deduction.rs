use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::storage::coerce::{decimal_or_zero, pick, string_or_empty};

/// One tax relief entry for a year (donations, insurance, children, ...).
///
/// The statutory cap on the relief total is enforced by the entry screen,
/// not here — the store persists whatever the caller hands it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deduction {
    pub id: String,
    pub name: String,
    pub amount: Decimal,
}

impl Deduction {
    /// Rebuilds a deduction from a raw stored value, defaulting every field.
    pub fn from_value(value: &Value) -> Self {
        Self {
            id: string_or_empty(pick(value, &["id"])),
            name: string_or_empty(pick(value, &["name"])),
            amount: decimal_or_zero(pick(value, &["amount"])),
        }
    }
}
