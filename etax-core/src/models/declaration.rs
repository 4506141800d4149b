use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::storage::coerce::{decimal_or_zero, opt_string, opt_year, pick, string_or_empty};

/// Lifecycle of a yearly declaration. Draft → Submitted is the only
/// transition and Submitted is terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclarationStatus {
    #[default]
    Draft,
    Submitted,
}

impl DeclarationStatus {
    /// Parses a stored value; anything other than exactly `"submitted"`
    /// is a draft.
    pub fn parse(s: &str) -> Self {
        if s == "submitted" { Self::Submitted } else { Self::Draft }
    }
}

/// The per-year declaration with its computed totals.
///
/// There is at most one of these per tax year; it is created as a draft when
/// the user reviews the computed figures and becomes submitted once filed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Declaration {
    pub year: i32,
    pub incomes_total: Decimal,
    pub deductions_total: Decimal,
    pub tax_base: Decimal,
    pub tax_due: Decimal,
    pub created_at: DateTime<Utc>,
    pub status: DeclarationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
}

impl Declaration {
    /// Rebuilds a declaration from a raw stored value.
    ///
    /// Returns `None` only when the year is unusable; everything else
    /// defaults. An unrecognized status is a draft, and a submitted record
    /// missing its timestamp keeps `submitted_at` empty until the next save
    /// stamps it.
    pub fn from_value(value: &Value) -> Option<Self> {
        let year = opt_year(pick(value, &["year"]))?;
        let created_at = pick(value, &["createdAt"])
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(Utc::now);
        let submitted_at = opt_string(pick(value, &["submittedAt"]))
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc));
        Some(Self {
            year,
            incomes_total: decimal_or_zero(pick(value, &["incomesTotal"])),
            deductions_total: decimal_or_zero(pick(value, &["deductionsTotal"])),
            tax_base: decimal_or_zero(pick(value, &["taxBase"])),
            tax_due: decimal_or_zero(pick(value, &["taxDue"])),
            created_at,
            status: DeclarationStatus::parse(&string_or_empty(pick(value, &["status"]))),
            submitted_at,
        })
    }
}
