use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::storage::coerce::{decimal_or_zero, opt_string, pick, string_or_empty};

/// Category of an income line, mapped to a NAP income code on export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncomeType {
    Employment,
    Civil,
    Rent,
    #[default]
    Other,
}

impl IncomeType {
    /// Parses a stored value; anything unrecognized becomes [`IncomeType::Other`].
    pub fn parse(s: &str) -> Self {
        match s {
            "employment" => Self::Employment,
            "civil" => Self::Civil,
            "rent" => Self::Rent,
            _ => Self::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Employment => "employment",
            Self::Civil => "civil",
            Self::Rent => "rent",
            Self::Other => "other",
        }
    }
}

/// One income line for a tax year.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Income {
    pub id: String,
    pub description: String,
    pub amount: Decimal,
    /// `YYYY-MM-DD`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    pub income_type: IncomeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payer_eik: Option<String>,
    /// ISO 3166-1 alpha-2, stored uppercased.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_date: Option<String>,
    pub tax_withheld: Decimal,
    /// Normative expense percentage for this line.
    pub expense_norm_pct: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Income {
    /// Rebuilds an income line from a raw stored value.
    ///
    /// Total: every field falls back to a safe default rather than failing,
    /// so a half-written row is flagged by the UI instead of lost.
    pub fn from_value(value: &Value) -> Self {
        Self {
            id: string_or_empty(pick(value, &["id"])),
            description: string_or_empty(pick(value, &["description"])),
            amount: decimal_or_zero(pick(value, &["amount"])),
            date: opt_string(pick(value, &["date"])),
            income_type: IncomeType::parse(&string_or_empty(pick(value, &["incomeType"]))),
            payer_name: opt_string(pick(value, &["payerName"])),
            payer_eik: opt_string(pick(value, &["payerEik"])),
            country_code: opt_string(pick(value, &["countryCode"])).map(|c| c.to_ascii_uppercase()),
            doc_type: opt_string(pick(value, &["docType"])),
            doc_no: opt_string(pick(value, &["docNo"])),
            doc_date: opt_string(pick(value, &["docDate"])),
            tax_withheld: decimal_or_zero(pick(value, &["taxWithheld"])),
            expense_norm_pct: decimal_or_zero(pick(value, &["expenseNormPct"])),
            notes: opt_string(pick(value, &["notes"])),
        }
    }
}

/// One CSV-imported income row, cached separately from the canonical
/// incomes until the user confirms which rows to include.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedIncome {
    pub id: String,
    pub description: String,
    pub amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    pub include: bool,
}

impl ImportedIncome {
    pub fn from_value(value: &Value) -> Self {
        Self {
            id: string_or_empty(pick(value, &["id"])),
            description: string_or_empty(pick(value, &["description"])),
            amount: decimal_or_zero(pick(value, &["amount"])),
            date: opt_string(pick(value, &["date"])),
            include: pick(value, &["include"]).and_then(Value::as_bool).unwrap_or(true),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use serde_json::json;

    use super::*;

    #[test]
    fn income_type_parse_falls_back_to_other() {
        assert_eq!(IncomeType::parse("employment"), IncomeType::Employment);
        assert_eq!(IncomeType::parse("civil"), IncomeType::Civil);
        assert_eq!(IncomeType::parse("rent"), IncomeType::Rent);
        assert_eq!(IncomeType::parse("lottery"), IncomeType::Other);
        assert_eq!(IncomeType::parse(""), IncomeType::Other);
    }

    #[test]
    fn from_value_normalizes_partial_rows() {
        let income = Income::from_value(&json!({
            "id": "i1",
            "description": "Хонорар",
            "amount": "1500,00",
            "countryCode": "bg",
            "taxWithheld": 150
        }));

        assert_eq!(income.amount, dec!(1500.00));
        assert_eq!(income.income_type, IncomeType::Other);
        assert_eq!(income.country_code.as_deref(), Some("BG"));
        assert_eq!(income.tax_withheld, dec!(150));
        assert_eq!(income.expense_norm_pct, dec!(0));
        assert_eq!(income.date, None);
    }

    #[test]
    fn from_value_survives_non_object_input() {
        let income = Income::from_value(&json!(42));
        assert_eq!(income.id, "");
        assert_eq!(income.amount, dec!(0));
    }

    #[test]
    fn imported_income_defaults_include_to_true() {
        let row = ImportedIncome::from_value(&json!({ "id": "r1", "amount": 10 }));
        assert!(row.include);
        let excluded = ImportedIncome::from_value(&json!({ "id": "r2", "include": false }));
        assert!(!excluded.include);
    }

    #[test]
    fn serializes_with_wire_field_names() {
        let income = Income {
            id: "i1".into(),
            income_type: IncomeType::Civil,
            payer_eik: Some("123456789".into()),
            ..Income::default()
        };
        let v = serde_json::to_value(&income).unwrap();
        assert_eq!(v["incomeType"], json!("civil"));
        assert_eq!(v["payerEik"], json!("123456789"));
        assert!(v.get("docNo").is_none());
    }
}
