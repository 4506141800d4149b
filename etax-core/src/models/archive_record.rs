use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::declaration::DeclarationStatus;
use crate::storage::coerce::{opt_decimal, opt_epoch_ms, opt_string, opt_year, pick, string_or_empty};

/// A file attached to an archived declaration (XML, PDF, receipts).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub name: String,
    pub uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// The archive's view of a declaration — a superset shape that also covers
/// records migrated from older storage layouts.
///
/// `id` is unique within the archive index. The index key holds a JSON
/// array of ids; each record lives under its own item key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclarationRecord {
    pub id: String,
    pub year: i32,
    /// Epoch milliseconds.
    pub created_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iban: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub status: DeclarationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xml_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<Attachment>>,
    /// Free-form extension field kept for forward compatibility.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

impl DeclarationRecord {
    /// The timestamp used for listing order: last update if present,
    /// creation time otherwise.
    pub fn effective_timestamp(&self) -> i64 {
        self.updated_at.unwrap_or(self.created_at)
    }

    /// Rebuilds a canonical record from a raw stored value.
    ///
    /// Requires a non-empty id and a numeric year; returns `None`
    /// otherwise so the listing path can drop the entry.
    pub fn from_value(value: &Value) -> Option<Self> {
        let id = string_or_empty(pick(value, &["id"]));
        if id.is_empty() {
            return None;
        }
        let year = opt_year(pick(value, &["year"]))?;
        let attachments = pick(value, &["attachments"])
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok());
        Some(Self {
            id,
            year,
            created_at: opt_epoch_ms(pick(value, &["createdAt"])).unwrap_or(0),
            updated_at: opt_epoch_ms(pick(value, &["updatedAt"])),
            amount: opt_decimal(pick(value, &["amount"])),
            iban: opt_string(pick(value, &["iban"])),
            reason: opt_string(pick(value, &["reason"])),
            status: DeclarationStatus::parse(&string_or_empty(pick(value, &["status"]))),
            xml_uri: opt_string(pick(value, &["xmlUri"])),
            pdf_uri: opt_string(pick(value, &["pdfUri"])),
            attachments,
            meta: pick(value, &["meta"]).cloned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use serde_json::json;

    use super::*;

    #[test]
    fn effective_timestamp_prefers_updated_at() {
        let rec = DeclarationRecord {
            id: "a".into(),
            year: 2025,
            created_at: 100,
            updated_at: Some(200),
            ..DeclarationRecord::default()
        };
        assert_eq!(rec.effective_timestamp(), 200);

        let never_updated = DeclarationRecord { updated_at: None, ..rec };
        assert_eq!(never_updated.effective_timestamp(), 100);
    }

    #[test]
    fn from_value_requires_id_and_year() {
        assert_eq!(DeclarationRecord::from_value(&json!({ "year": 2025 })), None);
        assert_eq!(DeclarationRecord::from_value(&json!({ "id": "x" })), None);
        assert!(DeclarationRecord::from_value(&json!({ "id": "x", "year": 2025 })).is_some());
    }

    #[test]
    fn from_value_reads_full_record() {
        let rec = DeclarationRecord::from_value(&json!({
            "id": "d1",
            "year": 2025,
            "createdAt": 1700000000000i64,
            "amount": 123.45,
            "iban": "BG80BNBG96611020345678",
            "status": "submitted",
            "xmlUri": "file:///d1.xml",
            "attachments": [{ "name": "receipt.pdf", "uri": "file:///r.pdf" }]
        }))
        .unwrap();

        assert_eq!(rec.amount, Some(dec!(123.45)));
        assert_eq!(rec.status, DeclarationStatus::Submitted);
        assert_eq!(rec.attachments.as_ref().map(Vec::len), Some(1));
    }
}
