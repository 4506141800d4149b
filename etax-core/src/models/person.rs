use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::storage::coerce::{opt_string, pick, string_or_empty};
use crate::validators::validate_iban;

/// The taxpayer's identity and refund details.
///
/// Identified by EGN or, for foreign residents, by ЛНЧ (personal number of
/// a foreigner) — at least one of the two must be present to file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub egn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lnch: Option<String>,
    pub first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    pub last_name: String,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refund_iban: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refund_bank_name: Option<String>,
}

impl Person {
    /// Rebuilds a person from a raw stored value, normalizing as it goes
    /// (the refund IBAN loses its spacing and is uppercased).
    pub fn from_value(value: &Value) -> Self {
        Self {
            egn: opt_string(pick(value, &["egn"])),
            lnch: opt_string(pick(value, &["lnch"])),
            first_name: string_or_empty(pick(value, &["firstName"])),
            middle_name: opt_string(pick(value, &["middleName"])),
            last_name: string_or_empty(pick(value, &["lastName"])),
            address: string_or_empty(pick(value, &["address"])),
            email: opt_string(pick(value, &["email"])),
            phone: opt_string(pick(value, &["phone"])),
            refund_iban: opt_string(pick(value, &["refundIban"])).map(normalize_iban),
            refund_bank_name: opt_string(pick(value, &["refundBankName"])),
        }
    }

    /// Applies the same normalization to an in-memory instance before save.
    pub fn sanitized(mut self) -> Self {
        self.refund_iban = self
            .refund_iban
            .map(normalize_iban)
            .filter(|s| !s.is_empty());
        self
    }

    /// Checks the fields needed to file; returns one message per problem.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.egn.is_none() && self.lnch.is_none() {
            problems.push("Липсва ЕГН или ЛНЧ.".to_string());
        }
        if self.first_name.is_empty() {
            problems.push("Липсва собствено име.".to_string());
        }
        if self.last_name.is_empty() {
            problems.push("Липсва фамилно име.".to_string());
        }
        if self.address.is_empty() {
            problems.push("Липсва адрес.".to_string());
        }
        if let Some(iban) = &self.refund_iban
            && !validate_iban(iban)
        {
            problems.push("Невалиден IBAN.".to_string());
        }
        problems
    }
}

fn normalize_iban(s: String) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_uppercase()
}
