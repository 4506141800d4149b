//! NAP declaration export.
//!
//! [`NapPayload`] is the literal document content; [`NapPayload::from_records`]
//! assembles one from the year's stored records; [`generate_nap_xml`] turns a
//! payload into the XML string the submission flow writes to disk. Element
//! names and namespaces follow the agency's declaration format.

mod xml;

pub use xml::generate_nap_xml;

use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;

use crate::models::{Attachment, Deduction, Income, IncomeType, Person};

/// NAP income code for a category.
pub fn income_code(income_type: IncomeType) -> &'static str {
    match income_type {
        IncomeType::Employment => "01",
        IncomeType::Civil => "02",
        IncomeType::Rent => "03",
        IncomeType::Other => "99",
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NapMeta {
    /// ISO 8601, UTC.
    pub generated_at: String,
    pub app: String,
    pub version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NapTaxpayer {
    pub egn: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NapPayment {
    pub iban: String,
    pub reason: String,
}

/// One `<nap:Income>` line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NapIncomeLine {
    pub code: String,
    pub description: String,
    pub amount: Decimal,
}

/// One `<nap:Deduction>` line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NapDeductionLine {
    pub name: String,
    pub amount: Decimal,
}

/// Everything that ends up in the generated document, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NapPayload {
    pub meta: NapMeta,
    pub taxpayer: NapTaxpayer,
    pub payment: NapPayment,
    pub year: i32,
    pub income: Vec<NapIncomeLine>,
    pub deductions: Vec<NapDeductionLine>,
    /// Named totals, serialized in this order.
    pub totals: Vec<(String, Decimal)>,
    pub attachments: Vec<Attachment>,
}

impl NapPayload {
    /// Builds a payload from the year's stored records.
    ///
    /// Tolerates an empty profile and empty record lists; the resulting
    /// document simply carries empty taxpayer fields and no line sections.
    /// `generated_at` is an input so identical records produce identical
    /// documents.
    pub fn from_records(
        year: i32,
        incomes: &[Income],
        deductions: &[Deduction],
        person: &Person,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let income_total: Decimal = incomes.iter().map(|i| i.amount).sum();
        let reliefs_total: Decimal = deductions.iter().map(|d| d.amount).sum();
        Self {
            meta: NapMeta {
                generated_at: generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
                app: "etax".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            taxpayer: NapTaxpayer {
                egn: person
                    .egn
                    .clone()
                    .or_else(|| person.lnch.clone())
                    .unwrap_or_default(),
            },
            payment: NapPayment {
                iban: person.refund_iban.clone().unwrap_or_default(),
                reason: format!("ГДД чл. 50 ЗДДФЛ за {year}"),
            },
            year,
            income: incomes.iter().map(income_line).collect(),
            deductions: deductions
                .iter()
                .map(|d| NapDeductionLine { name: d.name.clone(), amount: d.amount })
                .collect(),
            totals: vec![
                ("IncomeTotal".to_string(), income_total),
                ("ReliefsTotal".to_string(), reliefs_total),
            ],
            attachments: Vec::new(),
        }
    }
}

/// Joins the income's identifying fields into one display line.
fn income_line(income: &Income) -> NapIncomeLine {
    let mut parts: Vec<String> = Vec::new();
    if !income.description.is_empty() {
        parts.push(income.description.clone());
    }
    if let Some(payer) = &income.payer_name {
        parts.push(payer.clone());
    }
    if let Some(eik) = &income.payer_eik {
        parts.push(format!("ЕИК {eik}"));
    }
    if let Some(country) = &income.country_code {
        parts.push(country.clone());
    }
    if let Some(doc_no) = &income.doc_no {
        match &income.doc_type {
            Some(doc_type) => parts.push(format!("{doc_type} {doc_no}")),
            None => parts.push(format!("док. {doc_no}")),
        }
    }
    NapIncomeLine {
        code: income_code(income.income_type).to_string(),
        description: parts.join(" | "),
        amount: income.amount,
    }
}
