//! Hand-rolled XML serialization of a [`NapPayload`].
//!
//! The document is written element by element in a fixed order, so the same
//! payload always yields the same bytes. The submission flow relies on that
//! for snapshot comparison before re-upload.

use rust_decimal::{Decimal, RoundingStrategy};

use super::NapPayload;

const NS_NAP: &str = "http://nap.bg/declaration";
const NS_XSI: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Escapes text content for XML.
fn esc(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Two-decimal money rendering, half-up.
fn money(amount: Decimal) -> String {
    format!(
        "{:.2}",
        amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    )
}

/// Serializes the payload to a complete XML document.
pub fn generate_nap_xml(payload: &NapPayload) -> String {
    let mut xml = String::with_capacity(1024);
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str(&format!(
        "<nap:Declaration xmlns:nap=\"{NS_NAP}\" xmlns:xsi=\"{NS_XSI}\">\n"
    ));

    xml.push_str("  <nap:Meta>\n");
    xml.push_str(&format!(
        "    <nap:GeneratedAt>{}</nap:GeneratedAt>\n",
        esc(&payload.meta.generated_at)
    ));
    xml.push_str(&format!("    <nap:App>{}</nap:App>\n", esc(&payload.meta.app)));
    xml.push_str(&format!(
        "    <nap:Version>{}</nap:Version>\n",
        esc(&payload.meta.version)
    ));
    xml.push_str("  </nap:Meta>\n");

    xml.push_str("  <nap:Taxpayer>\n");
    xml.push_str(&format!("    <nap:EGN>{}</nap:EGN>\n", esc(&payload.taxpayer.egn)));
    xml.push_str("  </nap:Taxpayer>\n");

    xml.push_str("  <nap:Payment>\n");
    xml.push_str(&format!("    <nap:IBAN>{}</nap:IBAN>\n", esc(&payload.payment.iban)));
    xml.push_str(&format!(
        "    <nap:Reason>{}</nap:Reason>\n",
        esc(&payload.payment.reason)
    ));
    xml.push_str("  </nap:Payment>\n");

    xml.push_str(&format!("  <nap:Year>{}</nap:Year>\n", payload.year));

    if !payload.income.is_empty() {
        xml.push_str("  <nap:IncomeList>\n");
        for line in &payload.income {
            xml.push_str("    <nap:Income>\n");
            xml.push_str(&format!("      <nap:Code>{}</nap:Code>\n", esc(&line.code)));
            xml.push_str(&format!(
                "      <nap:Description>{}</nap:Description>\n",
                esc(&line.description)
            ));
            xml.push_str(&format!("      <nap:Amount>{}</nap:Amount>\n", money(line.amount)));
            xml.push_str("    </nap:Income>\n");
        }
        xml.push_str("  </nap:IncomeList>\n");
    }

    if !payload.deductions.is_empty() {
        xml.push_str("  <nap:Deductions>\n");
        for d in &payload.deductions {
            xml.push_str("    <nap:Deduction>\n");
            xml.push_str(&format!("      <nap:Name>{}</nap:Name>\n", esc(&d.name)));
            xml.push_str(&format!("      <nap:Amount>{}</nap:Amount>\n", money(d.amount)));
            xml.push_str("    </nap:Deduction>\n");
        }
        xml.push_str("  </nap:Deductions>\n");
    }

    if !payload.totals.is_empty() {
        xml.push_str("  <nap:Totals>\n");
        for (name, amount) in &payload.totals {
            let name = esc(name);
            xml.push_str(&format!("    <nap:{name}>{}</nap:{name}>\n", money(*amount)));
        }
        xml.push_str("  </nap:Totals>\n");
    }

    if !payload.attachments.is_empty() {
        xml.push_str("  <nap:Attachments>\n");
        for a in &payload.attachments {
            xml.push_str("    <nap:Attachment>\n");
            xml.push_str(&format!("      <nap:Name>{}</nap:Name>\n", esc(&a.name)));
            xml.push_str(&format!("      <nap:URI>{}</nap:URI>\n", esc(&a.uri)));
            xml.push_str("    </nap:Attachment>\n");
        }
        xml.push_str("  </nap:Attachments>\n");
    }

    xml.push_str("</nap:Declaration>\n");
    xml
}
