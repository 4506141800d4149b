//! Lenient readers for JSON written by older app versions.
//!
//! Stored records arrive in whatever shape a past version left them:
//! numbers as strings, Cyrillic field names, epoch timestamps next to ISO
//! ones. These helpers pull a field out of a raw [`serde_json::Value`] under
//! any of its historical names and coerce it, falling back to a default
//! instead of failing.

use chrono::DateTime;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::validators::parse_money;

/// Returns the first present (non-null) value among the candidate keys.
pub fn pick<'a>(
    value: &'a Value,
    keys: &[&str],
) -> Option<&'a Value> {
    let obj = value.as_object()?;
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find(|v| !v.is_null())
}

/// Coerces to a string; missing and null become the empty string.
pub fn string_or_empty(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Coerces to a string; missing, null and empty become `None`.
pub fn opt_string(value: Option<&Value>) -> Option<String> {
    let s = string_or_empty(value);
    if s.is_empty() { None } else { Some(s) }
}

/// Coerces a number-or-numeric-string to a [`Decimal`], defaulting to zero.
pub fn decimal_or_zero(value: Option<&Value>) -> Decimal {
    opt_decimal(value).unwrap_or(Decimal::ZERO)
}

/// Coerces a number-or-numeric-string to a [`Decimal`] when possible.
pub fn opt_decimal(value: Option<&Value>) -> Option<Decimal> {
    match value {
        Some(Value::Number(n)) => n.to_string().parse().ok(),
        Some(Value::String(s)) if !s.trim().is_empty() => parse_money(s),
        _ => None,
    }
}

/// Coerces an epoch-milliseconds number or an ISO 8601 string to epoch ms.
pub fn opt_epoch_ms(value: Option<&Value>) -> Option<i64> {
    match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Some(Value::String(s)) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.timestamp_millis()),
        _ => None,
    }
}

/// Coerces a year given as a number or a numeric string. Anything that does
/// not parse to a plain integer is rejected.
pub fn opt_year(value: Option<&Value>) -> Option<i32> {
    match value {
        Some(Value::Number(n)) => {
            let y = n.as_i64()?;
            i32::try_from(y).ok()
        }
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
}
