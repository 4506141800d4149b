//! Input validators shared by the entry and submission flows.
//!
//! Everything here reports problems as booleans or `Option`s — validation
//! failures are ordinary answers for the caller to display, never errors.

use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

/// EGN checksum weights for the first nine digits.
const EGN_WEIGHTS: [u32; 9] = [2, 4, 8, 5, 10, 9, 7, 3, 6];

static IBAN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{2}[0-9A-Z]{12,30}$").expect("static regex"));

static ISO_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-(0[1-9]|1[0-2])-(0[1-9]|[12]\d|3[01])$").expect("static regex")
});

/// Validates a Bulgarian EGN (national identity number).
///
/// Whitespace is ignored. The input must be exactly ten digits whose tenth
/// digit equals the weighted checksum of the first nine (mod 11, with a
/// remainder of 10 mapping to 0).
pub fn validate_egn(egn: &str) -> bool {
    let cleaned: String = egn.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.len() != 10 || !cleaned.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    let digits: Vec<u32> = cleaned.chars().filter_map(|c| c.to_digit(10)).collect();
    let sum: u32 = EGN_WEIGHTS
        .iter()
        .zip(&digits)
        .map(|(w, d)| w * d)
        .sum();
    let check = match sum % 11 {
        10 => 0,
        r => r,
    };
    check == digits[9]
}

/// Validates an IBAN using the ISO 7064 mod-97 check.
///
/// The input is normalized first (whitespace stripped, uppercased), so
/// `"bg80 bnbg 9661 1020 3456 78"` and `"BG80BNBG96611020345678"` are the
/// same account.
pub fn validate_iban(iban: &str) -> bool {
    let normalized: String = iban
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_uppercase();
    if !IBAN_RE.is_match(&normalized) {
        return false;
    }

    // Move the country code and check digits to the end, then map letters
    // to their numeric values (A=10 .. Z=35).
    let rearranged = format!("{}{}", &normalized[4..], &normalized[..4]);
    let mut converted = String::with_capacity(rearranged.len() * 2);
    for ch in rearranged.chars() {
        if ch.is_ascii_digit() {
            converted.push(ch);
        } else {
            let value = ch as u32 - 'A' as u32 + 10;
            converted.push_str(&value.to_string());
        }
    }

    // Mod 97 computed iteratively over 7-digit blocks to stay in u64 range.
    let mut remainder: u64 = 0;
    let bytes = converted.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let end = (i + 7).min(bytes.len());
        let block = format!("{}{}", remainder, &converted[i..end]);
        remainder = match block.parse::<u64>() {
            Ok(n) => n % 97,
            Err(_) => return false,
        };
        i = end;
    }
    remainder == 1
}

/// Returns true for strictly positive amounts. Zero is not a valid amount.
pub fn is_positive_number(n: Decimal) -> bool {
    n > Decimal::ZERO
}

/// Parses a user-entered monetary value.
///
/// Empty input means zero. Whitespace (including thousands separators typed
/// as spaces) is stripped and a comma decimal separator is accepted.
/// Returns `None` when the remainder is not a number.
pub fn parse_money(value: &str) -> Option<Decimal> {
    let cleaned: String = value
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    if cleaned.is_empty() {
        return Some(Decimal::ZERO);
    }
    cleaned.parse().ok()
}

/// Sums a list of user-entered amounts, treating unparseable entries as zero.
pub fn sum_money(values: &[&str]) -> Decimal {
    values
        .iter()
        .map(|v| parse_money(v).unwrap_or(Decimal::ZERO))
        .sum()
}

/// Validates a `YYYY-MM-DD` date string. Empty is accepted — optional date
/// fields are stored as empty strings by the entry forms.
pub fn is_iso_date(s: &str) -> bool {
    s.is_empty() || ISO_DATE_RE.is_match(s)
}

/// Validates a tax year against an inclusive range.
pub fn is_year_in_range(
    year: i32,
    min_year: i32,
    max_year: i32,
) -> bool {
    year >= min_year && year <= max_year
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    // =========================================================================
    // EGN
    // =========================================================================

    #[test]
    fn egn_accepts_known_valid_number() {
        assert!(validate_egn("7523169263"));
    }

    #[test]
    fn egn_rejects_flipped_check_digit() {
        assert!(!validate_egn("7523169264"));
    }

    #[test]
    fn egn_rejects_wrong_length_and_non_digits() {
        assert!(!validate_egn(""));
        assert!(!validate_egn("123"));
        assert!(!validate_egn("abcdefghij"));
        assert!(!validate_egn("75231692631"));
    }

    #[test]
    fn egn_tolerates_whitespace() {
        assert!(validate_egn("75 23 16 92 63"));
    }

    #[test]
    fn egn_maps_remainder_ten_to_zero() {
        // First nine digits chosen so the weighted sum mod 11 is 10;
        // the check digit must then be 0.
        let head = "7523169290";
        let sum: u32 = EGN_WEIGHTS
            .iter()
            .zip(head.chars().filter_map(|c| c.to_digit(10)))
            .map(|(w, d)| w * d)
            .sum();
        assert_eq!(sum % 11, 10);
        assert!(validate_egn(head));
    }

    // =========================================================================
    // IBAN
    // =========================================================================

    #[test]
    fn iban_accepts_valid_bulgarian_account() {
        assert!(validate_iban("BG80BNBG96611020345678"));
    }

    #[test]
    fn iban_ignores_case_and_spacing() {
        assert!(validate_iban("bg80 bnbg 9661 1020 3456 78"));
    }

    #[test]
    fn iban_rejects_tampered_check_digits() {
        assert!(!validate_iban("BG81BNBG96611020345678"));
    }

    #[test]
    fn iban_rejects_wrong_structure() {
        assert!(!validate_iban(""));
        assert!(!validate_iban("BG80"));
        assert!(!validate_iban("80BGBNBG96611020345678"));
        assert!(!validate_iban("BG80BNBG9661102034567!"));
    }

    #[test]
    fn iban_accepts_other_countries_when_checksum_holds() {
        assert!(validate_iban("DE89370400440532013000"));
        assert!(validate_iban("GB29NWBK60161331926819"));
    }

    // =========================================================================
    // numeric guards
    // =========================================================================

    #[test]
    fn positive_number_excludes_zero_and_negative() {
        assert!(is_positive_number(dec!(0.01)));
        assert!(!is_positive_number(dec!(0)));
        assert!(!is_positive_number(dec!(-5)));
    }

    #[test]
    fn parse_money_handles_common_shapes() {
        assert_eq!(parse_money(""), Some(dec!(0)));
        assert_eq!(parse_money("  "), Some(dec!(0)));
        assert_eq!(parse_money("1234.56"), Some(dec!(1234.56)));
        assert_eq!(parse_money("1 234,56"), Some(dec!(1234.56)));
        assert_eq!(parse_money("abc"), None);
    }

    #[test]
    fn sum_money_ignores_invalid_entries() {
        assert_eq!(sum_money(&["100", "x", "23,50", ""]), dec!(123.50));
    }

    #[test]
    fn iso_date_guard() {
        assert!(is_iso_date(""));
        assert!(is_iso_date("2025-04-30"));
        assert!(!is_iso_date("2025-13-01"));
        assert!(!is_iso_date("2025-00-10"));
        assert!(!is_iso_date("30-04-2025"));
    }

    #[test]
    fn year_range_guard() {
        assert!(is_year_in_range(2025, 2000, 2026));
        assert!(!is_year_in_range(1999, 2000, 2026));
        assert!(!is_year_in_range(2027, 2000, 2026));
    }
}
