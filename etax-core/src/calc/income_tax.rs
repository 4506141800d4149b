//! Annual income tax calculation (ЗДДФЛ, flat 10% model).
//!
//! The calculation follows the declaration worksheet: gross income less
//! normative (flat-rate) expenses, social security contributions and tax
//! reliefs gives the taxable base; the flat rate applied to that base gives
//! the tax due.
//!
//! | Step | Value |
//! |------|-------|
//! | 1    | Gross annual income |
//! | 2    | Normative expenses (percent of the non-negative income) |
//! | 3    | Social contributions (percent of the non-negative income) |
//! | 4    | Tax reliefs (deductions) |
//! | 5    | Taxable base = max(0, 1 − 2 − 3 − 4) |
//! | 6    | Tax due = 5 × rate |
//! | 7    | Net income = 1 − 6 − 3 (may be negative) |
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use etax_core::calc::{TaxInput, calculate_tax};
//!
//! let result = calculate_tax(&TaxInput {
//!     income: dec!(1000),
//!     normative_percent: Some(dec!(20)),
//!     social_percent: Some(dec!(13.78)),
//!     deductions: None,
//!     tax_rate: None,
//! });
//!
//! assert_eq!(result.normative_amount, dec!(200.00));
//! assert_eq!(result.social_amount, dec!(137.80));
//! assert_eq!(result.taxable_income, dec!(662.20));
//! assert_eq!(result.tax, dec!(66.22));
//! assert_eq!(result.net_income, dec!(795.98));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calc::common::{max, non_negative, round_half_up};

/// Default flat tax rate when the caller does not supply one.
pub const DEFAULT_TAX_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 2); // 0.10

/// Inputs to [`calculate_tax`].
///
/// Optional fields default to zero (0.10 for the tax rate). Percent fields
/// are percentages, not fractions: `Some(dec!(20))` means 20%.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxInput {
    /// Gross annual income. May be negative; the sign flows through into
    /// the net income while the taxable base clamps to zero.
    pub income: Decimal,

    /// Normative (flat-rate) expense percentage, e.g. 25 for freelancers.
    pub normative_percent: Option<Decimal>,

    /// Social security contribution percentage.
    pub social_percent: Option<Decimal>,

    /// Total tax reliefs to subtract from the base.
    pub deductions: Option<Decimal>,

    /// Flat tax rate as a fraction, e.g. 0.10.
    pub tax_rate: Option<Decimal>,
}

/// Output of [`calculate_tax`]. Every field is rounded to two decimals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxResult {
    pub income: Decimal,
    pub normative_percent: Decimal,
    pub social_percent: Decimal,
    pub deductions: Decimal,
    pub normative_amount: Decimal,
    pub social_amount: Decimal,
    pub taxable_income: Decimal,
    pub tax_rate: Decimal,
    pub tax: Decimal,
    pub net_income: Decimal,
}

/// Computes the taxable base, tax due and net income for one year.
///
/// This is a total function: it never fails and never panics. Negative
/// percentages, deductions and rates are clamped to zero before use, and a
/// percentage above 100 simply drives the taxable base to zero rather than
/// being rejected.
pub fn calculate_tax(input: &TaxInput) -> TaxResult {
    let income = input.income;
    let normative_percent = non_negative(input.normative_percent.unwrap_or(Decimal::ZERO));
    let social_percent = non_negative(input.social_percent.unwrap_or(Decimal::ZERO));
    let deductions = non_negative(input.deductions.unwrap_or(Decimal::ZERO));
    let tax_rate = non_negative(input.tax_rate.unwrap_or(DEFAULT_TAX_RATE));

    // Percentages apply to a non-negative base even when the income itself
    // is negative.
    let percent_base = max(income, Decimal::ZERO);
    let normative_amount = percent_base * normative_percent / Decimal::ONE_HUNDRED;
    let social_amount = percent_base * social_percent / Decimal::ONE_HUNDRED;

    let taxable_income = max(
        income - normative_amount - social_amount - deductions,
        Decimal::ZERO,
    );
    let tax = taxable_income * tax_rate;
    // Intentionally unclamped: a negative income produces a negative net.
    let net_income = income - tax - social_amount;

    TaxResult {
        income: round_half_up(income),
        normative_percent: round_half_up(normative_percent),
        social_percent: round_half_up(social_percent),
        deductions: round_half_up(deductions),
        normative_amount: round_half_up(normative_amount),
        social_amount: round_half_up(social_amount),
        taxable_income: round_half_up(taxable_income),
        tax_rate: round_half_up(tax_rate),
        tax: round_half_up(tax),
        net_income: round_half_up(net_income),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn input(income: Decimal) -> TaxInput {
        TaxInput {
            income,
            ..TaxInput::default()
        }
    }

    // =========================================================================
    // reference case
    // =========================================================================

    #[test]
    fn calculate_reference_case() {
        let result = calculate_tax(&TaxInput {
            income: dec!(1000),
            normative_percent: Some(dec!(20)),
            social_percent: Some(dec!(13.78)),
            deductions: Some(dec!(0)),
            tax_rate: None,
        });

        assert_eq!(result.normative_amount, dec!(200.00));
        assert_eq!(result.social_amount, dec!(137.80));
        assert_eq!(result.taxable_income, dec!(662.20));
        assert_eq!(result.tax_rate, dec!(0.10));
        assert_eq!(result.tax, dec!(66.22));
        assert_eq!(result.net_income, dec!(795.98));
    }

    // =========================================================================
    // defaults and clamping
    // =========================================================================

    #[test]
    fn zero_income_yields_all_zero_derived_fields() {
        let result = calculate_tax(&input(dec!(0)));

        assert_eq!(result.normative_amount, dec!(0));
        assert_eq!(result.social_amount, dec!(0));
        assert_eq!(result.taxable_income, dec!(0));
        assert_eq!(result.tax, dec!(0));
        assert_eq!(result.net_income, dec!(0));
    }

    #[test]
    fn missing_tax_rate_defaults_to_ten_percent() {
        let result = calculate_tax(&input(dec!(100)));

        assert_eq!(result.tax_rate, dec!(0.10));
        assert_eq!(result.tax, dec!(10.00));
    }

    #[test]
    fn deductions_exceeding_income_clamp_base_to_zero() {
        let result = calculate_tax(&TaxInput {
            income: dec!(500),
            normative_percent: Some(dec!(0)),
            social_percent: Some(dec!(10)),
            deductions: Some(dec!(1000)),
            tax_rate: None,
        });

        assert_eq!(result.taxable_income, dec!(0));
        assert_eq!(result.tax, dec!(0));
        // Net is income minus social contributions only.
        assert_eq!(result.net_income, dec!(450.00));
    }

    #[test]
    fn normative_percent_above_hundred_is_allowed() {
        let result = calculate_tax(&TaxInput {
            income: dec!(1000),
            normative_percent: Some(dec!(150)),
            ..TaxInput::default()
        });

        assert_eq!(result.normative_amount, dec!(1500.00));
        assert_eq!(result.taxable_income, dec!(0));
        assert_eq!(result.tax, dec!(0));
    }

    #[test]
    fn negative_percent_inputs_are_clamped_to_zero() {
        let result = calculate_tax(&TaxInput {
            income: dec!(1000),
            normative_percent: Some(dec!(-20)),
            social_percent: Some(dec!(-5)),
            deductions: Some(dec!(-100)),
            tax_rate: Some(dec!(-0.10)),
        });

        assert_eq!(result.normative_percent, dec!(0));
        assert_eq!(result.social_percent, dec!(0));
        assert_eq!(result.deductions, dec!(0));
        assert_eq!(result.tax_rate, dec!(0));
        assert_eq!(result.taxable_income, dec!(1000.00));
        assert_eq!(result.tax, dec!(0));
    }

    // =========================================================================
    // negative income
    // =========================================================================

    #[test]
    fn negative_income_clamps_base_but_not_net() {
        let result = calculate_tax(&TaxInput {
            income: dec!(-300),
            normative_percent: Some(dec!(20)),
            social_percent: Some(dec!(10)),
            ..TaxInput::default()
        });

        // Percent base is zero, so no normative or social amounts.
        assert_eq!(result.normative_amount, dec!(0));
        assert_eq!(result.social_amount, dec!(0));
        assert_eq!(result.taxable_income, dec!(0));
        assert_eq!(result.tax, dec!(0));
        assert_eq!(result.net_income, dec!(-300.00));
    }

    // =========================================================================
    // properties
    // =========================================================================

    #[test]
    fn taxable_income_never_exceeds_non_negative_income() {
        let cases = [
            (dec!(1000), dec!(25), dec!(13.78), dec!(50)),
            (dec!(1), dec!(0), dec!(0), dec!(0)),
            (dec!(99999.99), dec!(40), dec!(0), dec!(0)),
            (dec!(0.01), dec!(10), dec!(10), dec!(10)),
        ];
        for (income, norm, soc, ded) in cases {
            let result = calculate_tax(&TaxInput {
                income,
                normative_percent: Some(norm),
                social_percent: Some(soc),
                deductions: Some(ded),
                tax_rate: None,
            });
            assert!(result.taxable_income >= dec!(0), "base below zero");
            assert!(
                result.taxable_income <= round_half_up(income),
                "base above income for {income}"
            );
            assert_eq!(result.tax, round_half_up(result.taxable_income * dec!(0.10)));
        }
    }
}
