//! Quick net-from-gross estimate used by the calculators screen.

use rust_decimal::Decimal;

use crate::calc::common::{max, round_half_up};

/// Parameters for [`net_calc`]. Defaults match the standard employee
/// contribution share (13.78%) and the flat income tax rate (10%).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetOptions {
    /// Employee social security share as a fraction of gross.
    pub employee_soc: Decimal,
    /// Flat tax rate as a fraction.
    pub tax_rate: Decimal,
}

impl Default for NetOptions {
    fn default() -> Self {
        Self {
            employee_soc: Decimal::from_parts(1378, 0, 0, false, 4), // 0.1378
            tax_rate: Decimal::from_parts(10, 0, 0, false, 2),       // 0.10
        }
    }
}

/// Estimates the monthly net from a gross salary.
///
/// Contributions and tax apply to a non-negative base, and the result is
/// clamped to zero — this helper never returns a negative net.
pub fn net_calc(
    gross: Decimal,
    opts: &NetOptions,
) -> Decimal {
    let soc = opts.employee_soc * max(gross, Decimal::ZERO);
    let base = max(gross - soc, Decimal::ZERO);
    let tax = opts.tax_rate * base;
    round_half_up(max(gross - soc - tax, Decimal::ZERO))
}
