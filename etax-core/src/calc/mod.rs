pub mod common;
pub mod income_tax;
pub mod net;

pub use common::{max, non_negative, round_half_up};
pub use income_tax::{DEFAULT_TAX_RATE, TaxInput, TaxResult, calculate_tax};
pub use net::{NetOptions, net_calc};
