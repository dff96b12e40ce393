pub mod ledger;
pub mod transmute;

pub use ledger::TokenLedger;
pub use transmute::{Reserve, TRANSMUTABLE_INTERFACE, TransmuteRejection, TransmuteTarget};

use crate::config::TOKEN_UNIT;

/// Decimal places of the token's fixed-point representation.
pub const DECIMALS: u32 = 8;

/// Render base units as a decimal token amount, e.g. `100.00000000`.
pub fn format_units(amount: u64) -> String {
    format!(
        "{}.{:0width$}",
        amount / TOKEN_UNIT,
        amount % TOKEN_UNIT,
        width = DECIMALS as usize
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_eight_decimals() {
        assert_eq!(format_units(100 * TOKEN_UNIT), "100.00000000");
        assert_eq!(format_units(1_250_000_000), "12.50000000");
        assert_eq!(format_units(1), "0.00000001");
        assert_eq!(TOKEN_UNIT, 10u64.pow(DECIMALS));
    }
}
