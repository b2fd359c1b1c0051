//! Bounds on monetary amounts
//!
//! Amounts are stored as `NUMERIC(18, 6)`, so anything accepted here fits a
//! column exactly and sums of stored amounts stay far from `Decimal::MAX`.

use rust_decimal::Decimal;

use crate::error::{LedgerError, Result};

/// Most decimal places an amount may carry
pub const MAX_SCALE: u32 = 6;

/// Exclusive upper bound on any single amount (10^12)
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

/// Reject amounts that cannot be stored without rounding or overflow.
pub fn check_amount(field: &'static str, value: Decimal) -> Result<()> {
    if value.normalize().scale() > MAX_SCALE {
        return Err(LedgerError::TooPrecise { field, value, max_scale: MAX_SCALE });
    }
    if value.abs() >= MAX_AMOUNT {
        return Err(LedgerError::AmountOutOfRange { field, value });
    }
    Ok(())
}
