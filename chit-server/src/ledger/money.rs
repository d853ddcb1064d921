//! Money calculation utilities using rust_decimal for precision
//!
//! All derivations are done using `Decimal` internally, then converted
//! to `f64` for storage/serialization.

use rust_decimal::prelude::*;

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Tolerance for monetary comparisons (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Maximum allowed single amount (total pool or payment)
pub const MAX_AMOUNT: f64 = 100_000_000.0;

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Monthly contribution derived from total pool and duration, 2dp.
///
/// Returns 0.0 for a non-positive duration; create-time validation
/// rejects those before any row exists.
pub fn monthly_amount(total_amount: f64, duration_months: i64) -> f64 {
    if duration_months <= 0 {
        return 0.0;
    }
    to_f64(to_decimal(total_amount) / Decimal::from(duration_months))
}

/// Sum amounts with precise arithmetic
pub fn sum_amounts<I: IntoIterator<Item = f64>>(amounts: I) -> f64 {
    let total: Decimal = amounts.into_iter().map(to_decimal).sum();
    to_f64(total)
}

/// Compare two monetary values for equality (within 0.01 tolerance)
pub fn money_eq(a: f64, b: f64) -> bool {
    let diff = (to_decimal(a) - to_decimal(b)).abs();
    diff < MONEY_TOLERANCE
}
