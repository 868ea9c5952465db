//! Price helpers.

use rust_decimal::{Decimal, RoundingStrategy};

/// Round a price to the nearest multiple of the instrument's tick size.
///
/// A non-positive tick leaves the value unchanged.
#[must_use]
pub fn round_to_tick(value: Decimal, tick: Decimal) -> Decimal {
    if tick <= Decimal::ZERO {
        return value;
    }
    let ticks = (value / tick).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    (ticks * tick).normalize()
}

/// `percent` of `value`, with `percent` given in whole percent (1.5 = 1.5%).
#[must_use]
pub fn percent_of(value: Decimal, percent: Decimal) -> Decimal {
    value * percent / Decimal::ONE_HUNDRED
}
