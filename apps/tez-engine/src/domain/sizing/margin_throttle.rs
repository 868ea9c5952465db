//! Caps desired quantity to what available margin can fund.

use rust_decimal::Decimal;
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;

use super::error::SizingError;

/// Inputs to the margin check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottleInput {
    /// Last traded price of the scrip being ordered.
    pub ltp: Decimal,
    /// Contract lot size.
    pub lot_size: u64,
    /// Desired quantity (lot aligned).
    pub quantity: u64,
    /// Margin (cash) available for the order.
    pub available_margin: Decimal,
}

/// Result of the margin check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottleOutcome {
    /// Quantity after throttling. Never above the desired quantity.
    pub quantity: u64,
    /// Buffered margin the desired quantity would have required.
    pub required_margin: Decimal,
    /// Whether the quantity was reduced.
    pub was_throttled: bool,
}

/// Margin throttle with a safety buffer on the notional.
#[derive(Debug, Clone, Copy)]
pub struct MarginThrottle {
    buffer: Decimal,
}

impl Default for MarginThrottle {
    fn default() -> Self {
        Self { buffer: dec!(1.1) }
    }
}

impl MarginThrottle {
    /// Apply the throttle.
    ///
    /// When `margin < ltp * buffer * qty` the quantity becomes
    /// `floor(margin / (buffer * ltp))` floored to a lot multiple.
    pub fn apply(&self, input: &ThrottleInput) -> Result<ThrottleOutcome, SizingError> {
        if input.ltp <= Decimal::ZERO {
            return Err(SizingError::InvalidInput(format!(
                "ltp must be positive, got {}",
                input.ltp
            )));
        }
        if input.lot_size == 0 {
            return Err(SizingError::InvalidInput(
                "lot size must be positive".to_string(),
            ));
        }

        let unit_cost = input.ltp * self.buffer;
        let required_margin = unit_cost * Decimal::from(input.quantity);

        if input.available_margin >= required_margin {
            return Ok(ThrottleOutcome {
                quantity: input.quantity,
                required_margin,
                was_throttled: false,
            });
        }

        let affordable = (input.available_margin.max(Decimal::ZERO) / unit_cost).floor();
        let affordable = affordable
            .to_u64()
            .ok_or(SizingError::Overflow { value: affordable })?;
        let quantity = (affordable / input.lot_size * input.lot_size).min(input.quantity);

        tracing::info!(
            available_margin = %input.available_margin,
            required_margin = %required_margin,
            old_qty = input.quantity,
            new_qty = quantity,
            "Insufficient margin, throttling quantity"
        );

        Ok(ThrottleOutcome {
            quantity,
            required_margin,
            was_throttled: true,
        })
    }
}
