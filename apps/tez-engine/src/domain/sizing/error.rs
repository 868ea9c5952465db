//! Error types for quantity sizing.

use rust_decimal::Decimal;
use thiserror::Error;

/// Error during margin throttling or leg allocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SizingError {
    /// Nothing left to trade. Callers abort the action without submitting.
    #[error("quantity is zero, nothing to allocate")]
    ZeroQuantity,

    /// Invalid input (non-positive price, zero lot size, misaligned quantity).
    #[error("invalid sizing input: {0}")]
    InvalidInput(String),

    /// Freeze quantity leaves no room for even one lot per order.
    #[error("freeze quantity {freeze_qty} does not exceed lot size {lot_size}")]
    FreezeBelowLotSize {
        /// Exchange freeze quantity.
        freeze_qty: u64,
        /// Contract lot size.
        lot_size: u64,
    },

    /// Price has no finite quantity equivalent.
    #[error("cannot convert {value} to a quantity")]
    Overflow {
        /// Offending value.
        value: Decimal,
    },

    /// An allocation broke one of its guarantees.
    #[error("leg plan invariant violated: {0}")]
    InvariantViolation(String),
}
