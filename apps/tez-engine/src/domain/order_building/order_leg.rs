//! Order leg variants submitted to the broker gateway.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::shared::{Exchange, TradeAction, round_to_tick};

/// Bracket market order: primary leg bundled with profit and stop-loss legs.
///
/// Profit and loss are distances from the fill price, as the broker expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketOrder {
    /// Broker trading symbol.
    pub trading_symbol: String,
    /// Side of the primary leg.
    pub side: TradeAction,
    /// Leg quantity.
    pub quantity: u64,
    /// Price used to derive the distances.
    pub reference_price: Decimal,
    /// Book-profit distance, tick rounded.
    pub book_profit_price: Decimal,
    /// Book-loss distance, tick rounded.
    pub book_loss_price: Decimal,
    /// Tick size of the scrip.
    pub tick_size: Decimal,
    /// Traceability tag.
    pub remarks: Option<String>,
}

impl BracketOrder {
    /// Absolute profit target in the trade direction, tick rounded.
    #[must_use]
    pub fn target_price(&self) -> Decimal {
        let target = match self.side {
            TradeAction::Buy => self.reference_price + self.book_profit_price,
            TradeAction::Sell => self.reference_price - self.book_profit_price,
        };
        round_to_tick(target, self.tick_size)
    }

    /// Absolute stop price in the trade direction, tick rounded.
    #[must_use]
    pub fn stop_price(&self) -> Decimal {
        let stop = match self.side {
            TradeAction::Buy => self.reference_price - self.book_loss_price,
            TradeAction::Sell => self.reference_price + self.book_loss_price,
        };
        round_to_tick(stop, self.tick_size)
    }
}

/// Primary market order plus a contingent opposite-side OCO pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcoOrder {
    /// Exchange segment.
    pub exchange: Exchange,
    /// Broker trading symbol.
    pub trading_symbol: String,
    /// Side of the primary leg.
    pub primary_side: TradeAction,
    /// Primary leg quantity.
    pub quantity: u64,
    /// Alert price that books profit. `None` when OCO mode is off.
    pub profit_alert: Option<Decimal>,
    /// Alert price that books loss. `None` when OCO mode is off.
    pub loss_alert: Option<Decimal>,
    /// Traceability tag.
    pub remarks: Option<String>,
}

impl OcoOrder {
    /// Side of the contingent exit legs.
    #[must_use]
    pub const fn contingent_side(&self) -> TradeAction {
        self.primary_side.opposite()
    }
}

/// One order leg of a market action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OrderLeg {
    /// Equity bracket order.
    Bracket(BracketOrder),
    /// Primary order with contingent OCO exit.
    PrimaryWithOco(OcoOrder),
}

impl OrderLeg {
    /// Leg quantity.
    #[must_use]
    pub const fn quantity(&self) -> u64 {
        match self {
            Self::Bracket(o) => o.quantity,
            Self::PrimaryWithOco(o) => o.quantity,
        }
    }

    /// Trading symbol.
    #[must_use]
    pub fn trading_symbol(&self) -> &str {
        match self {
            Self::Bracket(o) => &o.trading_symbol,
            Self::PrimaryWithOco(o) => &o.trading_symbol,
        }
    }

    /// Side of the primary leg.
    #[must_use]
    pub const fn side(&self) -> TradeAction {
        match self {
            Self::Bracket(o) => o.side,
            Self::PrimaryWithOco(o) => o.primary_side,
        }
    }

    /// Absolute stop-loss trigger, if any.
    #[must_use]
    pub fn stop_loss_trigger(&self) -> Option<Decimal> {
        match self {
            Self::Bracket(o) => Some(o.stop_price()),
            Self::PrimaryWithOco(o) => o.loss_alert,
        }
    }

    /// Absolute profit trigger, if any.
    #[must_use]
    pub fn profit_trigger(&self) -> Option<Decimal> {
        match self {
            Self::Bracket(o) => Some(o.target_price()),
            Self::PrimaryWithOco(o) => o.profit_alert,
        }
    }

    /// Remarks tag, once stamped.
    #[must_use]
    pub fn remarks(&self) -> Option<&str> {
        match self {
            Self::Bracket(o) => o.remarks.as_deref(),
            Self::PrimaryWithOco(o) => o.remarks.as_deref(),
        }
    }

    /// Return the leg with its remarks set.
    #[must_use]
    pub fn with_remarks(mut self, remarks: impl Into<String>) -> Self {
        let remarks = Some(remarks.into());
        match &mut self {
            Self::Bracket(o) => o.remarks = remarks,
            Self::PrimaryWithOco(o) => o.remarks = remarks,
        }
        self
    }
}
