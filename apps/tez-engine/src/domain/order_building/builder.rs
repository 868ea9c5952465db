//! Builds the order legs for a market action.

use rust_decimal::Decimal;

use super::order_leg::{BracketOrder, OcoOrder, OrderLeg};
use super::remarks::leg_remarks;
use crate::domain::instrument::{ExitParams, InstrumentInfo};
use crate::domain::shared::{
    DomainError, InstrumentClass, Scrip, TradeAction, percent_of, round_to_tick,
};
use crate::domain::sizing::LegPlan;

/// Everything known about a trade before it is split into legs.
///
/// Built per market action and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderIntent {
    /// Requested direction.
    pub action: TradeAction,
    /// Selected underlying key.
    pub underlying: String,
    /// Tradable scrip resolved from search.
    pub scrip: Scrip,
    /// Total quantity after margin throttling.
    pub quantity: u64,
    /// Last traded price of the scrip.
    pub ltp: Decimal,
    /// Tick size of the scrip.
    pub tick_size: Decimal,
    /// Lot size of the scrip.
    pub lot_size: u64,
    /// Freeze quantity in effect.
    pub freeze_qty: u64,
    /// Leg-count hint.
    pub given_nlegs: u32,
}

/// Constructs [`OrderLeg`] values from an intent and a leg plan.
#[derive(Debug, Clone, Copy)]
pub struct OrderBuilder {
    use_oco: bool,
}

impl OrderBuilder {
    /// Create a builder. `use_oco` selects GTT/OCO exits over bracket orders.
    #[must_use]
    pub const fn new(use_oco: bool) -> Self {
        Self { use_oco }
    }

    /// Build one independent leg per planned quantity, remarks stamped.
    ///
    /// Every planned quantity must be a lot multiple below the freeze
    /// quantity of the intent.
    pub fn build(
        &self,
        intent: &OrderIntent,
        info: &InstrumentInfo,
        plan: &LegPlan,
    ) -> Result<Vec<OrderLeg>, DomainError> {
        Self::check_plan(intent, plan)?;
        let template = self.template(intent, info)?;

        let legs = plan
            .leg_quantities()
            .into_iter()
            .enumerate()
            .map(|(i, qty)| {
                let leg = template.for_quantity(qty);
                match leg_remarks(i + 1, qty, intent.quantity) {
                    Ok(remarks) => leg.with_remarks(remarks),
                    Err(e) => {
                        tracing::error!(leg = i + 1, qty, error = %e, "Failed to stamp remarks");
                        leg
                    }
                }
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            underlying = %intent.underlying,
            legs = legs.len(),
            given_nlegs = intent.given_nlegs,
            tsym = %intent.scrip.trading_symbol,
            use_oco = self.use_oco,
            "Order legs built"
        );

        Ok(legs)
    }

    fn check_plan(intent: &OrderIntent, plan: &LegPlan) -> Result<(), DomainError> {
        let lot = intent.lot_size.max(1);
        let bad_leg = plan
            .leg_quantities()
            .into_iter()
            .find(|&qty| qty == 0 || qty >= intent.freeze_qty || qty % lot != 0);

        match bad_leg {
            Some(qty) => Err(DomainError::InvariantViolation {
                aggregate: "OrderBuilder".to_string(),
                invariant: "leg is a lot multiple below freeze quantity".to_string(),
                state: format!(
                    "leg {qty}, lot {}, freeze {}",
                    intent.lot_size, intent.freeze_qty
                ),
            }),
            None => Ok(()),
        }
    }

    fn template(
        &self,
        intent: &OrderIntent,
        info: &InstrumentInfo,
    ) -> Result<LegTemplate, DomainError> {
        let ltp = intent.ltp;
        let tick = intent.tick_size;
        let tsym = intent.scrip.trading_symbol.clone();

        match (info.class(), info.exit_params()?) {
            (InstrumentClass::Equity, ExitParams::Percent { profit, stoploss }) => {
                if self.use_oco {
                    let (profit_alert, loss_alert) = match intent.action {
                        TradeAction::Buy => (
                            ltp + percent_of(ltp, profit),
                            ltp - percent_of(ltp, stoploss),
                        ),
                        TradeAction::Sell => (
                            ltp - percent_of(ltp, profit),
                            ltp + percent_of(ltp, stoploss),
                        ),
                    };
                    Ok(LegTemplate::Oco(OcoOrder {
                        exchange: intent.scrip.exchange,
                        trading_symbol: tsym,
                        primary_side: intent.action,
                        quantity: 0,
                        profit_alert: Some(round_to_tick(profit_alert, tick)),
                        loss_alert: Some(round_to_tick(loss_alert, tick)),
                        remarks: None,
                    }))
                } else {
                    Ok(LegTemplate::Bracket(BracketOrder {
                        trading_symbol: tsym,
                        side: intent.action,
                        quantity: 0,
                        reference_price: ltp,
                        book_profit_price: round_to_tick(percent_of(ltp, profit), tick),
                        book_loss_price: round_to_tick(percent_of(ltp, stoploss), tick),
                        tick_size: tick,
                        remarks: None,
                    }))
                }
            }
            (InstrumentClass::Derivative, ExitParams::Points { profit, stoploss }) => {
                // A Sell intent already selected a put, so the primary always buys.
                let (profit_alert, loss_alert) = if self.use_oco {
                    (
                        Some(round_to_tick(ltp + profit, tick)),
                        Some(round_to_tick(ltp - stoploss, tick)),
                    )
                } else {
                    (None, None)
                };
                Ok(LegTemplate::Oco(OcoOrder {
                    exchange: intent.scrip.exchange,
                    trading_symbol: tsym,
                    primary_side: TradeAction::Buy,
                    quantity: 0,
                    profit_alert,
                    loss_alert,
                    remarks: None,
                }))
            }
            (class, _) => Err(DomainError::InvariantViolation {
                aggregate: "OrderBuilder".to_string(),
                invariant: "exit parameters match instrument class".to_string(),
                state: format!("{class:?} {}", info.symbol),
            }),
        }
    }
}

enum LegTemplate {
    Bracket(BracketOrder),
    Oco(OcoOrder),
}

impl LegTemplate {
    fn for_quantity(&self, quantity: u64) -> OrderLeg {
        match self {
            Self::Bracket(o) => OrderLeg::Bracket(BracketOrder {
                quantity,
                ..o.clone()
            }),
            Self::Oco(o) => OrderLeg::PrimaryWithOco(OcoOrder {
                quantity,
                ..o.clone()
            }),
        }
    }
}
