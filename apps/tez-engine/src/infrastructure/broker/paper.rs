//! Paper broker gateway.
//!
//! Simulates a broker session: every leg fills immediately at its full
//! quantity, order ids are UUIDs and OCO legs get a linked alert id when OCO
//! mode is on. Square-off requests are recorded for inspection.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use rust_decimal::Decimal;

use crate::application::ports::{
    BrokerGatewayPort, GatewayError, LegPlacement, LegResult, LegStatus, LtpQuote, SecurityInfo,
    SubmissionBatch, TradeRecord,
};
use crate::domain::order_building::OrderLeg;
use crate::domain::shared::{AlertId, BrokerOrderId, Exchange, Scrip, ScripToken};

/// A recorded square-off request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SquareOffCall {
    /// Symbol root filter, if any.
    pub symbol: Option<String>,
    /// Records selected for unwinding.
    pub unwound: Vec<TradeRecord>,
}

/// Paper trading gateway.
#[derive(Debug)]
pub struct PaperBrokerGateway {
    quote: LtpQuote,
    freeze_qty: Option<u64>,
    margin: Mutex<Decimal>,
    scrips: Mutex<HashMap<(Exchange, String), Scrip>>,
    placed: Mutex<Vec<OrderLeg>>,
    square_offs: Mutex<Vec<SquareOffCall>>,
}

impl PaperBrokerGateway {
    /// Create a gateway quoting every scrip at `quote`.
    #[must_use]
    pub fn new(quote: LtpQuote, freeze_qty: Option<u64>, margin: Decimal) -> Self {
        Self {
            quote,
            freeze_qty,
            margin: Mutex::new(margin),
            scrips: Mutex::new(HashMap::new()),
            placed: Mutex::new(Vec::new()),
            square_offs: Mutex::new(Vec::new()),
        }
    }

    /// Change the available margin.
    pub fn set_margin(&self, margin: Decimal) {
        *self.margin.lock() = margin;
    }

    /// Every leg placed so far.
    #[must_use]
    pub fn placed_legs(&self) -> Vec<OrderLeg> {
        self.placed.lock().clone()
    }

    /// Every square-off request so far.
    #[must_use]
    pub fn square_off_calls(&self) -> Vec<SquareOffCall> {
        self.square_offs.lock().clone()
    }
}

#[async_trait]
impl BrokerGatewayPort for PaperBrokerGateway {
    async fn search_scrip(&self, exchange: Exchange, text: &str) -> Result<Scrip, GatewayError> {
        if text.trim().is_empty() {
            return Err(GatewayError::ScripNotFound {
                exchange,
                search_text: text.to_string(),
            });
        }

        let mut scrips = self.scrips.lock();
        let next_token = 10_000 + scrips.len();
        let scrip = scrips
            .entry((exchange, text.to_string()))
            .or_insert_with(|| {
                let tsym = match exchange {
                    Exchange::Nse => format!("{text}-EQ"),
                    Exchange::Nfo => text.to_string(),
                };
                Scrip::new(exchange, ScripToken::new(next_token.to_string()), tsym)
            })
            .clone();

        tracing::debug!(%scrip, token = %scrip.token, "Paper scrip resolved");
        Ok(scrip)
    }

    async fn fetch_ltp(
        &self,
        _exchange: Exchange,
        _token: &ScripToken,
    ) -> Result<LtpQuote, GatewayError> {
        Ok(self.quote)
    }

    async fn get_security_info(
        &self,
        _exchange: Exchange,
        _trading_symbol: &str,
        _token: &ScripToken,
    ) -> Result<SecurityInfo, GatewayError> {
        Ok(SecurityInfo {
            freeze_qty: self.freeze_qty,
        })
    }

    async fn available_margin(&self) -> Result<Decimal, GatewayError> {
        Ok(*self.margin.lock())
    }

    async fn place_and_confirm_orders(
        &self,
        legs: &[OrderLeg],
        use_oco: bool,
    ) -> Result<SubmissionBatch, GatewayError> {
        let mut batch = SubmissionBatch {
            exception_occurred: false,
            all_ok: true,
            results: Vec::with_capacity(legs.len()),
            placements: Vec::with_capacity(legs.len()),
        };

        for (leg_index, leg) in legs.iter().enumerate() {
            let order_id = BrokerOrderId::generate();
            let linked_oco_id = match leg {
                OrderLeg::PrimaryWithOco(_) if use_oco => Some(AlertId::generate()),
                _ => None,
            };

            tracing::info!(
                leg = leg_index + 1,
                %order_id,
                tsym = leg.trading_symbol(),
                qty = leg.quantity(),
                remarks = leg.remarks().unwrap_or_default(),
                "Paper order filled"
            );

            batch.placements.push(LegPlacement {
                leg_index,
                order_id: Some(order_id.clone()),
                linked_oco_id,
            });
            batch.results.push((
                LegStatus::Success,
                LegResult {
                    order_id,
                    fill_timestamp: Utc::now(),
                    filled_qty: leg.quantity(),
                },
            ));
        }

        self.placed.lock().extend(legs.iter().cloned());
        Ok(batch)
    }

    async fn square_off_position(
        &self,
        open_orders: &[TradeRecord],
        symbol: Option<&str>,
    ) -> Result<(), GatewayError> {
        let unwound: Vec<TradeRecord> = open_orders
            .iter()
            .filter(|r| symbol.is_none_or(|s| r.symbol_key.starts_with(s)))
            .cloned()
            .collect();

        for record in &unwound {
            tracing::info!(
                order_id = %record.order_id,
                symbol = %record.symbol_key,
                qty = record.filled_qty,
                "Paper position squared off"
            );
        }

        self.square_offs.lock().push(SquareOffCall {
            symbol: symbol.map(str::to_string),
            unwound,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order_building::OcoOrder;
    use crate::domain::shared::TradeAction;
    use rust_decimal_macros::dec;

    fn gateway() -> PaperBrokerGateway {
        PaperBrokerGateway::new(
            LtpQuote {
                price: dec!(100),
                tick_size: dec!(0.05),
                lot_size: 50,
            },
            Some(1800),
            dec!(1_000_000),
        )
    }

    fn oco_leg(qty: u64) -> OrderLeg {
        OrderLeg::PrimaryWithOco(OcoOrder {
            exchange: Exchange::Nfo,
            trading_symbol: "NIFTY25JAN24C21500".to_string(),
            primary_side: TradeAction::Buy,
            quantity: qty,
            profit_alert: Some(dec!(110)),
            loss_alert: Some(dec!(95)),
            remarks: None,
        })
    }

    #[tokio::test]
    async fn search_is_stable_per_text() {
        let gw = gateway();
        let a = gw.search_scrip(Exchange::Nfo, "NIFTY25JAN24C21500").await.unwrap();
        let b = gw.search_scrip(Exchange::Nfo, "NIFTY25JAN24C21500").await.unwrap();
        let eq = gw.search_scrip(Exchange::Nse, "NIFTYBEES").await.unwrap();

        assert_eq!(a, b);
        assert_ne!(a.token, eq.token);
        assert_eq!(eq.trading_symbol, "NIFTYBEES-EQ");
    }

    #[tokio::test]
    async fn fills_every_leg_and_links_oco() {
        let gw = gateway();
        let batch = gw
            .place_and_confirm_orders(&[oco_leg(1750), oco_leg(500)], true)
            .await
            .unwrap();

        assert!(batch.all_ok);
        assert_eq!(batch.results.len(), 2);
        assert_eq!(batch.results[1].1.filled_qty, 500);
        let first = &batch.results[0].1.order_id;
        assert!(batch.linked_oco_for(first).is_some());
        assert_eq!(gw.placed_legs().len(), 2);
    }

    #[tokio::test]
    async fn no_oco_ids_when_mode_off() {
        let gw = gateway();
        let batch = gw.place_and_confirm_orders(&[oco_leg(50)], false).await.unwrap();
        assert!(batch.placements[0].linked_oco_id.is_none());
    }

    #[tokio::test]
    async fn square_off_filters_by_symbol_root() {
        let gw = gateway();
        let record = |key: &str| TradeRecord {
            order_id: BrokerOrderId::generate(),
            symbol_key: key.to_string(),
            filled_qty: 50,
            fill_time: Utc::now(),
            status: LegStatus::Success,
            linked_oco_id: None,
        };
        let records = vec![
            record("NIFTY25JAN24C21500_10000"),
            record("BANKNIFTY25JAN24C45000_10001"),
        ];

        gw.square_off_position(&records, Some("BANKNIFTY")).await.unwrap();
        gw.square_off_position(&records, None).await.unwrap();

        let calls = gw.square_off_calls();
        assert_eq!(calls[0].unwound.len(), 1);
        assert_eq!(calls[0].symbol.as_deref(), Some("BANKNIFTY"));
        assert_eq!(calls[1].unwound.len(), 2);
    }
}
