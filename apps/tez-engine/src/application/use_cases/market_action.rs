//! Market Action Use Case
//!
//! Turns a Buy/Sell intent on the selected underlying into broker-compliant
//! legs, submits them in one gateway call and reconciles the results into the
//! ledger.

use std::sync::Arc;

use crate::application::ports::{
    BrokerGatewayPort, GatewayError, LedgerPort, MarketDataError, MarketDataPort, SubmissionBatch,
    TradeRecord,
};
use crate::domain::instrument::{InstrumentInfo, InstrumentResolver, select_strike};
use crate::domain::order_building::{OrderBuilder, OrderIntent, OrderLeg};
use crate::domain::shared::{DomainError, Exchange, InstrumentClass, Scrip, TradeAction};
use crate::domain::sizing::{
    AllocationInput, LegPlan, MarginThrottle, QuantityAllocator, SizingError, ThrottleInput,
    effective_freeze_qty,
};

/// Trading settings a market action runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketActionSettings {
    /// Exchange segment traded.
    pub exchange: Exchange,
    /// Quantity per action, in lots.
    pub quantity_lots: u64,
    /// Leg-count hint.
    pub given_nlegs: u32,
    /// Use GTT/OCO exits instead of bracket orders.
    pub use_oco: bool,
}

/// Error from a market action.
#[derive(Debug, thiserror::Error)]
pub enum MarketActionError {
    /// The selected underlying is not configured for the exchange.
    #[error("Instrument not configured: {0}")]
    Instrument(#[source] DomainError),

    /// Strike selection or order building failed.
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// Sizing inputs were invalid.
    #[error("Sizing error: {0}")]
    Sizing(#[from] SizingError),

    /// Underlying tick unavailable.
    #[error("Market data error: {0}")]
    MarketData(#[from] MarketDataError),

    /// Broker call failed.
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),
}

/// What a completed submission produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketActionReport {
    /// Scrip traded.
    pub scrip: Scrip,
    /// Total quantity after throttling.
    pub quantity: u64,
    /// Whether margin reduced the quantity.
    pub throttled: bool,
    /// Leg plan used.
    pub plan: LegPlan,
    /// Legs submitted.
    pub legs: Vec<OrderLeg>,
    /// The gateway flagged an exception mid-placement.
    pub exception_occurred: bool,
    /// Every leg succeeded.
    pub all_ok: bool,
    /// Records appended to the ledger.
    pub records: Vec<TradeRecord>,
    /// Sum of filled quantity over all results.
    pub total_filled_qty: u64,
}

/// Result of a market action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarketActionOutcome {
    /// Nothing was submitted.
    Skipped {
        /// Why the action was skipped.
        reason: String,
    },
    /// Legs were submitted and reconciled.
    Submitted(MarketActionReport),
}

/// Use case for Buy/Sell market actions.
pub struct MarketActionUseCase<B, M, L>
where
    B: BrokerGatewayPort,
    M: MarketDataPort,
    L: LedgerPort,
{
    gateway: Arc<B>,
    market_data: Arc<M>,
    ledger: Arc<L>,
    resolver: InstrumentResolver,
    settings: MarketActionSettings,
    throttle: MarginThrottle,
    allocator: QuantityAllocator,
    builder: OrderBuilder,
}

impl<B, M, L> MarketActionUseCase<B, M, L>
where
    B: BrokerGatewayPort,
    M: MarketDataPort,
    L: LedgerPort,
{
    /// Create a new MarketActionUseCase.
    pub fn new(
        gateway: Arc<B>,
        market_data: Arc<M>,
        ledger: Arc<L>,
        resolver: InstrumentResolver,
        settings: MarketActionSettings,
    ) -> Self {
        Self {
            gateway,
            market_data,
            ledger,
            resolver,
            settings,
            throttle: MarginThrottle::default(),
            allocator: QuantityAllocator::new(),
            builder: OrderBuilder::new(settings.use_oco),
        }
    }

    /// Execute the use case for `action` on `underlying`.
    pub async fn execute(
        &self,
        action: TradeAction,
        underlying: &str,
    ) -> Result<MarketActionOutcome, MarketActionError> {
        let exchange = self.settings.exchange;

        // 1. Resolve instrument
        let info = self
            .resolver
            .resolve(exchange, underlying)
            .map_err(MarketActionError::Instrument)?
            .clone();

        // 2. Resolve the tradable scrip
        let search_text = self.search_text(&info, action).await?;
        let scrip = self.gateway.search_scrip(exchange, &search_text).await?;

        // 3. Quote, lot and freeze
        let quote = self.gateway.fetch_ltp(exchange, &scrip.token).await?;
        let lot_size = match quote.lot_size {
            0 => info.lot_size.unwrap_or(1),
            lot => lot,
        };
        let desired_qty = self.settings.quantity_lots.saturating_mul(lot_size);
        let security = self
            .gateway
            .get_security_info(exchange, &scrip.trading_symbol, &scrip.token)
            .await?;
        let freeze_qty = effective_freeze_qty(security.freeze_qty, desired_qty);

        tracing::info!(
            %action,
            underlying,
            scrip = %scrip,
            ltp = %quote.price,
            lot_size,
            desired_qty,
            freeze_qty,
            "Market action sized"
        );

        // 4. Margin throttle
        let margin = self.gateway.available_margin().await?;
        let throttled = self.throttle.apply(&ThrottleInput {
            ltp: quote.price,
            lot_size,
            quantity: desired_qty,
            available_margin: margin,
        })?;

        if throttled.quantity == 0 {
            let reason = format!(
                "quantity is zero after margin check (available {margin}, required {})",
                throttled.required_margin
            );
            tracing::info!(%action, underlying, %reason, "Market action skipped");
            return Ok(MarketActionOutcome::Skipped { reason });
        }

        // 5. Allocate and build
        let plan = self.allocator.allocate(&AllocationInput {
            quantity: throttled.quantity,
            freeze_qty,
            lot_size,
            given_nlegs: self.settings.given_nlegs,
        })?;

        let intent = OrderIntent {
            action,
            underlying: underlying.to_string(),
            scrip: scrip.clone(),
            quantity: throttled.quantity,
            ltp: quote.price,
            tick_size: quote.tick_size,
            lot_size,
            freeze_qty,
            given_nlegs: self.settings.given_nlegs,
        };
        let legs = self.builder.build(&intent, &info, &plan)?;

        // 6. Submit
        let batch = self
            .gateway
            .place_and_confirm_orders(&legs, self.settings.use_oco)
            .await?;
        if batch.exception_occurred {
            tracing::warn!(
                results = batch.results.len(),
                legs = legs.len(),
                "Exception occurred while placing orders"
            );
        }
        if batch.all_ok {
            tracing::debug!(legs = legs.len(), "All legs confirmed");
        }

        // 7. Reconcile
        let (records, total_filled_qty) = self.reconcile(&scrip, &batch).await;

        Ok(MarketActionOutcome::Submitted(MarketActionReport {
            scrip,
            quantity: throttled.quantity,
            throttled: throttled.was_throttled,
            plan,
            legs,
            exception_occurred: batch.exception_occurred,
            all_ok: batch.all_ok,
            records,
            total_filled_qty,
        }))
    }

    async fn search_text(
        &self,
        info: &InstrumentInfo,
        action: TradeAction,
    ) -> Result<String, MarketActionError> {
        match info.class() {
            InstrumentClass::Equity => Ok(info.symbol.clone()),
            InstrumentClass::Derivative => {
                let ul_ltp = self.market_data.get_latest_tick().await?;
                let selection = select_strike(info, action, ul_ltp)?;
                tracing::info!(
                    ul_ltp = %ul_ltp,
                    strike = %selection.strike,
                    search_text = %selection.search_text,
                    "Strike selected"
                );
                Ok(selection.search_text)
            }
        }
    }

    /// Fold the gateway results into ledger records.
    ///
    /// Ledger failures are logged per record and do not stop the fold.
    async fn reconcile(&self, scrip: &Scrip, batch: &SubmissionBatch) -> (Vec<TradeRecord>, u64) {
        let symbol_key = scrip.ledger_key();
        let mut records = Vec::with_capacity(batch.results.len());
        let mut total_qty = 0u64;

        for (status, result) in &batch.results {
            total_qty += result.filled_qty;
            let record = TradeRecord {
                order_id: result.order_id.clone(),
                symbol_key: symbol_key.clone(),
                filled_qty: result.filled_qty,
                fill_time: result.fill_timestamp,
                status: *status,
                linked_oco_id: batch.linked_oco_for(&result.order_id).cloned(),
            };

            if let Err(e) = self.ledger.save_order(record.clone()).await {
                tracing::error!(order_id = %record.order_id, error = %e, "Failed to save order");
            }
            records.push(record);
        }

        tracing::info!(total_qty, symbol = %symbol_key, "Total Qty taken");
        if let Err(e) = self.ledger.show().await {
            tracing::error!(error = %e, "Failed to show ledger");
        }

        (records, total_qty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{
        LedgerError, LegPlacement, LegResult, LegStatus, LtpQuote, SecurityInfo,
    };
    use crate::domain::instrument::instrument_info::fixtures::{nifty_options, niftybees};
    use crate::domain::shared::{AlertId, BrokerOrderId, ScripToken};
    use async_trait::async_trait;
    use chrono::Utc;
    use parking_lot::Mutex;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    // Mock gateway
    struct MockGateway {
        quote: LtpQuote,
        freeze_qty: Option<u64>,
        margin: Decimal,
        fail_from_leg: Option<usize>,
        exception: bool,
        searches: Mutex<Vec<String>>,
        submitted: Mutex<Vec<OrderLeg>>,
    }

    impl MockGateway {
        fn new(quote: LtpQuote, freeze_qty: Option<u64>, margin: Decimal) -> Self {
            Self {
                quote,
                freeze_qty,
                margin,
                fail_from_leg: None,
                exception: false,
                searches: Mutex::new(Vec::new()),
                submitted: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl BrokerGatewayPort for MockGateway {
        async fn search_scrip(&self, exchange: Exchange, text: &str) -> Result<Scrip, GatewayError> {
            self.searches.lock().push(text.to_string());
            Ok(Scrip::new(exchange, ScripToken::new("43650"), format!("{text}-T")))
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
            Ok(self.margin)
        }

        async fn place_and_confirm_orders(
            &self,
            legs: &[OrderLeg],
            use_oco: bool,
        ) -> Result<SubmissionBatch, GatewayError> {
            self.submitted.lock().extend(legs.iter().cloned());

            let mut batch = SubmissionBatch {
                exception_occurred: self.exception,
                all_ok: self.fail_from_leg.is_none() && !self.exception,
                ..SubmissionBatch::default()
            };
            for (i, leg) in legs.iter().enumerate() {
                let order_id = BrokerOrderId::new(format!("ORD-{i}"));
                let failed = self.fail_from_leg.is_some_and(|f| i >= f);
                batch.placements.push(LegPlacement {
                    leg_index: i,
                    order_id: Some(order_id.clone()),
                    linked_oco_id: use_oco.then(|| AlertId::new(format!("GTT-{i}"))),
                });
                batch.results.push((
                    if failed {
                        LegStatus::HardFailure
                    } else {
                        LegStatus::Success
                    },
                    LegResult {
                        order_id,
                        fill_timestamp: Utc::now(),
                        filled_qty: if failed { 0 } else { leg.quantity() },
                    },
                ));
            }
            Ok(batch)
        }

        async fn square_off_position(
            &self,
            _open_orders: &[TradeRecord],
            _symbol: Option<&str>,
        ) -> Result<(), GatewayError> {
            Ok(())
        }
    }

    struct FixedTick(Decimal);

    #[async_trait]
    impl MarketDataPort for FixedTick {
        fn select_underlying(&self, _underlying: &str) {}

        async fn get_latest_tick(&self) -> Result<Decimal, MarketDataError> {
            Ok(self.0)
        }
    }

    // Mock ledger
    #[derive(Default)]
    struct MockLedger {
        records: Mutex<Vec<TradeRecord>>,
        fail_saves: bool,
        shows: Mutex<usize>,
    }

    #[async_trait]
    impl LedgerPort for MockLedger {
        async fn save_order(&self, record: TradeRecord) -> Result<(), LedgerError> {
            if self.fail_saves {
                return Err(LedgerError::Corrupt {
                    line: 0,
                    message: "read only".to_string(),
                });
            }
            self.records.lock().push(record);
            Ok(())
        }

        async fn fetch_open_orders(&self) -> Result<Vec<TradeRecord>, LedgerError> {
            Ok(self.records.lock().iter().filter(|r| r.is_open()).cloned().collect())
        }

        async fn show(&self) -> Result<(), LedgerError> {
            *self.shows.lock() += 1;
            Ok(())
        }
    }

    fn resolver() -> InstrumentResolver {
        let mut map = BTreeMap::new();
        map.insert("NIFTY_OPT".to_string(), nifty_options());
        map.insert("NIFTY_ETF".to_string(), niftybees());
        InstrumentResolver::new(map)
    }

    fn settings(exchange: Exchange, quantity_lots: u64, use_oco: bool) -> MarketActionSettings {
        MarketActionSettings {
            exchange,
            quantity_lots,
            given_nlegs: 1,
            use_oco,
        }
    }

    fn use_case(
        gateway: MockGateway,
        ledger: MockLedger,
        settings: MarketActionSettings,
    ) -> (
        MarketActionUseCase<MockGateway, FixedTick, MockLedger>,
        Arc<MockGateway>,
        Arc<MockLedger>,
    ) {
        let gateway = Arc::new(gateway);
        let ledger = Arc::new(ledger);
        let uc = MarketActionUseCase::new(
            Arc::clone(&gateway),
            Arc::new(FixedTick(dec!(21512.3))),
            Arc::clone(&ledger),
            resolver(),
            settings,
        );
        (uc, gateway, ledger)
    }

    fn quote(price: Decimal, lot_size: u64) -> LtpQuote {
        LtpQuote {
            price,
            tick_size: dec!(0.05),
            lot_size,
        }
    }

    #[tokio::test]
    async fn derivative_action_splits_at_freeze_and_records_legs() {
        let gateway = MockGateway::new(quote(dec!(100), 50), Some(1800), dec!(10_000_000));
        let (uc, gateway, ledger) =
            use_case(gateway, MockLedger::default(), settings(Exchange::Nfo, 80, true));

        let outcome = uc.execute(TradeAction::Buy, "NIFTY").await.unwrap();

        let MarketActionOutcome::Submitted(report) = outcome else {
            panic!("expected submission");
        };
        assert_eq!(gateway.searches.lock().as_slice(), ["NIFTY25JAN24C21500"]);
        assert_eq!(report.quantity, 4000);
        assert_eq!(report.plan.leg_quantities(), vec![1750, 1750, 500]);
        assert_eq!(report.total_filled_qty, 4000);
        assert_eq!(report.records.len(), 3);
        assert_eq!(report.records[0].symbol_key, "NIFTY25JAN24C21500-T_43650");
        assert_eq!(report.records[2].linked_oco_id, Some(AlertId::new("GTT-2")));
        assert_eq!(ledger.records.lock().len(), 3);
        assert_eq!(*ledger.shows.lock(), 1);
    }

    #[tokio::test]
    async fn equity_action_searches_symbol_without_tick() {
        let gateway = MockGateway::new(quote(dec!(250), 1), None, dec!(1_000_000));
        let (uc, gateway, _) =
            use_case(gateway, MockLedger::default(), settings(Exchange::Nse, 10, false));

        let outcome = uc.execute(TradeAction::Sell, "NIFTY").await.unwrap();

        assert_eq!(gateway.searches.lock().as_slice(), ["NIFTYBEES"]);
        let MarketActionOutcome::Submitted(report) = outcome else {
            panic!("expected submission");
        };
        assert!(matches!(report.legs[0], OrderLeg::Bracket(_)));
        assert_eq!(report.records[0].linked_oco_id, None);
    }

    #[tokio::test]
    async fn margin_throttles_before_allocation() {
        // 10000 / (1.1 * 100) = 90
        let gateway = MockGateway::new(quote(dec!(100), 1), Some(900), dec!(10000));
        let (uc, gateway, _) =
            use_case(gateway, MockLedger::default(), settings(Exchange::Nse, 200, false));

        let MarketActionOutcome::Submitted(report) =
            uc.execute(TradeAction::Buy, "NIFTY").await.unwrap()
        else {
            panic!("expected submission");
        };
        assert!(report.throttled);
        assert_eq!(report.quantity, 90);
        assert_eq!(gateway.submitted.lock().len(), 1);
    }

    #[tokio::test]
    async fn zero_quantity_skips_submission() {
        let gateway = MockGateway::new(quote(dec!(100), 50), Some(1800), dec!(100));
        let (uc, gateway, ledger) =
            use_case(gateway, MockLedger::default(), settings(Exchange::Nfo, 1, true));

        let outcome = uc.execute(TradeAction::Buy, "NIFTY").await.unwrap();

        assert!(matches!(outcome, MarketActionOutcome::Skipped { .. }));
        assert!(gateway.submitted.lock().is_empty());
        assert!(ledger.records.lock().is_empty());
    }

    #[tokio::test]
    async fn unknown_underlying_is_fatal() {
        let gateway = MockGateway::new(quote(dec!(100), 50), None, dec!(100));
        let (uc, _, _) = use_case(gateway, MockLedger::default(), settings(Exchange::Nfo, 1, true));

        let err = uc.execute(TradeAction::Buy, "SENSEX").await.unwrap_err();
        assert!(matches!(err, MarketActionError::Instrument(_)));
    }

    #[tokio::test]
    async fn partial_failures_are_still_reconciled() {
        let mut gateway = MockGateway::new(quote(dec!(250), 1), Some(900), dec!(10_000_000));
        gateway.fail_from_leg = Some(1);
        gateway.exception = true;
        let (uc, _, ledger) =
            use_case(gateway, MockLedger::default(), settings(Exchange::Nse, 2500, false));

        let MarketActionOutcome::Submitted(report) =
            uc.execute(TradeAction::Buy, "NIFTY").await.unwrap()
        else {
            panic!("expected submission");
        };
        assert!(report.exception_occurred);
        assert!(!report.all_ok);
        assert_eq!(report.total_filled_qty, 899);

        let statuses: Vec<_> = ledger.records.lock().iter().map(|r| r.status).collect();
        assert_eq!(
            statuses,
            vec![LegStatus::Success, LegStatus::HardFailure, LegStatus::HardFailure]
        );
    }

    #[tokio::test]
    async fn ledger_failures_do_not_abort_reconciliation() {
        let gateway = MockGateway::new(quote(dec!(250), 1), Some(900), dec!(10_000_000));
        let ledger = MockLedger {
            fail_saves: true,
            ..MockLedger::default()
        };
        let (uc, _, ledger) = use_case(gateway, ledger, settings(Exchange::Nse, 2500, false));

        let MarketActionOutcome::Submitted(report) =
            uc.execute(TradeAction::Buy, "NIFTY").await.unwrap()
        else {
            panic!("expected submission");
        };
        assert_eq!(report.records.len(), 3);
        assert_eq!(report.total_filled_qty, 2500);
        assert_eq!(*ledger.shows.lock(), 1);
    }
}
