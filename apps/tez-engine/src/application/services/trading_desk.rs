//! Trading Desk
//!
//! Facade the UI talks to. Owns the selected underlying, the market-action
//! and square-off use cases and the auto square-off scheduler.

use std::sync::Arc;

use chrono::{Local, NaiveTime};
use parking_lot::RwLock;
use rust_decimal::Decimal;

use super::auto_square_off::{AutoSquareOffScheduler, SchedulerState};
use crate::application::ports::{BrokerGatewayPort, LedgerPort, MarketDataError, MarketDataPort};
use crate::application::use_cases::{
    MarketActionError, MarketActionOutcome, MarketActionUseCase, SquareOffError, SquareOffMode,
    SquareOffReport, SquareOffUseCase,
};
use crate::domain::shared::TradeAction;

/// Application facade.
pub struct TradingDesk<B, M, L>
where
    B: BrokerGatewayPort + 'static,
    M: MarketDataPort,
    L: LedgerPort + 'static,
{
    underlying: RwLock<String>,
    market_data: Arc<M>,
    market_action: MarketActionUseCase<B, M, L>,
    square_off: Arc<SquareOffUseCase<B, L>>,
    scheduler: AutoSquareOffScheduler,
}

impl<B, M, L> TradingDesk<B, M, L>
where
    B: BrokerGatewayPort + 'static,
    M: MarketDataPort,
    L: LedgerPort + 'static,
{
    /// Create the desk and arm auto square-off for today at `sq_off_time`.
    ///
    /// Must be called inside a Tokio runtime.
    pub fn start(
        default_underlying: impl Into<String>,
        market_data: Arc<M>,
        market_action: MarketActionUseCase<B, M, L>,
        square_off: SquareOffUseCase<B, L>,
        sq_off_time: NaiveTime,
    ) -> Self {
        let square_off = Arc::new(square_off);
        let scheduler = AutoSquareOffScheduler::arm_at(
            sq_off_time,
            Local::now().naive_local(),
            Arc::clone(&square_off),
        );
        Self::with_scheduler(
            default_underlying,
            market_data,
            market_action,
            square_off,
            scheduler,
        )
    }

    /// Create the desk around an existing scheduler.
    pub fn with_scheduler(
        default_underlying: impl Into<String>,
        market_data: Arc<M>,
        market_action: MarketActionUseCase<B, M, L>,
        square_off: Arc<SquareOffUseCase<B, L>>,
        scheduler: AutoSquareOffScheduler,
    ) -> Self {
        let underlying = default_underlying.into();
        market_data.select_underlying(&underlying);
        Self {
            underlying: RwLock::new(underlying),
            market_data,
            market_action,
            square_off,
            scheduler,
        }
    }

    /// Selected underlying.
    #[must_use]
    pub fn underlying(&self) -> String {
        self.underlying.read().clone()
    }

    /// Select another underlying. The market data feed follows it.
    pub fn set_underlying(&self, underlying: impl Into<String>) {
        let underlying = underlying.into();
        tracing::info!(%underlying, "Underlying selected");
        let mut current = self.underlying.write();
        self.market_data.select_underlying(&underlying);
        *current = underlying;
    }

    /// Buy or sell the selected underlying.
    pub async fn market_action(
        &self,
        action: TradeAction,
    ) -> Result<MarketActionOutcome, MarketActionError> {
        let underlying = self.underlying();
        self.market_action.execute(action, &underlying).await
    }

    /// Square off all positions, or only the selected underlying's.
    pub async fn square_off(&self, mode: SquareOffMode) -> Result<SquareOffReport, SquareOffError> {
        let underlying = self.underlying();
        self.square_off.execute(mode, &underlying).await
    }

    /// Latest tick of the selected underlying.
    pub async fn latest_tick(&self) -> Result<Decimal, MarketDataError> {
        self.market_data.get_latest_tick().await
    }

    /// Auto square-off state.
    #[must_use]
    pub fn scheduler_state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    /// Stop background work. Safe to call more than once.
    pub fn shutdown(&self) {
        self.scheduler.cancel();
        tracing::info!("Trading desk shut down");
    }
}
