//! Market Data Port (Driven Port)
//!
//! Latest tick of the selected underlying, fed by the data-feed session.

use async_trait::async_trait;
use rust_decimal::Decimal;

/// Market data port error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum MarketDataError {
    /// No tick received yet.
    #[error("No tick available for {underlying}")]
    NoTick {
        /// Underlying that has not ticked.
        underlying: String,
    },

    /// Feed disconnected.
    #[error("Market data feed disconnected: {message}")]
    Disconnected {
        /// Error details.
        message: String,
    },
}

/// Port for the underlying's live price.
#[async_trait]
pub trait MarketDataPort: Send + Sync {
    /// Follow a newly selected underlying. Ticks of the previous one must
    /// no longer be served.
    fn select_underlying(&self, underlying: &str);

    /// Latest traded price of the selected underlying.
    async fn get_latest_tick(&self) -> Result<Decimal, MarketDataError>;
}
