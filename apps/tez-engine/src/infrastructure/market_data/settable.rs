//! Tick feed whose latest price is pushed in by the data-feed session.

use async_trait::async_trait;
use parking_lot::RwLock;
use rust_decimal::Decimal;

use crate::application::ports::{MarketDataError, MarketDataPort};

/// Latest-tick holder for the selected underlying.
#[derive(Debug)]
pub struct SettableTickFeed {
    underlying: RwLock<String>,
    latest: RwLock<Option<Decimal>>,
}

impl SettableTickFeed {
    /// Create a feed with no tick yet.
    #[must_use]
    pub fn new(underlying: impl Into<String>) -> Self {
        Self {
            underlying: RwLock::new(underlying.into()),
            latest: RwLock::new(None),
        }
    }

    /// Record a new tick.
    pub fn push_tick(&self, price: Decimal) {
        *self.latest.write() = Some(price);
    }

    /// Switch underlying. Clears the last tick unless the underlying is unchanged.
    pub fn switch_underlying(&self, underlying: impl Into<String>) {
        let underlying = underlying.into();
        let mut current = self.underlying.write();
        if *current != underlying {
            *current = underlying;
            *self.latest.write() = None;
        }
    }

    /// Underlying the feed is following.
    #[must_use]
    pub fn underlying(&self) -> String {
        self.underlying.read().clone()
    }
}

#[async_trait]
impl MarketDataPort for SettableTickFeed {
    fn select_underlying(&self, underlying: &str) {
        self.switch_underlying(underlying);
    }

    async fn get_latest_tick(&self) -> Result<Decimal, MarketDataError> {
        let latest = *self.latest.read();
        latest.ok_or_else(|| MarketDataError::NoTick {
            underlying: self.underlying.read().clone(),
        })
    }
}
