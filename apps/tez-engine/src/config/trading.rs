//! Trading configuration.

use serde::{Deserialize, Serialize};

use crate::application::use_cases::MarketActionSettings;
use crate::domain::shared::Exchange;

/// Trading configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingConfig {
    /// Exchange segment traded.
    #[serde(default = "default_exchange")]
    pub exchange: Exchange,
    /// Quantity per market action, in lots.
    #[serde(default = "default_quantity")]
    pub quantity: u64,
    /// Leg-count hint for the allocator.
    #[serde(default = "default_n_legs")]
    pub n_legs: u32,
    /// Use GTT/OCO exits instead of bracket orders.
    #[serde(default)]
    pub use_gtt_oco: bool,
    /// Underlying selected at startup.
    #[serde(default = "default_underlying")]
    pub default_underlying: String,
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            exchange: default_exchange(),
            quantity: default_quantity(),
            n_legs: default_n_legs(),
            use_gtt_oco: false,
            default_underlying: default_underlying(),
        }
    }
}

impl TradingConfig {
    /// Settings for the market-action use case.
    #[must_use]
    pub const fn market_action_settings(&self) -> MarketActionSettings {
        MarketActionSettings {
            exchange: self.exchange,
            quantity_lots: self.quantity,
            given_nlegs: self.n_legs,
            use_oco: self.use_gtt_oco,
        }
    }
}

const fn default_exchange() -> Exchange {
    Exchange::Nfo
}

const fn default_quantity() -> u64 {
    1
}

const fn default_n_legs() -> u32 {
    1
}

fn default_underlying() -> String {
    "NIFTY".to_string()
}
