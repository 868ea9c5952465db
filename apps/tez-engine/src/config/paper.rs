//! Paper trading session parameters used by the binary.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::application::ports::LtpQuote;

/// Quote, freeze and margin the paper gateway simulates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperConfig {
    /// Underlying tick fed to strike selection.
    #[serde(default = "default_underlying_tick")]
    pub underlying_tick: Decimal,
    /// LTP quoted for every scrip.
    #[serde(default = "default_ltp")]
    pub ltp: Decimal,
    /// Tick size quoted for every scrip.
    #[serde(default = "default_tick_size")]
    pub tick_size: Decimal,
    /// Lot size quoted for every scrip.
    #[serde(default = "default_lot_size")]
    pub lot_size: u64,
    /// Freeze quantity reported by security info.
    #[serde(default)]
    pub freeze_qty: Option<u64>,
    /// Available margin.
    #[serde(default = "default_margin")]
    pub margin: Decimal,
}

impl Default for PaperConfig {
    fn default() -> Self {
        Self {
            underlying_tick: default_underlying_tick(),
            ltp: default_ltp(),
            tick_size: default_tick_size(),
            lot_size: default_lot_size(),
            freeze_qty: None,
            margin: default_margin(),
        }
    }
}

impl PaperConfig {
    /// Quote the paper gateway returns.
    #[must_use]
    pub const fn quote(&self) -> LtpQuote {
        LtpQuote {
            price: self.ltp,
            tick_size: self.tick_size,
            lot_size: self.lot_size,
        }
    }
}

const fn default_underlying_tick() -> Decimal {
    dec!(21500)
}

const fn default_ltp() -> Decimal {
    dec!(100)
}

const fn default_tick_size() -> Decimal {
    dec!(0.05)
}

const fn default_lot_size() -> u64 {
    50
}

const fn default_margin() -> Decimal {
    dec!(100000)
}
