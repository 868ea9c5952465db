//! A resolved, tradable scrip.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Exchange, ScripToken};

/// Trading symbol and token returned by scrip search.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scrip {
    /// Exchange segment.
    pub exchange: Exchange,
    /// Exchange token.
    pub token: ScripToken,
    /// Broker trading symbol (e.g. `NIFTY25JAN24C21500`).
    pub trading_symbol: String,
}

impl Scrip {
    /// Create a scrip.
    #[must_use]
    pub fn new(exchange: Exchange, token: ScripToken, trading_symbol: impl Into<String>) -> Self {
        Self {
            exchange,
            token,
            trading_symbol: trading_symbol.into(),
        }
    }

    /// Key the ledger stores positions under: `<tradingSymbol>_<token>`.
    #[must_use]
    pub fn ledger_key(&self) -> String {
        format!("{}_{}", self.trading_symbol, self.token)
    }
}

impl fmt::Display for Scrip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.exchange, self.trading_symbol)
    }
}
