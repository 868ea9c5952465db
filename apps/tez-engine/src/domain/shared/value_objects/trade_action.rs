//! Trade action (buy or sell) as pressed by the user.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::shared::DomainError;

/// Direction of a market action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeAction {
    /// Buy (for derivatives: buy a call).
    Buy,
    /// Sell (for derivatives: buy a put).
    Sell,
}

impl TradeAction {
    /// Returns the opposite side.
    #[must_use]
    pub const fn opposite(&self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }

    /// Option type letter used in derivative search text.
    #[must_use]
    pub const fn option_letter(&self) -> char {
        match self {
            Self::Buy => 'C',
            Self::Sell => 'P',
        }
    }
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

impl FromStr for TradeAction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "BUY" | "B" => Ok(Self::Buy),
            "SELL" | "S" => Ok(Self::Sell),
            other => Err(DomainError::invalid(
                "action",
                format!("unknown trade action '{other}'"),
            )),
        }
    }
}
