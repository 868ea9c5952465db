//! Exchange segment and the instrument class it implies.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Exchange segment an instrument trades on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Exchange {
    /// NSE cash segment (equities and ETFs).
    Nse,
    /// NSE futures and options segment.
    Nfo,
}

/// Broad instrument class, which decides the order variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstrumentClass {
    /// Cash equity / ETF.
    Equity,
    /// Exchange-traded option.
    Derivative,
}

impl Exchange {
    /// Instrument class traded on this segment.
    #[must_use]
    pub const fn instrument_class(&self) -> InstrumentClass {
        match self {
            Self::Nse => InstrumentClass::Equity,
            Self::Nfo => InstrumentClass::Derivative,
        }
    }

    /// Segment code as used by the broker.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Nse => "NSE",
            Self::Nfo => "NFO",
        }
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
