//! Static metadata for a configured instrument.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::shared::{DomainError, Exchange, InstrumentClass, TradeAction};

/// Expiry date format used in configuration (`25-JAN-2024`).
pub const EXPIRY_DATE_FORMAT: &str = "%d-%b-%Y";

/// Instrument metadata, loaded once per process from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentInfo {
    /// Exchange segment of the tradable contract.
    pub exchange: Exchange,
    /// Underlying key the UI selects (e.g. `NIFTY`, `BANKNIFTY`).
    pub ul_instrument: String,
    /// Symbol root used to search for the tradable scrip.
    pub symbol: String,
    /// Option expiry in `DD-MON-YYYY` form (derivatives only).
    #[serde(default)]
    pub expiry_date: Option<String>,
    /// Distance between listed strikes (derivatives only).
    #[serde(default)]
    pub strike_diff: Option<Decimal>,
    /// Strike offset, in strike steps, applied to calls.
    #[serde(default)]
    pub ce_strike_offset: i32,
    /// Strike offset, in strike steps, applied to puts.
    #[serde(default)]
    pub pe_strike_offset: i32,
    /// Profit target in percent of LTP (equities).
    #[serde(default)]
    pub profit_per: Option<Decimal>,
    /// Stop loss in percent of LTP (equities).
    #[serde(default)]
    pub stoploss_per: Option<Decimal>,
    /// Profit target in price points (derivatives).
    #[serde(default)]
    pub profit_points: Option<Decimal>,
    /// Stop loss in price points (derivatives).
    #[serde(default)]
    pub stoploss_points: Option<Decimal>,
    /// Configured lot size. The broker's quote lot size takes precedence.
    #[serde(default)]
    pub lot_size: Option<u64>,
}

/// Profit / stop-loss distances as configured for an instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitParams {
    /// Percent of LTP.
    Percent {
        /// Profit percent.
        profit: Decimal,
        /// Stop-loss percent.
        stoploss: Decimal,
    },
    /// Absolute price points.
    Points {
        /// Profit points.
        profit: Decimal,
        /// Stop-loss points.
        stoploss: Decimal,
    },
}

impl InstrumentInfo {
    /// Instrument class, derived from the exchange segment.
    ///
    /// Every NSE cash instrument is an equity, not only the BEES ETFs; any
    /// symbol configured on NSE gets bracket or equity OCO legs.
    #[must_use]
    pub const fn class(&self) -> InstrumentClass {
        self.exchange.instrument_class()
    }

    /// Parsed option expiry.
    pub fn expiry(&self) -> Result<NaiveDate, DomainError> {
        let raw = self
            .expiry_date
            .as_deref()
            .ok_or_else(|| DomainError::invalid("expiry_date", "missing for derivative"))?;
        NaiveDate::parse_from_str(raw, EXPIRY_DATE_FORMAT).map_err(|e| {
            DomainError::invalid("expiry_date", format!("'{raw}' is not DD-MON-YYYY: {e}"))
        })
    }

    /// Strike difference, required to be positive.
    pub fn strike_step(&self) -> Result<Decimal, DomainError> {
        match self.strike_diff {
            Some(diff) if diff > Decimal::ZERO => Ok(diff),
            _ => Err(DomainError::invalid(
                "strike_diff",
                "must be positive for derivatives",
            )),
        }
    }

    /// Strike offset for the option type an action trades.
    #[must_use]
    pub const fn strike_offset(&self, action: TradeAction) -> i32 {
        match action {
            TradeAction::Buy => self.ce_strike_offset,
            TradeAction::Sell => self.pe_strike_offset,
        }
    }

    /// Profit / stop-loss distances for this instrument's class.
    pub fn exit_params(&self) -> Result<ExitParams, DomainError> {
        match self.class() {
            InstrumentClass::Equity => match (self.profit_per, self.stoploss_per) {
                (Some(profit), Some(stoploss)) => Ok(ExitParams::Percent { profit, stoploss }),
                _ => Err(DomainError::invalid(
                    "profit_per/stoploss_per",
                    format!("required for equity instrument {}", self.symbol),
                )),
            },
            InstrumentClass::Derivative => match (self.profit_points, self.stoploss_points) {
                (Some(profit), Some(stoploss)) => Ok(ExitParams::Points { profit, stoploss }),
                _ => Err(DomainError::invalid(
                    "profit_points/stoploss_points",
                    format!("required for derivative instrument {}", self.symbol),
                )),
            },
        }
    }

    /// Check that every field the instrument's class needs is present.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.symbol.trim().is_empty() {
            return Err(DomainError::invalid("symbol", "must not be empty"));
        }
        if self.class() == InstrumentClass::Derivative {
            self.expiry()?;
            self.strike_step()?;
        }
        self.exit_params()?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use rust_decimal_macros::dec;

    pub fn nifty_options() -> InstrumentInfo {
        InstrumentInfo {
            exchange: Exchange::Nfo,
            ul_instrument: "NIFTY".to_string(),
            symbol: "NIFTY".to_string(),
            expiry_date: Some("25-JAN-2024".to_string()),
            strike_diff: Some(dec!(50)),
            ce_strike_offset: 0,
            pe_strike_offset: 0,
            profit_per: None,
            stoploss_per: None,
            profit_points: Some(dec!(10)),
            stoploss_points: Some(dec!(5)),
            lot_size: Some(50),
        }
    }

    pub fn niftybees() -> InstrumentInfo {
        InstrumentInfo {
            exchange: Exchange::Nse,
            ul_instrument: "NIFTY".to_string(),
            symbol: "NIFTYBEES".to_string(),
            expiry_date: None,
            strike_diff: None,
            ce_strike_offset: 0,
            pe_strike_offset: 0,
            profit_per: Some(dec!(1)),
            stoploss_per: Some(dec!(0.5)),
            profit_points: None,
            stoploss_points: None,
            lot_size: Some(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{nifty_options, niftybees};
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn derivative_expiry_parses() {
        let info = nifty_options();
        assert_eq!(
            info.expiry().unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 25).unwrap()
        );
    }

    #[test]
    fn bad_expiry_is_rejected() {
        let info = InstrumentInfo {
            expiry_date: Some("2024-01-25".to_string()),
            ..nifty_options()
        };
        assert!(info.expiry().is_err());
        assert!(info.validate().is_err());
    }

    #[test]
    fn exit_params_follow_class() {
        assert_eq!(
            nifty_options().exit_params().unwrap(),
            ExitParams::Points {
                profit: dec!(10),
                stoploss: dec!(5)
            }
        );
        assert_eq!(
            niftybees().exit_params().unwrap(),
            ExitParams::Percent {
                profit: dec!(1),
                stoploss: dec!(0.5)
            }
        );
    }

    #[test]
    fn equity_without_percentages_fails_validation() {
        let info = InstrumentInfo {
            profit_per: None,
            ..niftybees()
        };
        assert!(info.validate().is_err());
    }

    #[test]
    fn strike_offset_by_action() {
        let info = InstrumentInfo {
            ce_strike_offset: 1,
            pe_strike_offset: -2,
            ..nifty_options()
        };
        assert_eq!(info.strike_offset(TradeAction::Buy), 1);
        assert_eq!(info.strike_offset(TradeAction::Sell), -2);
    }

    #[test]
    fn any_nse_symbol_is_equity() {
        let reliance = InstrumentInfo {
            ul_instrument: "RELIANCE".to_string(),
            symbol: "RELIANCE".to_string(),
            ..niftybees()
        };
        assert_eq!(reliance.class(), InstrumentClass::Equity);
        assert!(reliance.validate().is_ok());
        assert!(matches!(
            reliance.exit_params().unwrap(),
            ExitParams::Percent { .. }
        ));
        assert_eq!(nifty_options().class(), InstrumentClass::Derivative);
    }
}
