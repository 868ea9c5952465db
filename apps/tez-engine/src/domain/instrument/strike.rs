//! Option strike selection and scrip search text.

use rust_decimal::Decimal;

use crate::domain::instrument::InstrumentInfo;
use crate::domain::shared::{DomainError, TradeAction};

/// Strike chosen for a derivative market action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrikeSelection {
    /// Selected strike after applying the configured offset.
    pub strike: Decimal,
    /// `C` for calls, `P` for puts.
    pub option_letter: char,
    /// Text passed to scrip search, `<SYMBOL><DDMONYY><C|P><STRIKE>`.
    pub search_text: String,
}

/// Pick the strike nearest to `ltp`, shifted by the action's strike offset.
///
/// Ties between the lower and upper strike resolve to the upper one.
pub fn select_strike(
    info: &InstrumentInfo,
    action: TradeAction,
    ltp: Decimal,
) -> Result<StrikeSelection, DomainError> {
    if ltp <= Decimal::ZERO {
        return Err(DomainError::invalid("ltp", "underlying price must be positive"));
    }
    let diff = info.strike_step()?;
    let expiry = info.expiry()?;

    let lower = (ltp / diff).floor() * diff;
    let upper = (ltp / diff).ceil() * diff;
    let nearest = if (ltp - lower).abs() < (ltp - upper).abs() {
        lower
    } else {
        upper
    };
    let strike = (nearest + Decimal::from(info.strike_offset(action)) * diff).trunc();

    tracing::debug!(%lower, %upper, %strike, %action, "strike selected");

    let option_letter = action.option_letter();
    let search_text = format!(
        "{}{}{}{}",
        info.symbol,
        expiry.format("%d%b%y"),
        option_letter,
        strike.normalize()
    )
    .to_uppercase();

    Ok(StrikeSelection {
        strike,
        option_letter,
        search_text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::instrument::instrument_info::fixtures::{nifty_options, niftybees};
    use rust_decimal_macros::dec;

    #[test]
    fn picks_nearest_strike_for_calls() {
        let sel = select_strike(&nifty_options(), TradeAction::Buy, dec!(21512.3)).unwrap();
        assert_eq!(sel.strike, dec!(21500));
        assert_eq!(sel.option_letter, 'C');
        assert_eq!(sel.search_text, "NIFTY25JAN24C21500");
    }

    #[test]
    fn picks_upper_strike_when_closer() {
        let sel = select_strike(&nifty_options(), TradeAction::Sell, dec!(21538)).unwrap();
        assert_eq!(sel.strike, dec!(21550));
        assert_eq!(sel.search_text, "NIFTY25JAN24P21550");
    }

    #[test]
    fn exact_midpoint_goes_up() {
        let sel = select_strike(&nifty_options(), TradeAction::Buy, dec!(21525)).unwrap();
        assert_eq!(sel.strike, dec!(21550));
    }

    #[test]
    fn offsets_shift_by_strike_steps() {
        let info = InstrumentInfo {
            ce_strike_offset: 2,
            pe_strike_offset: -1,
            ..nifty_options()
        };
        let call = select_strike(&info, TradeAction::Buy, dec!(21500)).unwrap();
        assert_eq!(call.strike, dec!(21600));

        let put = select_strike(&info, TradeAction::Sell, dec!(21500)).unwrap();
        assert_eq!(put.strike, dec!(21450));
    }

    #[test]
    fn equity_instrument_has_no_strikes() {
        assert!(select_strike(&niftybees(), TradeAction::Buy, dec!(245)).is_err());
    }

    #[test]
    fn non_positive_ltp_rejected() {
        assert!(select_strike(&nifty_options(), TradeAction::Buy, Decimal::ZERO).is_err());
    }
}
