//! Application Use Cases
//!
//! Use cases orchestrate domain logic to fulfill application requirements.

mod market_action;
mod square_off;

pub use market_action::{
    MarketActionError, MarketActionOutcome, MarketActionReport, MarketActionSettings,
    MarketActionUseCase,
};
pub use square_off::{SquareOffError, SquareOffMode, SquareOffReport, SquareOffUseCase};
