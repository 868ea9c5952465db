//! Shared Value Objects
//!
//! Immutable domain types used across the engine.
//! Value objects are compared by value, not identity.

mod exchange;
mod identifiers;
mod price;
mod scrip;
mod trade_action;

pub use exchange::{Exchange, InstrumentClass};
pub use identifiers::{AlertId, BrokerOrderId, ScripToken};
pub use price::{percent_of, round_to_tick};
pub use scrip::Scrip;
pub use trade_action::TradeAction;
