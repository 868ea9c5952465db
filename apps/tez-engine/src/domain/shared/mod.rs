//! Shared Domain Types
//!
//! Value objects and errors shared across the domain modules.

pub mod errors;
pub mod value_objects;

pub use errors::DomainError;
pub use value_objects::{
    AlertId, BrokerOrderId, Exchange, InstrumentClass, Scrip, ScripToken, TradeAction,
    percent_of, round_to_tick,
};
