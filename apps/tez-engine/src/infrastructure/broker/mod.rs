//! Broker Adapters
//!
//! Implementations of `BrokerGatewayPort`.

pub mod paper;

pub use paper::{PaperBrokerGateway, SquareOffCall};
