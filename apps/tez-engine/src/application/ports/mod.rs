//! Application Ports (Driven)
//!
//! Interfaces to the broker session, the data feed and the trade ledger.

mod broker_gateway_port;
mod ledger_port;
mod market_data_port;

pub use broker_gateway_port::{
    BrokerGatewayPort, GatewayError, LegPlacement, LegResult, LegStatus, LtpQuote, SecurityInfo,
    SubmissionBatch,
};
pub use ledger_port::{LedgerError, LedgerPort, TradeRecord};
pub use market_data_port::{MarketDataError, MarketDataPort};
