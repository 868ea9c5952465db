//! Infrastructure Layer
//!
//! Adapters implementing the ports defined in the application layer:
//!
//! - `broker/`: Paper broker gateway
//! - `market_data/`: Settable tick feed
//! - `persistence/`: In-memory and JSON-lines trade ledgers

pub mod broker;
pub mod market_data;
pub mod persistence;
