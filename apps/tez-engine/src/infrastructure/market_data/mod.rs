//! Market Data Adapters
//!
//! Implementations of `MarketDataPort`.

pub mod settable;

pub use settable::SettableTickFeed;
