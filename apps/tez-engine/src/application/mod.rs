//! Application Layer
//!
//! The application layer orchestrates domain logic through use cases.
//! It defines:
//!
//! - **Ports**: Interfaces to the broker session, data feed and ledger
//! - **Use Cases**: Market action and square-off
//! - **Services**: Auto square-off scheduler and the trading desk facade

pub mod ports;
pub mod services;
pub mod use_cases;

pub use ports::*;
pub use services::*;
pub use use_cases::*;
