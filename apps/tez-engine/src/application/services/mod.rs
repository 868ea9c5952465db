//! Application Services
//!
//! Application services coordinate use cases and long-running work. The auto
//! square-off scheduler runs as a background task; the trading desk is the
//! facade the UI drives.

mod auto_square_off;
mod trading_desk;

pub use auto_square_off::{AutoSquareOffScheduler, SchedulerState, SquareOffAction};
pub use trading_desk::TradingDesk;
