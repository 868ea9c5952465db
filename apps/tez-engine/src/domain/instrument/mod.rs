//! Instrument Context
//!
//! Configured instrument metadata, resolution of the selected underlying and
//! option strike selection.

pub mod instrument_info;
pub mod resolver;
pub mod strike;

pub use instrument_info::{EXPIRY_DATE_FORMAT, ExitParams, InstrumentInfo};
pub use resolver::InstrumentResolver;
pub use strike::{StrikeSelection, select_strike};
