//! Order construction: leg variants, remarks tags and the leg builder.

pub mod builder;
pub mod order_leg;
pub mod remarks;

pub use builder::{OrderBuilder, OrderIntent};
pub use order_leg::{BracketOrder, OcoOrder, OrderLeg};
pub use remarks::leg_remarks;
