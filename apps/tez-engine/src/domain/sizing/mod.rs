//! Quantity sizing: margin throttling and freeze-aware leg allocation.

pub mod allocator;
pub mod error;
pub mod margin_throttle;

pub use allocator::{AllocationInput, LegPlan, QuantityAllocator, effective_freeze_qty};
pub use error::SizingError;
pub use margin_throttle::{MarginThrottle, ThrottleInput, ThrottleOutcome};
