//! Domain Layer
//!
//! Business logic with zero infrastructure dependencies.
//!
//! # Modules
//!
//! - [`instrument`]: configured instruments, resolution and strike selection
//! - [`sizing`]: margin throttling and freeze-aware leg allocation
//! - [`order_building`]: order leg variants and the leg builder
//! - [`shared`]: value objects and errors used across modules

pub mod instrument;
pub mod order_building;
pub mod shared;
pub mod sizing;
