// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::match_same_arms,
        clippy::needless_pass_by_value,
        clippy::needless_collect,
        clippy::option_if_let_else,
        clippy::default_trait_access,
        clippy::items_after_statements,
        clippy::or_fun_call
    )
)]

//! TeZ Engine - Rust Core Library
//!
//! Order sizing, order construction and submission reconciliation for the
//! TeZ intraday trading assistant.
//!
//! # Architecture
//!
//! ## Layers (inside → outside)
//!
//! - **Domain**: pure business rules
//!   - `instrument`: configured instruments, resolution, strike selection
//!   - `sizing`: margin throttle and freeze-quantity leg allocation
//!   - `order_building`: bracket and primary+OCO legs, leg remarks
//!
//! - **Application**: orchestration
//!   - `ports`: `BrokerGatewayPort`, `MarketDataPort`, `LedgerPort`
//!   - `use_cases`: market action, square-off
//!   - `services`: auto square-off scheduler, trading desk facade
//!
//! - **Infrastructure**: adapters
//!   - `broker`: paper broker gateway
//!   - `market_data`: settable tick feed
//!   - `persistence`: in-memory and JSON-lines ledgers
//!
//! - **Config**: YAML configuration with env interpolation

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Clean Architecture Layers
// =============================================================================

/// Domain layer - Core business logic with no external dependencies.
pub mod domain;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

/// Configuration loading and validation.
pub mod config;

// =============================================================================
// Re-exports
// =============================================================================

// Domain re-exports
pub use domain::instrument::{InstrumentInfo, InstrumentResolver, StrikeSelection, select_strike};
pub use domain::order_building::{BracketOrder, OcoOrder, OrderBuilder, OrderIntent, OrderLeg};
pub use domain::shared::{DomainError, Exchange, InstrumentClass, Scrip, TradeAction};
pub use domain::sizing::{AllocationInput, LegPlan, MarginThrottle, QuantityAllocator};

// Application re-exports
pub use application::ports::{BrokerGatewayPort, LedgerPort, MarketDataPort, TradeRecord};
pub use application::services::{AutoSquareOffScheduler, SchedulerState, TradingDesk};
pub use application::use_cases::{
    MarketActionOutcome, MarketActionUseCase, SquareOffMode, SquareOffUseCase,
};

// Infrastructure re-exports
pub use infrastructure::broker::PaperBrokerGateway;
pub use infrastructure::market_data::SettableTickFeed;
pub use infrastructure::persistence::{InMemoryLedger, JsonlLedger};

// Config re-exports
pub use config::{Config, ConfigError, config_path, load_config, load_config_from_string};
