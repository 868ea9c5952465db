//! Broker Gateway Port (Driven Port)
//!
//! Everything the execution core needs from the broker session: scrip
//! lookup, quotes, security info, margin, order placement and square-off.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::TradeRecord;
use crate::domain::order_building::OrderLeg;
use crate::domain::shared::{AlertId, BrokerOrderId, Exchange, Scrip, ScripToken};

/// Quote returned by `fetch_ltp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LtpQuote {
    /// Last traded price.
    pub price: Decimal,
    /// Minimum price increment.
    pub tick_size: Decimal,
    /// Contract lot size.
    pub lot_size: u64,
}

/// Security info relevant to order sizing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityInfo {
    /// Exchange freeze quantity, when the exchange publishes one.
    pub freeze_qty: Option<u64>,
}

/// Terminal status the gateway reports per leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LegStatus {
    /// Leg placed and confirmed.
    Success,
    /// Leg failed and will not be retried.
    HardFailure,
}

impl LegStatus {
    /// Name recorded in the ledger.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::HardFailure => "HARD_FAILURE",
        }
    }
}

impl fmt::Display for LegStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-leg result of a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegResult {
    /// Broker order id.
    pub order_id: BrokerOrderId,
    /// Fill (or rejection) time.
    pub fill_timestamp: DateTime<Utc>,
    /// Filled quantity.
    pub filled_qty: u64,
}

/// Identifiers the broker assigned to a submitted leg.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegPlacement {
    /// Index of the leg in the submitted slice.
    pub leg_index: usize,
    /// Order id of the primary leg, if placed.
    pub order_id: Option<BrokerOrderId>,
    /// Linked contingent (OCO alert) id, if placed.
    pub linked_oco_id: Option<AlertId>,
}

/// Gateway response for one `place_and_confirm_orders` call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionBatch {
    /// An exception interrupted placement; `results` may be partial.
    pub exception_occurred: bool,
    /// Every leg reached `Success`.
    pub all_ok: bool,
    /// Status and result per leg the broker responded to.
    pub results: Vec<(LegStatus, LegResult)>,
    /// Identifiers assigned to the submitted legs.
    pub placements: Vec<LegPlacement>,
}

impl SubmissionBatch {
    /// Contingent-order id linked to the leg that produced `order_id`.
    #[must_use]
    pub fn linked_oco_for(&self, order_id: &BrokerOrderId) -> Option<&AlertId> {
        self.placements
            .iter()
            .find(|p| p.order_id.as_ref() == Some(order_id))
            .and_then(|p| p.linked_oco_id.as_ref())
    }
}

/// Broker gateway error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GatewayError {
    /// Session or transport failure.
    #[error("Broker connection error: {message}")]
    ConnectionError {
        /// Error details.
        message: String,
    },

    /// Scrip search found nothing.
    #[error("No scrip matching '{search_text}' on {exchange}")]
    ScripNotFound {
        /// Exchange searched.
        exchange: Exchange,
        /// Search text used.
        search_text: String,
    },

    /// Broker refused the request.
    #[error("Request rejected: {reason}")]
    Rejected {
        /// Rejection reason.
        reason: String,
    },

    /// Unknown error.
    #[error("Broker error: {message}")]
    Unknown {
        /// Error details.
        message: String,
    },
}

/// Port for broker interactions.
#[async_trait]
pub trait BrokerGatewayPort: Send + Sync {
    /// Resolve search text to a tradable scrip.
    async fn search_scrip(&self, exchange: Exchange, text: &str) -> Result<Scrip, GatewayError>;

    /// Price, tick size and lot size of a scrip.
    async fn fetch_ltp(
        &self,
        exchange: Exchange,
        token: &ScripToken,
    ) -> Result<LtpQuote, GatewayError>;

    /// Security info (freeze quantity) of a scrip.
    async fn get_security_info(
        &self,
        exchange: Exchange,
        trading_symbol: &str,
        token: &ScripToken,
    ) -> Result<SecurityInfo, GatewayError>;

    /// Cash margin available for new orders.
    async fn available_margin(&self) -> Result<Decimal, GatewayError>;

    /// Place all legs and wait for their terminal status.
    async fn place_and_confirm_orders(
        &self,
        legs: &[OrderLeg],
        use_oco: bool,
    ) -> Result<SubmissionBatch, GatewayError>;

    /// Unwind the given recorded positions, optionally only those of `symbol`.
    async fn square_off_position(
        &self,
        open_orders: &[TradeRecord],
        symbol: Option<&str>,
    ) -> Result<(), GatewayError>;
}
