//! Ledger Port (Driven Port)
//!
//! Append-only record of every reconciled leg.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::LegStatus;
use crate::domain::shared::{AlertId, BrokerOrderId};

/// One reconciled leg as persisted by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeRecord {
    /// Broker order id.
    pub order_id: BrokerOrderId,
    /// `<tradingSymbol>_<token>` key.
    pub symbol_key: String,
    /// Filled quantity.
    pub filled_qty: u64,
    /// Fill time.
    pub fill_time: DateTime<Utc>,
    /// Terminal status.
    pub status: LegStatus,
    /// Linked contingent-order id.
    pub linked_oco_id: Option<AlertId>,
}

impl TradeRecord {
    /// A record still holds a position: successful with a non-zero fill.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == LegStatus::Success && self.filled_qty > 0
    }
}

/// Ledger error.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Storage I/O failed.
    #[error("Ledger I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Record could not be encoded or decoded.
    #[error("Ledger serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Stored data is unreadable.
    #[error("Ledger corrupt at line {line}: {message}")]
    Corrupt {
        /// 1-based line number.
        line: usize,
        /// Error details.
        message: String,
    },
}

/// Port for the trade ledger.
#[async_trait]
pub trait LedgerPort: Send + Sync {
    /// Append a record.
    async fn save_order(&self, record: TradeRecord) -> Result<(), LedgerError>;

    /// Records that still hold a position, in insertion order.
    async fn fetch_open_orders(&self) -> Result<Vec<TradeRecord>, LedgerError>;

    /// Log the ledger contents for diagnostics.
    async fn show(&self) -> Result<(), LedgerError>;
}
