//! In-memory trade ledger for testing.

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::application::ports::{LedgerError, LedgerPort, TradeRecord};

/// In-memory implementation of `LedgerPort`.
///
/// Suitable for testing and development. Records are lost on exit.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    records: Mutex<Vec<TradeRecord>>,
}

impl InMemoryLedger {
    /// Create a new empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of records in the ledger.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Check if the ledger is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// All records, in insertion order.
    #[must_use]
    pub fn records(&self) -> Vec<TradeRecord> {
        self.records.lock().clone()
    }
}

#[async_trait]
impl LedgerPort for InMemoryLedger {
    async fn save_order(&self, record: TradeRecord) -> Result<(), LedgerError> {
        self.records.lock().push(record);
        Ok(())
    }

    async fn fetch_open_orders(&self) -> Result<Vec<TradeRecord>, LedgerError> {
        Ok(self
            .records
            .lock()
            .iter()
            .filter(|r| r.is_open())
            .cloned()
            .collect())
    }

    async fn show(&self) -> Result<(), LedgerError> {
        log_records(&self.records.lock());
        Ok(())
    }
}

/// Log every record at info level.
pub(crate) fn log_records(records: &[TradeRecord]) {
    tracing::info!(count = records.len(), "Trade ledger");
    for record in records {
        tracing::info!(
            order_id = %record.order_id,
            symbol = %record.symbol_key,
            qty = record.filled_qty,
            time = %record.fill_time,
            status = %record.status,
            oco = record.linked_oco_id.as_ref().map_or("-", |id| id.as_str()),
            "Ledger record"
        );
    }
}
