//! JSON-lines trade ledger.
//!
//! One `TradeRecord` per line, appended and flushed on every save. Existing
//! records are replayed when the file is opened.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::in_memory::log_records;
use crate::application::ports::{LedgerError, LedgerPort, TradeRecord};

/// File-backed, append-only ledger.
#[derive(Debug)]
pub struct JsonlLedger {
    path: PathBuf,
    inner: Mutex<Inner>,
}

#[derive(Debug)]
struct Inner {
    file: File,
    records: Vec<TradeRecord>,
}

impl JsonlLedger {
    /// Open (or create) the ledger at `path`, replaying existing records.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LedgerError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let records = if path.exists() {
            Self::replay(&path)?
        } else {
            Vec::new()
        };
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        tracing::info!(path = %path.display(), records = records.len(), "Trade ledger opened");

        Ok(Self {
            path,
            inner: Mutex::new(Inner { file, records }),
        })
    }

    fn replay(path: &Path) -> Result<Vec<TradeRecord>, LedgerError> {
        let reader = BufReader::new(File::open(path)?);
        let mut records = Vec::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record = serde_json::from_str(&line).map_err(|e| LedgerError::Corrupt {
                line: i + 1,
                message: e.to_string(),
            })?;
            records.push(record);
        }
        Ok(records)
    }

    /// Ledger file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().records.len()
    }

    /// Whether the ledger holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().records.is_empty()
    }
}

#[async_trait]
impl LedgerPort for JsonlLedger {
    async fn save_order(&self, record: TradeRecord) -> Result<(), LedgerError> {
        let mut line = serde_json::to_string(&record)?;
        line.push('\n');

        let mut inner = self.inner.lock();
        inner.file.write_all(line.as_bytes())?;
        inner.file.flush()?;
        inner.records.push(record);
        Ok(())
    }

    async fn fetch_open_orders(&self) -> Result<Vec<TradeRecord>, LedgerError> {
        Ok(self
            .inner
            .lock()
            .records
            .iter()
            .filter(|r| r.is_open())
            .cloned()
            .collect())
    }

    async fn show(&self) -> Result<(), LedgerError> {
        log_records(&self.inner.lock().records);
        Ok(())
    }
}
