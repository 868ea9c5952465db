//! Maps (exchange, underlying) to the configured instrument.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::instrument::InstrumentInfo;
use crate::domain::shared::{DomainError, Exchange};

/// Lookup over the configured instrument table.
///
/// Entries are scanned in key order and the first match wins.
#[derive(Debug, Clone)]
pub struct InstrumentResolver {
    instruments: Arc<BTreeMap<String, InstrumentInfo>>,
}

impl InstrumentResolver {
    /// Create a resolver over the configured instruments.
    #[must_use]
    pub fn new(instruments: BTreeMap<String, InstrumentInfo>) -> Self {
        Self {
            instruments: Arc::new(instruments),
        }
    }

    /// Resolve the instrument for an exchange and underlying.
    ///
    /// A miss is a configuration error; callers treat it as fatal.
    pub fn resolve(
        &self,
        exchange: Exchange,
        ul_instrument: &str,
    ) -> Result<&InstrumentInfo, DomainError> {
        self.instruments
            .iter()
            .find(|(id, info)| {
                tracing::trace!(instrument = %id, "checking instrument");
                info.exchange == exchange && info.ul_instrument == ul_instrument
            })
            .map(|(_, info)| info)
            .ok_or_else(|| DomainError::NotFound {
                entity_type: "Instrument".to_string(),
                id: format!("{exchange}:{ul_instrument}"),
            })
    }

    /// All configured underlyings for an exchange, in key order.
    #[must_use]
    pub fn underlyings(&self, exchange: Exchange) -> Vec<&str> {
        self.instruments
            .values()
            .filter(|info| info.exchange == exchange)
            .map(|info| info.ul_instrument.as_str())
            .collect()
    }

    /// Number of configured instruments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    /// Whether no instruments are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }
}
