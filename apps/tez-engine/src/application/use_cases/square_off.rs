//! Square Off Use Case

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::application::ports::{BrokerGatewayPort, GatewayError, LedgerError, LedgerPort};
use crate::domain::instrument::InstrumentResolver;
use crate::domain::shared::{DomainError, Exchange};

/// Which recorded positions a square-off closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SquareOffMode {
    /// Every open recorded position.
    All,
    /// Only positions of the selected underlying's symbol root.
    Select,
}

impl fmt::Display for SquareOffMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "ALL"),
            Self::Select => write!(f, "SELECT"),
        }
    }
}

/// Square-off error.
#[derive(Debug, thiserror::Error)]
pub enum SquareOffError {
    /// The selected underlying is not configured for the exchange.
    #[error("Instrument not configured: {0}")]
    Instrument(#[from] DomainError),

    /// Open orders could not be read.
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// The gateway failed to unwind.
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),
}

/// Summary of a square-off request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SquareOffReport {
    /// Mode requested.
    pub mode: SquareOffMode,
    /// Symbol root filter, in `Select` mode.
    pub symbol: Option<String>,
    /// Open records handed to the gateway.
    pub open_orders: usize,
}

/// Use case for manual and scheduled square-off.
pub struct SquareOffUseCase<B, L>
where
    B: BrokerGatewayPort,
    L: LedgerPort,
{
    gateway: Arc<B>,
    ledger: Arc<L>,
    resolver: InstrumentResolver,
    exchange: Exchange,
}

impl<B, L> SquareOffUseCase<B, L>
where
    B: BrokerGatewayPort,
    L: LedgerPort,
{
    /// Create a new SquareOffUseCase.
    pub const fn new(
        gateway: Arc<B>,
        ledger: Arc<L>,
        resolver: InstrumentResolver,
        exchange: Exchange,
    ) -> Self {
        Self {
            gateway,
            ledger,
            resolver,
            exchange,
        }
    }

    /// Execute the use case. `underlying` is only consulted in `Select` mode.
    pub async fn execute(
        &self,
        mode: SquareOffMode,
        underlying: &str,
    ) -> Result<SquareOffReport, SquareOffError> {
        let open_orders = self.ledger.fetch_open_orders().await?;

        let symbol = match mode {
            SquareOffMode::All => None,
            SquareOffMode::Select => {
                let info = self.resolver.resolve(self.exchange, underlying)?;
                tracing::info!(sq_off_symbol = %info.symbol, "Square-off symbol");
                Some(info.symbol.clone())
            }
        };

        self.gateway
            .square_off_position(&open_orders, symbol.as_deref())
            .await?;

        tracing::info!(
            %mode,
            open_orders = open_orders.len(),
            symbol = symbol.as_deref().unwrap_or("*"),
            "Square off position complete"
        );

        Ok(SquareOffReport {
            mode,
            symbol,
            open_orders: open_orders.len(),
        })
    }
}
