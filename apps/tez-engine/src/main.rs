//! TeZ Engine Binary
//!
//! Starts a paper trading session: loads the configuration, wires the paper
//! adapters, arms the daily auto square-off and waits for shutdown.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin tez-engine
//! ```
//!
//! # Environment Variables
//!
//! - `TEZ_CONFIG`: Path to the YAML config (default: config.yaml)
//! - `RUST_LOG`: Log filter (default: `observability.logging.level`)

use std::sync::Arc;

use anyhow::Context;
use tez_engine::application::services::TradingDesk;
use tez_engine::application::use_cases::{MarketActionUseCase, SquareOffUseCase};
use tez_engine::config::{Config, LoggingConfig, config_path, load_config};
use tez_engine::infrastructure::broker::PaperBrokerGateway;
use tez_engine::infrastructure::market_data::SettableTickFeed;
use tez_engine::infrastructure::persistence::JsonlLedger;
use tokio::signal;

type PaperDesk = TradingDesk<PaperBrokerGateway, SettableTickFeed, JsonlLedger>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    let path = config_path();
    let config = load_config(Some(&path)).with_context(|| format!("loading {path}"))?;
    init_tracing(&config.observability.logging);

    tracing::info!(config = %path, "Starting TeZ engine");
    log_config(&config);

    let desk = create_desk(&config)?;

    match desk.latest_tick().await {
        Ok(tick) => tracing::info!(underlying = %desk.underlying(), %tick, "Latest tick"),
        Err(e) => tracing::warn!(error = %e, "No tick available yet"),
    }

    shutdown_signal().await;
    desk.shutdown();

    tracing::info!("TeZ engine stopped");
    Ok(())
}

/// Load .env file from current directory or any ancestor directory.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

/// Initialize tracing with `RUST_LOG`, falling back to the configured level.
fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(&logging.level))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if logging.is_json() {
        builder.json().init();
    } else {
        builder.pretty().init();
    }
}

fn log_config(config: &Config) {
    tracing::info!(
        exchange = %config.trading.exchange,
        quantity_lots = config.trading.quantity,
        n_legs = config.trading.n_legs,
        use_gtt_oco = config.trading.use_gtt_oco,
        default_underlying = %config.trading.default_underlying,
        instruments = config.instruments.len(),
        sq_off_timing = %config.system.sq_off_timing,
        trades_record_file = %config.system.trades_record_file,
        "Configuration loaded"
    );
}

fn create_desk(config: &Config) -> anyhow::Result<PaperDesk> {
    let paper = &config.paper;
    let gateway = Arc::new(PaperBrokerGateway::new(
        paper.quote(),
        paper.freeze_qty,
        paper.margin,
    ));

    let market_data = Arc::new(SettableTickFeed::new(
        config.trading.default_underlying.clone(),
    ));
    market_data.push_tick(paper.underlying_tick);

    let ledger = Arc::new(
        JsonlLedger::open(&config.system.trades_record_file).with_context(|| {
            format!("opening trade ledger {}", config.system.trades_record_file)
        })?,
    );
    tracing::info!(
        path = %ledger.path().display(),
        records = ledger.len(),
        "Trade ledger opened"
    );

    let settings = config.trading.market_action_settings();
    let market_action = MarketActionUseCase::new(
        Arc::clone(&gateway),
        Arc::clone(&market_data),
        Arc::clone(&ledger),
        config.resolver(),
        settings,
    );
    let square_off = SquareOffUseCase::new(gateway, ledger, config.resolver(), settings.exchange);

    Ok(TradingDesk::start(
        config.trading.default_underlying.clone(),
        market_data,
        market_action,
        square_off,
        config.system.sq_off_time()?,
    ))
}

/// Wait for shutdown signal (SIGTERM or SIGINT).
///
/// # Panics
///
/// Panics if signal handlers cannot be installed.
#[allow(clippy::expect_used)]
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("signal handler installation is critical for graceful shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installation is critical for graceful shutdown")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }
}
