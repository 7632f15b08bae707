//! lotto agency client.
//!
//! - Config: `LOTTO_CONFIG` (default `config.yaml`) + `CLI_*` overrides
//! - Bets: CSV at `source.path`
//! - Ctrl-C / SIGTERM cancel the run between exchanges

use std::process::ExitCode;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, EnvFilter};

use lotto_client::{
    config,
    pacing::TokioPacer,
    source::CsvSource,
    transport::TcpConnector,
    Client, ClientSettings,
};

#[tokio::main]
async fn main() -> ExitCode {
    let path = std::env::var("LOTTO_CONFIG").unwrap_or_else(|_| "config.yaml".into());
    let cfg = match config::load_from_file(&path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("config load failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.log.level));
    fmt().with_env_filter(filter).init();

    tracing::info!(
        action = "config",
        result = "success",
        agency = %cfg.agency,
        server = %cfg.server.address,
        batch_max = cfg.batch.max_amount,
        mode = ?cfg.batch.mode,
        loop_period_ms = cfg.cadence.period_ms,
        log_level = %cfg.log.level
    );

    let mut source = match CsvSource::open(&cfg.source.path).await {
        Ok(source) => source,
        Err(_) => return ExitCode::FAILURE,
    };

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_signal(cancel.clone()));

    let client = Client::new(
        ClientSettings::from(&cfg),
        Arc::new(TcpConnector::new(cfg.server.address.clone())),
        Arc::new(TokioPacer),
        cancel,
    );

    let report = client.run(&mut source).await;
    if report.is_failure() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

async fn cancel_on_signal(cancel: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!(action = "receive_signal", result = "success", "cancelling after the current exchange");
    cancel.cancel();
}
