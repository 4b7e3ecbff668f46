mod config;
mod error;
mod metrics;
mod pipeline;
mod rpc;
mod sink;
mod solana;
mod telemetry;
mod wallets;

use crate::config::{AppConfig, Cli};
use crate::error::AppError;
use crate::metrics::RunMetrics;
use crate::pipeline::orchestrator::run_pipeline;
use crate::rpc::client::RpcLedgerClient;
use crate::sink::FileSink;
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Validate everything before the first request goes out
    let config = AppConfig::from_env(cli)?;

    telemetry::init_telemetry(&config.log_level);

    let wallets = wallets::load_wallets(&config.wallets_file)?;

    info!(
        rpc_url = %config.rpc_url,
        depth = config.params.depth,
        delay_ms = config.params.page_delay.as_millis() as u64,
        output = %config.output_file.display(),
        "Configuration loaded"
    );

    let metrics = Arc::new(RunMetrics::new()?);
    let provider = RpcLedgerClient::new(&config.rpc_url, config.commitment, metrics.clone());
    let mut sink = FileSink::open(&config.output_file)?;

    let summary = run_pipeline(&provider, &wallets, &config.params, &mut sink, &metrics).await?;

    info!(
        wallets_processed = summary.wallets_processed,
        wallets_failed = summary.wallets_failed,
        transfers = summary.records_emitted,
        signatures = metrics.signatures_fetched.get(),
        transactions = metrics.transactions_fetched.get(),
        skipped = metrics.transactions_skipped.get(),
        "Scan complete"
    );

    if let Some(path) = &config.metrics_file {
        // The results are already written; a metrics export failure is not fatal.
        if let Err(e) = metrics.write_textfile(path) {
            error!(path = %path.display(), error = %e, "Failed to write metrics file");
        }
    }

    Ok(())
}
