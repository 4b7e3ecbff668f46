use crate::config::RunParams;
use crate::error::AppError;
use crate::metrics::RunMetrics;
use crate::pipeline::details::fetch_transaction_details;
use crate::pipeline::extractor::extract_transfers;
use crate::pipeline::signatures::fetch_signature_history;
use crate::rpc::pacing::Pacer;
use crate::rpc::LedgerProvider;
use crate::sink::TransferSink;
use crate::solana::models::{WalletAddress, WalletSet};
use tracing::{error, info};

/// Marker line written when a whole run finds nothing.
pub const NO_MATCHES_LINE: &str = "No relevant transactions found.";

/// What a run did, for the final log line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub wallets_processed: usize,
    pub wallets_failed: usize,
    pub records_emitted: usize,
}

/// Process every wallet in input order and stream matched transfers to `sink`.
///
/// Matching uses the set of *all* input wallets, so a transfer found in one
/// wallet's history may point at any other tracked wallet. A wallet whose
/// history cannot be fetched is logged and skipped. Only sink failures abort
/// the run.
///
/// One pacer spans the whole run, so the pause booked by a request also holds
/// across the switch from pages to details and from one wallet to the next.
pub async fn run_pipeline<P, S>(
    provider: &P,
    wallets: &[WalletAddress],
    params: &RunParams,
    sink: &mut S,
    metrics: &RunMetrics,
) -> Result<RunSummary, AppError>
where
    P: LedgerProvider + ?Sized,
    S: TransferSink + ?Sized,
{
    let wallet_set: WalletSet = wallets.iter().collect();
    let mut summary = RunSummary::default();
    let mut pacer = Pacer::new();

    info!(
        wallets = wallets.len(),
        unique_wallets = wallet_set.len(),
        depth = params.depth,
        delay_ms = params.page_delay.as_millis() as u64,
        "Starting transfer scan"
    );

    for wallet in wallets {
        summary.wallets_processed += 1;

        info!(
            wallet = %wallet,
            depth = params.depth,
            "Fetching transactions for wallet"
        );

        let signatures = match fetch_signature_history(
            provider,
            wallet,
            params.depth,
            params.page_delay,
            &mut pacer,
            metrics,
        )
        .await
        {
            Ok(signatures) => signatures,
            Err(e) => {
                summary.wallets_failed += 1;
                metrics.wallets_failed.inc();
                error!(
                    wallet = %wallet,
                    error = %e,
                    "Error fetching signatures, skipping wallet"
                );
                continue;
            }
        };

        if signatures.is_empty() {
            info!(wallet = %wallet, "No transaction history found for wallet");
            continue;
        }

        let transactions = fetch_transaction_details(
            provider,
            &signatures,
            params.detail_delay(),
            &mut pacer,
            metrics,
        )
        .await;

        for record in extract_transfers(&transactions, &wallet_set) {
            info!(
                source = %record.source,
                destination = %record.destination,
                amount = %record.amount(),
                native = record.asset_kind.flag(),
                tx = %record.tx_id,
                "Internal transfer found"
            );
            sink.write_line(&record.to_string())?;
            summary.records_emitted += 1;
            metrics.transfers_matched.inc();
        }
    }

    if summary.records_emitted == 0 {
        info!("No relevant transactions found");
        sink.write_line(NO_MATCHES_LINE)?;
    }

    Ok(summary)
}
