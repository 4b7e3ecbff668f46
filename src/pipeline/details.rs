use crate::error::AppError;
use crate::metrics::RunMetrics;
use crate::rpc::pacing::Pacer;
use crate::rpc::LedgerProvider;
use crate::solana::models::{ParsedTransaction, TransactionSignature};
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

/// Why a signature produced no transaction.
#[derive(Debug)]
pub enum SkipReason {
    /// The node answered `null` for the signature.
    NotFound,
    /// The request or decoding failed.
    Failed(AppError),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NotFound => f.write_str("transaction not available"),
            SkipReason::Failed(err) => write!(f, "{}", err),
        }
    }
}

/// Result of resolving a single signature.
#[derive(Debug)]
pub enum DetailOutcome {
    Fetched(ParsedTransaction),
    Skipped(SkipReason),
}

impl From<Result<Option<ParsedTransaction>, AppError>> for DetailOutcome {
    fn from(result: Result<Option<ParsedTransaction>, AppError>) -> Self {
        match result {
            Ok(Some(tx)) => DetailOutcome::Fetched(tx),
            Ok(None) => DetailOutcome::Skipped(SkipReason::NotFound),
            Err(err) => DetailOutcome::Skipped(SkipReason::Failed(err)),
        }
    }
}

/// Resolve signatures to parsed transactions one at a time, in order.
///
/// A signature that fails or is unknown to the node is logged and skipped; it
/// never stops the batch. Every request, successful or not, books a
/// `detail_delay` pause on the shared `pacer`.
pub async fn fetch_transaction_details<P: LedgerProvider + ?Sized>(
    provider: &P,
    signatures: &[TransactionSignature],
    detail_delay: Duration,
    pacer: &mut Pacer,
    metrics: &RunMetrics,
) -> Vec<ParsedTransaction> {
    let mut transactions = Vec::with_capacity(signatures.len());

    for signature in signatures {
        pacer.wait_turn().await;
        let outcome = DetailOutcome::from(provider.get_parsed_transaction(signature).await);
        pacer.mark(detail_delay);

        match outcome {
            DetailOutcome::Fetched(tx) => {
                debug!(
                    signature = %signature,
                    slot = tx.slot,
                    block_time = ?tx.block_time,
                    "Fetched transaction"
                );
                metrics.transactions_fetched.inc();
                transactions.push(tx);
            }
            DetailOutcome::Skipped(reason) => {
                metrics.transactions_skipped.inc();
                warn!(
                    signature = %signature,
                    reason = %reason,
                    "Skipping transaction"
                );
            }
        }
    }

    debug!(
        requested = signatures.len(),
        fetched = transactions.len(),
        "Fetched transaction details"
    );

    transactions
}
