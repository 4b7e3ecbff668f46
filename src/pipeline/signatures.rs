use crate::error::AppError;
use crate::metrics::RunMetrics;
use crate::rpc::pacing::Pacer;
use crate::rpc::{LedgerProvider, MAX_SIGNATURES_PER_PAGE};
use crate::solana::models::{TransactionSignature, WalletAddress};
use std::time::Duration;
use tracing::debug;

/// Walk an address's signature history backwards, newest first, until `depth`
/// signatures are collected or the history runs out.
///
/// Every successful page books a `page_delay` pause on the shared `pacer`, so
/// the next request of any kind waits for it. Any provider failure aborts the
/// walk for this address. What was collected so far is dropped with it; the
/// caller moves on to the next wallet.
pub async fn fetch_signature_history<P: LedgerProvider + ?Sized>(
    provider: &P,
    address: &WalletAddress,
    depth: usize,
    page_delay: Duration,
    pacer: &mut Pacer,
    metrics: &RunMetrics,
) -> Result<Vec<TransactionSignature>, AppError> {
    let mut signatures: Vec<TransactionSignature> = Vec::new();
    let mut cursor: Option<TransactionSignature> = None;

    while signatures.len() < depth {
        let limit = MAX_SIGNATURES_PER_PAGE.min(depth - signatures.len());

        pacer.wait_turn().await;
        let mut page = provider
            .list_signatures(address, cursor.as_ref(), limit)
            .await?;
        pacer.mark(page_delay);

        metrics.signature_pages.inc();

        if page.is_empty() {
            debug!(address = %address, collected = signatures.len(), "Signature history exhausted");
            break;
        }

        // A node that over-delivers must not push us past the depth.
        page.signatures.truncate(limit);
        cursor = page.cursor().cloned();

        debug!(
            address = %address,
            page_len = page.len(),
            collected = signatures.len() + page.len(),
            depth,
            "Fetched signature page"
        );

        signatures.extend(page.signatures);
    }

    metrics.signatures_fetched.inc_by(signatures.len() as u64);

    Ok(signatures)
}
