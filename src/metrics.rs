use crate::error::AppError;
use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, Registry, TextEncoder};
use std::path::Path;

/// Counters for a single indexing run.
///
/// Each run owns its registry, so nothing is shared between runs (or tests).
/// The metrics are exported once at the end of the run rather than scraped.
pub struct RunMetrics {
    registry: Registry,
    pub signature_pages: IntCounter,
    pub signatures_fetched: IntCounter,
    pub transactions_fetched: IntCounter,
    pub transactions_skipped: IntCounter,
    pub transfers_matched: IntCounter,
    pub wallets_failed: IntCounter,
    pub rpc_request_time: Histogram,
}

impl RunMetrics {
    pub fn new() -> Result<Self, AppError> {
        let registry = Registry::new();

        let signature_pages = IntCounter::new(
            "transfer_indexer_signature_pages_total",
            "Signature history pages fetched",
        )?;
        let signatures_fetched = IntCounter::new(
            "transfer_indexer_signatures_fetched_total",
            "Transaction signatures collected across all wallets",
        )?;
        let transactions_fetched = IntCounter::new(
            "transfer_indexer_transactions_fetched_total",
            "Transactions fetched and parsed successfully",
        )?;
        let transactions_skipped = IntCounter::new(
            "transfer_indexer_transactions_skipped_total",
            "Signatures skipped because the transaction was unavailable or failed",
        )?;
        let transfers_matched = IntCounter::new(
            "transfer_indexer_transfers_matched_total",
            "Transfers between two tracked wallets",
        )?;
        let wallets_failed = IntCounter::new(
            "transfer_indexer_wallets_failed_total",
            "Wallets whose signature history could not be fetched",
        )?;
        let rpc_request_time = Histogram::with_opts(
            HistogramOpts::new(
                "transfer_indexer_rpc_request_seconds",
                "Latency of individual RPC requests",
            )
            .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        )?;

        registry.register(Box::new(signature_pages.clone()))?;
        registry.register(Box::new(signatures_fetched.clone()))?;
        registry.register(Box::new(transactions_fetched.clone()))?;
        registry.register(Box::new(transactions_skipped.clone()))?;
        registry.register(Box::new(transfers_matched.clone()))?;
        registry.register(Box::new(wallets_failed.clone()))?;
        registry.register(Box::new(rpc_request_time.clone()))?;

        Ok(Self {
            registry,
            signature_pages,
            signatures_fetched,
            transactions_fetched,
            transactions_skipped,
            transfers_matched,
            wallets_failed,
            rpc_request_time,
        })
    }

    /// Get the metrics in Prometheus exposition format.
    pub fn gather(&self) -> Result<String, AppError> {
        let encoder = TextEncoder::new();
        let mut buffer = vec![];

        encoder.encode(&self.registry.gather(), &mut buffer)?;

        String::from_utf8(buffer)
            .map_err(|e| AppError::Metrics(format!("Failed to convert metrics to UTF-8: {}", e)))
    }

    /// Write the metrics to `path` for a textfile collector to pick up.
    ///
    /// The file is written next to its destination and renamed into place so a
    /// collector never reads a half-written file.
    pub fn write_textfile(&self, path: &Path) -> Result<(), AppError> {
        let body = self.gather()?;
        let tmp = path.with_extension("prom.tmp");
        std::fs::write(&tmp, body)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }
}
