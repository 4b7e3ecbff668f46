pub mod client;
pub mod pacing;

use crate::error::AppError;
use crate::solana::models::{ParsedTransaction, SignaturePage, TransactionSignature, WalletAddress};
use async_trait::async_trait;

/// Largest page the node accepts for `getSignaturesForAddress`.
pub const MAX_SIGNATURES_PER_PAGE: usize = 1000;

/// The two ledger capabilities the pipeline consumes.
///
/// Implementations do not retry; a failed call is reported to the caller,
/// which decides whether it costs a wallet or a single signature.
#[async_trait]
pub trait LedgerProvider: Send + Sync {
    /// List up to `limit` signatures for `address`, newest first, strictly
    /// older than `before` when a cursor is given.
    async fn list_signatures(
        &self,
        address: &WalletAddress,
        before: Option<&TransactionSignature>,
        limit: usize,
    ) -> Result<SignaturePage, AppError>;

    /// Fetch and decode one transaction. `Ok(None)` means the node has no
    /// record of it.
    async fn get_parsed_transaction(
        &self,
        signature: &TransactionSignature,
    ) -> Result<Option<ParsedTransaction>, AppError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    /// A page request as observed by [`MockLedger`].
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct PageRequest {
        pub address: String,
        pub before: Option<String>,
        pub limit: usize,
    }

    /// In-memory ledger with scripted histories and failures.
    #[derive(Default)]
    pub struct MockLedger {
        histories: HashMap<String, Vec<TransactionSignature>>,
        transactions: HashMap<String, ParsedTransaction>,
        failing_addresses: HashSet<String>,
        failing_pages: HashMap<String, usize>,
        failing_signatures: HashSet<String>,
        page_requests: Mutex<Vec<PageRequest>>,
        detail_requests: Mutex<Vec<String>>,
    }

    impl MockLedger {
        pub fn new() -> Self {
            Self::default()
        }

        /// Register a history of `count` synthetic signatures, newest first.
        pub fn with_synthetic_history(mut self, address: &str, count: usize) -> Self {
            let history = (0..count)
                .map(|i| TransactionSignature::new(format!("{address}-sig-{i}")))
                .collect();
            self.histories.insert(address.to_string(), history);
            self
        }

        /// Register a history made of the given transactions, newest first.
        pub fn with_history(mut self, address: &str, txs: Vec<ParsedTransaction>) -> Self {
            let history = txs.iter().map(|tx| tx.signature.clone()).collect();
            for tx in txs {
                self.transactions.insert(tx.signature.to_string(), tx);
            }
            self.histories.insert(address.to_string(), history);
            self
        }

        /// Add a signature to an address's history that the node cannot resolve.
        pub fn with_missing_transaction(mut self, address: &str, signature: &str) -> Self {
            self.histories
                .entry(address.to_string())
                .or_default()
                .push(TransactionSignature::new(signature));
            self
        }

        pub fn failing_address(mut self, address: &str) -> Self {
            self.failing_addresses.insert(address.to_string());
            self
        }

        /// Fail only the `nth` (1-based) page request for `address`.
        pub fn failing_page(mut self, address: &str, nth: usize) -> Self {
            self.failing_pages.insert(address.to_string(), nth);
            self
        }

        pub fn failing_signature(mut self, signature: &str) -> Self {
            self.failing_signatures.insert(signature.to_string());
            self
        }

        pub fn page_requests(&self) -> Vec<PageRequest> {
            self.page_requests.lock().unwrap().clone()
        }

        pub fn detail_requests(&self) -> Vec<String> {
            self.detail_requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LedgerProvider for MockLedger {
        async fn list_signatures(
            &self,
            address: &WalletAddress,
            before: Option<&TransactionSignature>,
            limit: usize,
        ) -> Result<SignaturePage, AppError> {
            let attempt = {
                let mut requests = self.page_requests.lock().unwrap();
                requests.push(PageRequest {
                    address: address.to_string(),
                    before: before.map(|s| s.to_string()),
                    limit,
                });
                requests
                    .iter()
                    .filter(|r| r.address == address.as_str())
                    .count()
            };

            if self.failing_addresses.contains(address.as_str())
                || self.failing_pages.get(address.as_str()) == Some(&attempt)
            {
                return Err(AppError::SolanaClient("429 Too Many Requests".to_string()));
            }

            let history = self
                .histories
                .get(address.as_str())
                .cloned()
                .unwrap_or_default();
            let start = match before {
                Some(cursor) => history
                    .iter()
                    .position(|s| s == cursor)
                    .map(|i| i + 1)
                    .unwrap_or(history.len()),
                None => 0,
            };

            Ok(SignaturePage::new(
                history.into_iter().skip(start).take(limit).collect(),
            ))
        }

        async fn get_parsed_transaction(
            &self,
            signature: &TransactionSignature,
        ) -> Result<Option<ParsedTransaction>, AppError> {
            self.detail_requests
                .lock()
                .unwrap()
                .push(signature.to_string());

            if self.failing_signatures.contains(signature.as_str()) {
                return Err(AppError::SolanaClient("connection reset".to_string()));
            }

            Ok(self.transactions.get(signature.as_str()).cloned())
        }
    }
}
