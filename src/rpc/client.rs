use crate::error::AppError;
use crate::metrics::RunMetrics;
use crate::rpc::LedgerProvider;
use crate::solana::models::{ParsedTransaction, SignaturePage, TransactionSignature, WalletAddress};
use crate::solana::parser::parse_transaction;
use async_trait::async_trait;
use serde_json::json;
use solana_client::nonblocking::rpc_client::RpcClient as SolanaRpcClient;
use solana_client::rpc_client::GetConfirmedSignaturesForAddress2Config;
use solana_client::rpc_config::RpcTransactionConfig;
use solana_client::rpc_request::RpcRequest;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_transaction_status::{EncodedConfirmedTransactionWithStatusMeta, UiTransactionEncoding};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};

/// Ledger provider backed by a Solana JSON-RPC HTTP endpoint.
///
/// Every call is a single request: no retries, no batching. Pacing between
/// calls is the caller's business.
pub struct RpcLedgerClient {
    client: SolanaRpcClient,
    commitment: CommitmentConfig,
    metrics: Arc<RunMetrics>,
}

impl RpcLedgerClient {
    /// Create a client for the given HTTP endpoint and commitment level.
    pub fn new(rpc_url: &str, commitment: CommitmentConfig, metrics: Arc<RunMetrics>) -> Self {
        info!(
            rpc_url = %rpc_url,
            commitment = ?commitment.commitment,
            "Creating Solana RPC client"
        );

        Self {
            client: SolanaRpcClient::new_with_commitment(rpc_url.to_string(), commitment),
            commitment,
            metrics,
        }
    }

    fn transaction_config(&self) -> RpcTransactionConfig {
        RpcTransactionConfig {
            encoding: Some(UiTransactionEncoding::JsonParsed),
            commitment: Some(self.commitment),
            max_supported_transaction_version: Some(0),
        }
    }
}

#[async_trait]
impl LedgerProvider for RpcLedgerClient {
    async fn list_signatures(
        &self,
        address: &WalletAddress,
        before: Option<&TransactionSignature>,
        limit: usize,
    ) -> Result<SignaturePage, AppError> {
        let pubkey = Pubkey::from_str(address.as_str())
            .map_err(|e| AppError::SolanaClient(format!("Invalid address {}: {}", address, e)))?;

        let before = before
            .map(|cursor| {
                Signature::from_str(cursor.as_str()).map_err(|e| {
                    AppError::SolanaClient(format!("Invalid cursor {}: {}", cursor, e))
                })
            })
            .transpose()?;

        let config = GetConfirmedSignaturesForAddress2Config {
            before,
            until: None,
            limit: Some(limit),
            commitment: Some(self.commitment),
        };

        let timer = self.metrics.rpc_request_time.start_timer();
        let statuses = self
            .client
            .get_signatures_for_address_with_config(&pubkey, config)
            .await
            .map_err(|e| AppError::SolanaClient(format!("Failed to fetch signatures: {}", e)))?;
        timer.observe_duration();

        debug!(
            address = %address,
            returned = statuses.len(),
            limit,
            "Fetched signature page"
        );

        Ok(SignaturePage::new(
            statuses
                .into_iter()
                .map(|status| TransactionSignature::new(status.signature))
                .collect(),
        ))
    }

    async fn get_parsed_transaction(
        &self,
        signature: &TransactionSignature,
    ) -> Result<Option<ParsedTransaction>, AppError> {
        // Validate locally so a malformed signature never reaches the node.
        Signature::from_str(signature.as_str())
            .map_err(|e| AppError::ParseError(format!("Invalid signature: {}", e)))?;

        // `getTransaction` answers `null` for unknown signatures; asking for an
        // Option keeps that distinct from a transport or decode failure.
        let params = json!([signature.as_str(), self.transaction_config()]);

        let timer = self.metrics.rpc_request_time.start_timer();
        let response: Option<EncodedConfirmedTransactionWithStatusMeta> = self
            .client
            .send(RpcRequest::GetTransaction, params)
            .await
            .map_err(|e| AppError::SolanaClient(format!("Failed to fetch transaction: {}", e)))?;
        timer.observe_duration();

        response.as_ref().map(parse_transaction).transpose()
    }
}
