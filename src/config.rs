use crate::error::AppError;
use clap::Parser;
use solana_sdk::commitment_config::CommitmentConfig;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Default pause between signature pages, in milliseconds.
pub const DEFAULT_DELAY_MS: i64 = 2000;

const DEFAULT_OUTPUT_FILE: &str = "filtered_transactions.txt";

/// Find transfers between the wallets listed in a file.
#[derive(Debug, Clone, Parser)]
#[command(name = "internal-transfer-indexer", version)]
#[command(about = "Find SOL transfers that happen between wallets of a given list", long_about = None)]
pub struct Cli {
    /// File with one wallet address per line
    pub wallets_file: PathBuf,

    /// Maximum number of signatures to fetch per wallet
    #[arg(allow_negative_numbers = true)]
    pub depth: i64,

    /// Pause between signature pages in milliseconds (detail fetches wait a tenth of it)
    #[arg(allow_negative_numbers = true, default_value_t = DEFAULT_DELAY_MS)]
    pub delay_ms: i64,

    /// Output file the result lines are appended to [env: OUTPUT_FILE]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Solana JSON-RPC HTTP endpoint [env: SOLANA_RPC_URL]
    #[arg(long)]
    pub rpc_url: Option<String>,
}

/// Depth and pacing for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunParams {
    pub depth: usize,
    pub page_delay: Duration,
}

impl RunParams {
    /// Validate raw user input. Nothing touches the network before this passes.
    pub fn new(depth: i64, delay_ms: i64) -> Result<Self, AppError> {
        if depth <= 0 {
            return Err(AppError::Config("Depth must be a positive number.".to_string()));
        }
        if delay_ms < 0 {
            return Err(AppError::Config(
                "Delay must be a non-negative number.".to_string(),
            ));
        }

        let depth = usize::try_from(depth)
            .map_err(|_| AppError::Config(format!("Depth {} is too large", depth)))?;

        Ok(Self {
            depth,
            page_delay: Duration::from_millis(delay_ms as u64),
        })
    }

    /// Pause between transaction detail requests: a tenth of the page delay.
    pub fn detail_delay(&self) -> Duration {
        self.page_delay / 10
    }
}

/// Application configuration from the command line and the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub wallets_file: PathBuf,
    pub params: RunParams,
    pub rpc_url: String,
    pub commitment: CommitmentConfig,
    pub output_file: PathBuf,
    pub log_level: String,
    pub metrics_file: Option<PathBuf>,
}

impl AppConfig {
    /// Build the configuration from parsed arguments and process environment.
    ///
    /// Environment variables:
    /// - SOLANA_RPC_URL: RPC endpoint, required unless `--rpc-url` is given
    /// - RPC_COMMITMENT: processed | confirmed | finalized (default: confirmed)
    /// - OUTPUT_FILE: result file (default: filtered_transactions.txt)
    /// - LOG_LEVEL: logging level (default: "info")
    /// - METRICS_FILE: where to write run metrics in Prometheus text format
    pub fn from_env(cli: Cli) -> Result<Self, AppError> {
        Self::from_sources(cli, |key| env::var(key).ok())
    }

    /// Same as [`AppConfig::from_env`] with an explicit variable lookup.
    pub fn from_sources<F>(cli: Cli, lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let params = RunParams::new(cli.depth, cli.delay_ms)?;

        let rpc_url = cli
            .rpc_url
            .or_else(|| lookup("SOLANA_RPC_URL"))
            .ok_or_else(|| AppError::Config("SOLANA_RPC_URL not set".to_string()))?;
        Self::validate_rpc_url(&rpc_url)?;

        let commitment = match lookup("RPC_COMMITMENT") {
            Some(level) => CommitmentConfig::from_str(&level).map_err(|_| {
                AppError::Config(format!("Invalid RPC_COMMITMENT: {}", level))
            })?,
            None => CommitmentConfig::confirmed(),
        };

        let output_file = cli
            .output
            .or_else(|| lookup("OUTPUT_FILE").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILE));

        let log_level = lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        let metrics_file = lookup("METRICS_FILE")
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            wallets_file: cli.wallets_file,
            params,
            rpc_url,
            commitment,
            output_file,
            log_level,
            metrics_file,
        })
    }

    fn validate_rpc_url(url: &str) -> Result<(), AppError> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(AppError::Config(format!(
                "SOLANA_RPC_URL must be an HTTP/HTTPS URL (http:// or https://), got: {}",
                url
            )));
        }
        Ok(())
    }
}
