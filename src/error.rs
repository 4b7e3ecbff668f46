use thiserror::Error;

/// Application-level errors with context-rich messages.
///
/// Only `Config`, `Input` and `Io` are fatal for a run. Provider and parse
/// failures are absorbed by the pipeline at wallet or signature granularity.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Wallet input error: {0}")]
    Input(String),

    #[error("Solana client error: {0}")]
    SolanaClient(String),

    #[error("Transaction parsing error: {0}")]
    ParseError(String),

    #[error("Metrics error: {0}")]
    Metrics(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<prometheus::Error> for AppError {
    fn from(err: prometheus::Error) -> Self {
        AppError::Metrics(err.to_string())
    }
}
