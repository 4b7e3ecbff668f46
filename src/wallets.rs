use crate::error::AppError;
use crate::solana::models::WalletAddress;
use std::path::Path;
use tracing::{debug, info};

/// Load wallet addresses from a file, one per line, in file order.
///
/// Lines are trimmed and blank lines dropped. Duplicates are kept here; the
/// wallet set built from the list removes them.
pub fn load_wallets(path: &Path) -> Result<Vec<WalletAddress>, AppError> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        AppError::Input(format!("Failed to read {}: {}", path.display(), e))
    })?;

    let wallets = parse_wallets(&contents)?;

    info!(
        path = %path.display(),
        wallets = wallets.len(),
        "Loaded wallet list"
    );

    Ok(wallets)
}

/// Parse and validate the wallet list text.
pub fn parse_wallets(contents: &str) -> Result<Vec<WalletAddress>, AppError> {
    let mut wallets = Vec::new();

    for (index, line) in contents.lines().enumerate() {
        let address = line.trim();
        if address.is_empty() {
            continue;
        }

        validate_base58_address(address)
            .map_err(|e| AppError::Input(format!("line {}: {}", index + 1, e)))?;

        debug!(line = index + 1, address, "Read wallet address");
        wallets.push(WalletAddress::new(address));
    }

    if wallets.is_empty() {
        return Err(AppError::Input(
            "No wallet addresses found in the file.".to_string(),
        ));
    }

    Ok(wallets)
}

/// A Solana address is 32 bytes of base58.
fn validate_base58_address(address: &str) -> Result<(), String> {
    let bytes = bs58::decode(address)
        .into_vec()
        .map_err(|e| format!("Invalid base58 address {}: {}", address, e))?;

    if bytes.len() != 32 {
        return Err(format!(
            "Invalid address {}: expected 32 bytes, got {}",
            address,
            bytes.len()
        ));
    }

    Ok(())
}
