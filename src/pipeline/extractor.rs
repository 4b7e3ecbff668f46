use crate::solana::models::{
    AssetKind, InstructionPayload, ParsedTransaction, TransferInfo, TransferRecord, WalletSet,
};

/// Collect transfers whose two ends are distinct members of `wallets`.
///
/// Records come out in transaction order, then instruction order.
pub fn extract_transfers(
    transactions: &[ParsedTransaction],
    wallets: &WalletSet,
) -> Vec<TransferRecord> {
    transactions
        .iter()
        .flat_map(|tx| extract_from_transaction(tx, wallets))
        .collect()
}

fn extract_from_transaction<'a>(
    tx: &'a ParsedTransaction,
    wallets: &'a WalletSet,
) -> impl Iterator<Item = TransferRecord> + 'a {
    tx.instructions.iter().filter_map(move |ix| match &ix.payload {
        InstructionPayload::Transfer(info) if is_internal(info, wallets) => Some(TransferRecord {
            source: info.source.clone(),
            destination: info.destination.clone(),
            lamports: info.lamports,
            asset_kind: AssetKind::from_program_id(&ix.program_id),
            tx_id: tx.signature.clone(),
        }),
        InstructionPayload::Transfer(_)
        | InstructionPayload::Other { .. }
        | InstructionPayload::Unparsed => None,
    })
}

fn is_internal(info: &TransferInfo, wallets: &WalletSet) -> bool {
    info.source != info.destination
        && wallets.contains(info.source.as_str())
        && wallets.contains(info.destination.as_str())
}
