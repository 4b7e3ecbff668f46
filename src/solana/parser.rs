use crate::error::AppError;
use crate::solana::models::{
    Instruction, InstructionPayload, ParsedTransaction, TransactionSignature, TransferInfo,
};
use chrono::{DateTime, Utc};
use serde_json::Value;
use solana_transaction_status::{
    EncodedConfirmedTransactionWithStatusMeta, EncodedTransaction, UiInstruction, UiMessage,
    UiParsedInstruction,
};
use tracing::debug;

/// Parse a `jsonParsed` transaction from the RPC response into our domain model.
///
/// Only the first signature and the top-level instructions are kept. Inner
/// instructions and balance metadata are not needed for transfer matching.
pub fn parse_transaction(
    encoded_tx: &EncodedConfirmedTransactionWithStatusMeta,
) -> Result<ParsedTransaction, AppError> {
    let slot = encoded_tx.slot;

    let block_time = encoded_tx.block_time.map(|timestamp| {
        DateTime::from_timestamp(timestamp, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
    });

    let ui_tx = match &encoded_tx.transaction.transaction {
        EncodedTransaction::Json(ui_tx) => ui_tx,
        _ => {
            return Err(AppError::ParseError(
                "Unsupported transaction encoding".to_string(),
            ));
        }
    };

    let signature = ui_tx
        .signatures
        .first()
        .map(|sig| TransactionSignature::new(sig.clone()))
        .ok_or_else(|| AppError::ParseError("Transaction has no signature".to_string()))?;

    let instructions = match &ui_tx.message {
        UiMessage::Parsed(parsed) => parsed.instructions.iter().map(convert_instruction).collect(),
        UiMessage::Raw(raw) => raw
            .instructions
            .iter()
            .map(|ix| Instruction {
                program_id: raw
                    .account_keys
                    .get(ix.program_id_index as usize)
                    .cloned()
                    .unwrap_or_default(),
                payload: InstructionPayload::Unparsed,
            })
            .collect(),
    };

    let parsed = ParsedTransaction {
        signature,
        slot,
        block_time,
        instructions,
    };

    debug!(
        signature = %parsed.signature,
        slot = parsed.slot,
        instructions = parsed.instructions.len(),
        "Parsed transaction"
    );

    Ok(parsed)
}

fn convert_instruction(instruction: &UiInstruction) -> Instruction {
    match instruction {
        UiInstruction::Parsed(UiParsedInstruction::Parsed(ix)) => Instruction {
            program_id: ix.program_id.clone(),
            payload: decode_payload(&ix.parsed),
        },
        UiInstruction::Parsed(UiParsedInstruction::PartiallyDecoded(ix)) => Instruction {
            program_id: ix.program_id.clone(),
            payload: InstructionPayload::Unparsed,
        },
        // Compiled instructions only carry an index into the account keys,
        // which jsonParsed messages never produce at the top level.
        UiInstruction::Compiled(_) => Instruction {
            program_id: String::new(),
            payload: InstructionPayload::Unparsed,
        },
    }
}

/// Decode the `parsed` object of an instruction into a payload variant.
///
/// The node emits `{"type": "...", "info": {...}}`. A `transfer` whose `info`
/// lacks `source`, `destination` or an integer `lamports` (SPL token transfers
/// carry `amount` instead) is treated as some other instruction.
pub fn decode_payload(parsed: &Value) -> InstructionPayload {
    let kind = match parsed.get("type").and_then(Value::as_str) {
        Some(kind) => kind,
        None => return InstructionPayload::Unparsed,
    };

    match kind {
        "transfer" => parsed
            .get("info")
            .cloned()
            .and_then(|info| serde_json::from_value::<TransferInfo>(info).ok())
            .map(InstructionPayload::Transfer)
            .unwrap_or_else(|| InstructionPayload::Other {
                kind: kind.to_string(),
            }),
        other => InstructionPayload::Other {
            kind: other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solana::models::{WalletAddress, SYSTEM_PROGRAM_ID};
    use serde_json::json;

    #[test]
    fn decodes_system_transfer() {
        let payload = decode_payload(&json!({
            "type": "transfer",
            "info": {
                "source": "SrcA",
                "destination": "DstB",
                "lamports": 2_500_000_000u64
            }
        }));

        assert_eq!(
            payload,
            InstructionPayload::Transfer(TransferInfo {
                source: WalletAddress::new("SrcA"),
                destination: WalletAddress::new("DstB"),
                lamports: 2_500_000_000,
            })
        );
    }

    #[test]
    fn spl_transfer_without_lamports_is_not_a_transfer() {
        let payload = decode_payload(&json!({
            "type": "transfer",
            "info": {
                "source": "TokenAcctA",
                "destination": "TokenAcctB",
                "authority": "Owner",
                "amount": "1000"
            }
        }));

        assert_eq!(
            payload,
            InstructionPayload::Other {
                kind: "transfer".to_string()
            }
        );
    }

    #[test]
    fn other_kinds_and_missing_type_are_ignored() {
        assert_eq!(
            decode_payload(&json!({"type": "createAccount", "info": {}})),
            InstructionPayload::Other {
                kind: "createAccount".to_string()
            }
        );
        assert_eq!(decode_payload(&json!("memo text")), InstructionPayload::Unparsed);
    }

    #[test]
    fn parses_json_parsed_transaction() {
        let encoded: EncodedConfirmedTransactionWithStatusMeta = serde_json::from_value(json!({
            "slot": 250_000_000u64,
            "blockTime": 1_700_000_000i64,
            "transaction": {
                "signatures": ["sigMain", "sigSecond"],
                "message": {
                    "accountKeys": [
                        {"pubkey": "SrcA", "writable": true, "signer": true, "source": "transaction"},
                        {"pubkey": "DstB", "writable": true, "signer": false, "source": "transaction"}
                    ],
                    "recentBlockhash": "EkSnNWid2cvwEVnVx9aBqawnmiCNiDgp3gUdkDPTKN1N",
                    "instructions": [
                        {
                            "program": "system",
                            "programId": SYSTEM_PROGRAM_ID,
                            "parsed": {
                                "type": "transfer",
                                "info": {"source": "SrcA", "destination": "DstB", "lamports": 5000}
                            },
                            "stackHeight": null
                        },
                        {
                            "programId": "ComputeBudget111111111111111111111111111111",
                            "accounts": [],
                            "data": "3DTZbgwsozUF",
                            "stackHeight": null
                        }
                    ]
                }
            },
            "meta": null,
            "version": 0
        }))
        .expect("fixture deserializes");

        let parsed = parse_transaction(&encoded).expect("transaction parses");

        assert_eq!(parsed.signature.as_str(), "sigMain");
        assert_eq!(parsed.slot, 250_000_000);
        assert!(parsed.block_time.is_some());
        assert_eq!(parsed.instructions.len(), 2);
        assert_eq!(parsed.instructions[0].program_id, SYSTEM_PROGRAM_ID);
        assert!(matches!(
            parsed.instructions[0].payload,
            InstructionPayload::Transfer(TransferInfo { lamports: 5000, .. })
        ));
        assert_eq!(parsed.instructions[1].payload, InstructionPayload::Unparsed);
    }
}
