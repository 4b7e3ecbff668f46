use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::HashSet;
use std::fmt;

/// Program id of the native System Program. Transfers issued by it move SOL.
pub const SYSTEM_PROGRAM_ID: &str = "11111111111111111111111111111111";

/// Lamports per SOL (1 SOL = 1,000,000,000 lamports).
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Base58-encoded account address. Compared byte-for-byte, so case matters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WalletAddress(String);

impl WalletAddress {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for WalletAddress {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Base58-encoded transaction signature. Doubles as the pagination cursor
/// for signature history requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionSignature(String);

impl TransactionSignature {
    pub fn new(signature: impl Into<String>) -> Self {
        Self(signature.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The closed set of addresses a run is interested in.
///
/// Built once from the full input list and only ever read afterwards.
#[derive(Debug, Clone, Default)]
pub struct WalletSet {
    members: HashSet<WalletAddress>,
}

impl WalletSet {
    pub fn contains(&self, address: &str) -> bool {
        self.members.contains(address)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }
}

impl FromIterator<WalletAddress> for WalletSet {
    fn from_iter<I: IntoIterator<Item = WalletAddress>>(iter: I) -> Self {
        Self {
            members: iter.into_iter().collect(),
        }
    }
}

impl<'a> FromIterator<&'a WalletAddress> for WalletSet {
    fn from_iter<I: IntoIterator<Item = &'a WalletAddress>>(iter: I) -> Self {
        iter.into_iter().cloned().collect()
    }
}

/// One page of signature history, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignaturePage {
    pub signatures: Vec<TransactionSignature>,
}

impl SignaturePage {
    pub fn new(signatures: Vec<TransactionSignature>) -> Self {
        Self { signatures }
    }

    /// The oldest signature in the page, used as `before` for the next request.
    pub fn cursor(&self) -> Option<&TransactionSignature> {
        self.signatures.last()
    }

    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }
}

/// A decoded transaction reduced to what transfer matching needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTransaction {
    /// First signature of the transaction (its unique identifier)
    pub signature: TransactionSignature,

    /// Slot number in which this transaction was processed
    pub slot: u64,

    /// Block time, when the node reports one
    pub block_time: Option<DateTime<Utc>>,

    /// Top-level instructions in message order
    pub instructions: Vec<Instruction>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    pub program_id: String,
    pub payload: InstructionPayload,
}

/// The decoded body of an instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum InstructionPayload {
    /// A `transfer` carrying lamports between two accounts.
    Transfer(TransferInfo),
    /// Any other parsed instruction kind, e.g. `createAccount` or `transferChecked`.
    Other { kind: String },
    /// The node could not decode the instruction (partially decoded or compiled).
    Unparsed,
}

/// The `info` object of a parsed `transfer` instruction.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TransferInfo {
    pub source: WalletAddress,
    pub destination: WalletAddress,
    pub lamports: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Native,
    Token,
}

impl AssetKind {
    /// Classify a transfer by the program that issued it.
    ///
    /// Only the System Program counts as native. Everything else is reported
    /// as a token transfer, without checking that the program really is a
    /// token program.
    pub fn from_program_id(program_id: &str) -> Self {
        if program_id == SYSTEM_PROGRAM_ID {
            AssetKind::Native
        } else {
            AssetKind::Token
        }
    }

    /// Output flag: `1` for native SOL, `0` for SPL tokens.
    pub fn flag(self) -> u8 {
        match self {
            AssetKind::Native => 1,
            AssetKind::Token => 0,
        }
    }
}

/// A transfer between two distinct members of the wallet set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRecord {
    pub source: WalletAddress,
    pub destination: WalletAddress,
    pub lamports: u64,
    pub asset_kind: AssetKind,
    pub tx_id: TransactionSignature,
}

impl TransferRecord {
    /// Amount in SOL with exactly nine fractional digits.
    pub fn amount(&self) -> String {
        format_lamports(self.lamports)
    }
}

impl fmt::Display for TransferRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] => [{}] | amt:{} splOrNative:{} tx:{}",
            self.source,
            self.destination,
            self.amount(),
            self.asset_kind.flag(),
            self.tx_id
        )
    }
}

/// Render lamports as SOL in fixed-point notation with nine decimals.
pub fn format_lamports(lamports: u64) -> String {
    format!(
        "{}.{:09}",
        lamports / LAMPORTS_PER_SOL,
        lamports % LAMPORTS_PER_SOL
    )
}
