use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::time::{SystemTime, UNIX_EPOCH};

pub mod consensus;
pub mod constants;
pub mod error;
pub mod hasher;
pub mod ledger;
pub mod pow;
pub mod validator;

pub use consensus::{resolve, select_longest, PeerTransport, Resolution};
pub use error::{InvalidChain, LedgerError, TransportError};
pub use hasher::digest;
pub use ledger::Ledger;
pub use pow::{find_proof, valid_proof, CancelFlag, ProofOfWork};
pub use validator::{is_valid, ChainValidator};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: String,
    pub recipient: String,
    /// Any JSON number, kept exactly as sent.
    pub amount: Number,
}

impl Transaction {
    pub fn new(
        sender: impl Into<String>,
        recipient: impl Into<String>,
        amount: impl Into<Number>,
    ) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            amount: amount.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    /// Seconds since the Unix epoch.
    pub timestamp: f64,
    pub transactions: Vec<Transaction>,
    pub proof: u64,
    pub previous_hash: String,
}

impl Block {
    pub fn digest(&self) -> String {
        hasher::digest(self)
    }
}

/// A full chain as served by a node and fetched by its peers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChainSnapshot {
    pub chain: Vec<Block>,
    pub length: u64,
}

impl ChainSnapshot {
    pub fn new(chain: Vec<Block>) -> Self {
        let length = chain.len() as u64;
        Self { chain, length }
    }
}

pub(crate) fn now_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}
