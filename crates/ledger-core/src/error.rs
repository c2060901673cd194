use thiserror::Error;

/// Failures raised by the ledger itself.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// A transaction or block is missing a required field. Rejected before
    /// anything is applied.
    #[error("malformed input: {0}")]
    MalformedInput(String),
    /// `last_block` was called on a ledger without a genesis block.
    #[error("chain is empty")]
    EmptyChain,
}

/// A peer could not deliver its chain. Consensus skips the peer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("peer {peer} unreachable: {reason}")]
    Unreachable { peer: String, reason: String },
    #[error("peer {peer} answered with status {status}")]
    Status { peer: String, status: u16 },
    #[error("peer {peer} timed out after {secs}s")]
    Timeout { peer: String, secs: u64 },
    #[error("peer {peer} sent an undecodable chain: {reason}")]
    Decode { peer: String, reason: String },
}

/// Why a candidate chain was rejected. Consensus discards the candidate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidChain {
    #[error("block {index} does not follow block {previous}")]
    IndexGap { index: u64, previous: u64 },
    #[error("block {index} does not link to the digest of its predecessor")]
    BrokenLink { index: u64 },
    #[error("block {index} carries a proof that does not solve its predecessor's puzzle")]
    InvalidProof { index: u64 },
    #[error("reported length {reported} but chain holds {actual} blocks")]
    LengthMismatch { reported: u64, actual: usize },
}

pub type Result<T> = std::result::Result<T, LedgerError>;
