pub(crate) const DEFAULT_LISTEN: &str = "127.0.0.1:5000";
pub(crate) const NODE_ID_BYTES: usize = 16;
pub(crate) const MSG_BLOCK_FORGED: &str = "New Block Forged";
pub(crate) const MSG_TX_QUEUED: &str = "Transaction will be added to Block";
pub(crate) const MSG_NODES_ADDED: &str = "New nodes have been added";
pub(crate) const MSG_CHAIN_REPLACED: &str = "Our chain was replaced";
pub(crate) const MSG_CHAIN_AUTHORITATIVE: &str = "Our chain is authoritative";
