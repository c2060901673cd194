use crate::constants::DEFAULT_LISTEN;
use clap::Parser;
use ledger_core::constants::{PEER_FETCH_TIMEOUT_SECS, POW_DEFAULT_DIFFICULTY};
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(name = "ledger-node")]
#[command(about = "Proof-of-work ledger node with longest-chain consensus")]
pub struct Args {
    /// Address to listen on, e.g. 127.0.0.1:5000
    #[arg(long, env = "LEDGER_LISTEN", default_value = DEFAULT_LISTEN)]
    pub listen: String,

    /// Leading zero hex digits a proof must produce
    #[arg(long, env = "LEDGER_DIFFICULTY", default_value_t = POW_DEFAULT_DIFFICULTY)]
    pub difficulty: usize,

    /// Peers to register at startup (repeat or comma-separate)
    #[arg(long = "peer", env = "LEDGER_PEERS", value_delimiter = ',')]
    pub peers: Vec<String>,

    /// Per-peer timeout when fetching chains during consensus
    #[arg(long, env = "LEDGER_PEER_TIMEOUT_SECS", default_value_t = PEER_FETCH_TIMEOUT_SECS)]
    pub peer_timeout_secs: u64,

    /// Search proofs on all cores instead of one
    #[arg(long, env = "LEDGER_PARALLEL_MINING")]
    pub parallel_mining: bool,

    /// Identifier credited with mining rewards; random when omitted
    #[arg(long, env = "LEDGER_NODE_ID")]
    pub node_id: Option<String>,
}

/// Runtime settings shared by the handlers.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub node_id: String,
    pub difficulty: usize,
    pub peer_timeout: Duration,
    pub parallel_mining: bool,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            node_id: random_node_id(),
            difficulty: POW_DEFAULT_DIFFICULTY,
            peer_timeout: Duration::from_secs(PEER_FETCH_TIMEOUT_SECS),
            parallel_mining: false,
        }
    }
}

impl From<&Args> for NodeConfig {
    fn from(args: &Args) -> Self {
        Self {
            node_id: args.node_id.clone().unwrap_or_else(random_node_id),
            difficulty: args.difficulty,
            peer_timeout: Duration::from_secs(args.peer_timeout_secs),
            parallel_mining: args.parallel_mining,
        }
    }
}

pub fn random_node_id() -> String {
    let bytes: [u8; crate::constants::NODE_ID_BYTES] = rand::random();
    hex::encode(bytes)
}
