//! Ordered set of peer addresses. Plain-http peers are stored as
//! `host[:port]`, https peers keep their scheme.

use ledger_core::LedgerError;
use reqwest::Url;

#[derive(Clone, Debug, Default)]
pub struct PeerRegistry {
    nodes: Vec<String>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a peer. Returns `false` when it was already known.
    pub fn register(&mut self, address: &str) -> Result<bool, LedgerError> {
        let node = normalize(address)?;
        if self.nodes.contains(&node) {
            return Ok(false);
        }
        self.nodes.push(node);
        Ok(true)
    }

    /// Peers in registration order. Consensus breaks ties by this order.
    pub fn list(&self) -> &[String] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// `http://10.0.0.2:5000/` and `10.0.0.2:5000` both become `10.0.0.2:5000`;
/// `https://node.example/` becomes `https://node.example`.
pub fn normalize(address: &str) -> Result<String, LedgerError> {
    let address = address.trim();
    if address.is_empty() {
        return Err(LedgerError::MalformedInput("empty node address".into()));
    }
    let with_scheme = if address.contains("://") {
        address.to_string()
    } else {
        format!("http://{address}")
    };
    let invalid = || LedgerError::MalformedInput(format!("invalid node address: {address}"));

    let url = Url::parse(&with_scheme).map_err(|_| invalid())?;
    let host = url.host_str().ok_or_else(invalid)?;
    let authority = match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    };
    match url.scheme() {
        "http" => Ok(authority),
        "https" => Ok(format!("https://{authority}")),
        other => Err(LedgerError::MalformedInput(format!(
            "unsupported scheme {other} in node address: {address}"
        ))),
    }
}
