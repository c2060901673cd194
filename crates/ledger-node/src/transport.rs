use ledger_core::{ChainSnapshot, PeerTransport, TransportError};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Fetches `GET {peer}/chain` with reqwest, over http unless the peer was
/// registered with `https://`.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: Client,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, timeout })
    }
}

/// Chain endpoint of a registered peer address.
pub fn chain_url(peer: &str) -> String {
    if peer.contains("://") {
        format!("{peer}/chain")
    } else {
        format!("http://{peer}/chain")
    }
}

impl PeerTransport for HttpTransport {
    async fn fetch_chain(&self, peer: &str) -> Result<ChainSnapshot, TransportError> {
        let url = chain_url(peer);
        debug!(%url, "fetching peer chain");

        let res = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout {
                    peer: peer.to_string(),
                    secs: self.timeout.as_secs(),
                }
            } else {
                TransportError::Unreachable {
                    peer: peer.to_string(),
                    reason: e.to_string(),
                }
            }
        })?;

        let status = res.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                peer: peer.to_string(),
                status: status.as_u16(),
            });
        }

        res.json::<ChainSnapshot>()
            .await
            .map_err(|e| TransportError::Decode {
                peer: peer.to_string(),
                reason: e.to_string(),
            })
    }
}
