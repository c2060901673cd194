//! Longest-valid-chain conflict resolution across peers.

use crate::error::{InvalidChain, TransportError};
use crate::validator::ChainValidator;
use crate::{Block, ChainSnapshot, Ledger};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// How a node obtains a peer's full chain. Implemented by the transport layer.
pub trait PeerTransport: Send + Sync + 'static {
    fn fetch_chain(
        &self,
        peer: &str,
    ) -> impl Future<Output = Result<ChainSnapshot, TransportError>> + Send;
}

/// Outcome of a resolution pass.
#[derive(Clone, Debug, PartialEq)]
pub struct Resolution {
    pub replaced: bool,
    /// The adopted peer chain when `replaced`, else the local chain.
    pub chain: Vec<Block>,
    /// Peer whose chain won, if any.
    pub source: Option<String>,
}

impl Resolution {
    /// Writes an adopted chain into `ledger`, unless the ledger has meanwhile
    /// grown to at least the same length. Returns whether the chain changed.
    pub fn apply(self, ledger: &mut Ledger) -> bool {
        if !self.replaced {
            return false;
        }
        if self.chain.len() <= ledger.len() {
            warn!(
                local = ledger.len(),
                candidate = self.chain.len(),
                "local chain caught up while resolving; keeping it"
            );
            return false;
        }
        ledger.replace_chain(self.chain).is_ok()
    }
}

/// Picks the longest valid candidate strictly longer than `local_len`.
///
/// Candidates are considered in iteration order, so the first of several
/// equally long chains wins. Failed fetches and invalid chains are skipped.
pub fn select_longest<I>(
    local_len: usize,
    candidates: I,
    validator: &ChainValidator,
) -> Option<(String, Vec<Block>)>
where
    I: IntoIterator<Item = (String, Result<ChainSnapshot, TransportError>)>,
{
    let mut max_len = local_len;
    let mut best = None;

    for (peer, fetched) in candidates {
        let snapshot = match fetched {
            Ok(s) => s,
            Err(e) => {
                warn!(%peer, error = %e, "skipping peer");
                continue;
            }
        };
        if snapshot.length != snapshot.chain.len() as u64 {
            let e = InvalidChain::LengthMismatch {
                reported: snapshot.length,
                actual: snapshot.chain.len(),
            };
            warn!(%peer, error = %e, "discarding candidate chain");
            continue;
        }
        if snapshot.chain.len() <= max_len {
            debug!(%peer, length = snapshot.length, best = max_len, "candidate not longer");
            continue;
        }
        match validator.validate(&snapshot.chain) {
            Ok(()) => {
                max_len = snapshot.chain.len();
                best = Some((peer, snapshot.chain));
            }
            Err(e) => warn!(%peer, error = %e, "discarding candidate chain"),
        }
    }
    best
}

/// Fetches every peer's chain concurrently, each bounded by `timeout`, and
/// returns the longest valid chain, or `local_chain` untouched.
pub async fn resolve<T: PeerTransport>(
    local_chain: Vec<Block>,
    peers: &[String],
    transport: Arc<T>,
    validator: ChainValidator,
    timeout: Duration,
) -> Resolution {
    let mut set = JoinSet::new();
    for (pos, peer) in peers.iter().enumerate() {
        let transport = transport.clone();
        let peer = peer.clone();
        set.spawn(async move {
            let fetched = match tokio::time::timeout(timeout, transport.fetch_chain(&peer)).await {
                Ok(result) => result,
                Err(_) => Err(TransportError::Timeout {
                    peer: peer.clone(),
                    secs: timeout.as_secs(),
                }),
            };
            (pos, peer, fetched)
        });
    }

    let mut fetched: Vec<Option<(String, Result<ChainSnapshot, TransportError>)>> =
        vec![None; peers.len()];
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((pos, peer, result)) => fetched[pos] = Some((peer, result)),
            Err(e) => warn!(error = %e, "peer fetch task failed"),
        }
    }

    match select_longest(local_chain.len(), fetched.into_iter().flatten(), &validator) {
        Some((peer, chain)) => {
            info!(%peer, length = chain.len(), "found longer valid chain");
            Resolution {
                replaced: true,
                chain,
                source: Some(peer),
            }
        }
        None => {
            info!(length = local_chain.len(), "local chain is authoritative");
            Resolution {
                replaced: false,
                chain: local_chain,
                source: None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const DIFFICULTY: usize = 2;

    #[derive(Default)]
    struct FakeTransport {
        chains: HashMap<String, Result<ChainSnapshot, TransportError>>,
        slow: Vec<String>,
    }

    impl FakeTransport {
        fn with(mut self, peer: &str, result: Result<ChainSnapshot, TransportError>) -> Self {
            self.chains.insert(peer.to_string(), result);
            self
        }
    }

    impl PeerTransport for FakeTransport {
        async fn fetch_chain(&self, peer: &str) -> Result<ChainSnapshot, TransportError> {
            if self.slow.iter().any(|p| p == peer) {
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
            self.chains
                .get(peer)
                .cloned()
                .unwrap_or_else(|| {
                    Err(TransportError::Unreachable {
                        peer: peer.to_string(),
                        reason: "connection refused".into(),
                    })
                })
        }
    }

    fn ledger_of_len(len: usize) -> Ledger {
        let mut ledger = Ledger::new(DIFFICULTY);
        while ledger.len() < len {
            ledger.new_transaction("a", "b", ledger.len() as u64);
            let proof = ledger.pow().find_proof(ledger.last_proof().unwrap());
            ledger.new_block(proof, None);
        }
        ledger
    }

    fn snapshot(ledger: &Ledger) -> ChainSnapshot {
        ChainSnapshot::new(ledger.chain().to_vec())
    }

    fn peers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    async fn run(local: &Ledger, peer_list: &[String], transport: FakeTransport) -> Resolution {
        resolve(
            local.chain().to_vec(),
            peer_list,
            Arc::new(transport),
            ChainValidator::new(DIFFICULTY),
            Duration::from_millis(200),
        )
        .await
    }

    #[tokio::test]
    async fn adopts_longer_valid_chain() {
        let mut l1 = ledger_of_len(2);
        let l2 = ledger_of_len(5);
        let transport = FakeTransport::default().with("l2:5000", Ok(snapshot(&l2)));

        let resolution = run(&l1, &peers(&["l2:5000"]), transport).await;
        assert!(resolution.replaced);
        assert_eq!(resolution.source.as_deref(), Some("l2:5000"));
        assert_eq!(resolution.chain, l2.chain());

        assert!(resolution.apply(&mut l1));
        assert_eq!(l1.chain(), l2.chain());
    }

    #[tokio::test]
    async fn rejects_longer_invalid_chain() {
        let local = ledger_of_len(2);
        let mut bad = ledger_of_len(6).chain().to_vec();
        bad[3].previous_hash = "forged".into();
        let transport = FakeTransport::default().with("evil:1", Ok(ChainSnapshot::new(bad)));

        let resolution = run(&local, &peers(&["evil:1"]), transport).await;
        assert!(!resolution.replaced);
        assert_eq!(resolution.chain, local.chain());
    }

    #[tokio::test]
    async fn keeps_local_chain_when_peers_are_shorter_or_equal() {
        let local = ledger_of_len(4);
        let transport = FakeTransport::default()
            .with("short:1", Ok(snapshot(&ledger_of_len(2))))
            .with("same:1", Ok(snapshot(&ledger_of_len(4))));

        let resolution = run(&local, &peers(&["short:1", "same:1"]), transport).await;
        assert!(!resolution.replaced);
        assert_eq!(resolution.chain.len(), 4);
    }

    #[tokio::test]
    async fn first_peer_wins_ties() {
        let local = ledger_of_len(1);
        let a = ledger_of_len(3);
        // Distinct content at equal length.
        let mut b_chain = ledger_of_len(3).chain().to_vec();
        b_chain[0].timestamp += 1.0;
        b_chain[1].previous_hash = b_chain[0].digest();
        b_chain[2].previous_hash = b_chain[1].digest();
        assert_ne!(a.chain(), b_chain.as_slice());

        let transport = FakeTransport::default()
            .with("a:1", Ok(snapshot(&a)))
            .with("b:1", Ok(ChainSnapshot::new(b_chain.clone())));

        let ab = run(&local, &peers(&["a:1", "b:1"]), transport).await;
        assert_eq!(ab.source.as_deref(), Some("a:1"));
        assert_eq!(ab.chain, a.chain());

        let transport = FakeTransport::default()
            .with("a:1", Ok(snapshot(&a)))
            .with("b:1", Ok(ChainSnapshot::new(b_chain.clone())));
        let ba = run(&local, &peers(&["b:1", "a:1"]), transport).await;
        assert_eq!(ba.source.as_deref(), Some("b:1"));
        assert_eq!(ba.chain, b_chain);
    }

    #[tokio::test]
    async fn longest_among_several_peers_wins() {
        let local = ledger_of_len(2);
        let transport = FakeTransport::default()
            .with("p3:1", Ok(snapshot(&ledger_of_len(3))))
            .with("p5:1", Ok(snapshot(&ledger_of_len(5))))
            .with("p4:1", Ok(snapshot(&ledger_of_len(4))));

        let resolution = run(&local, &peers(&["p3:1", "p5:1", "p4:1"]), transport).await;
        assert_eq!(resolution.source.as_deref(), Some("p5:1"));
        assert_eq!(resolution.chain.len(), 5);
    }

    #[tokio::test]
    async fn unreachable_and_slow_peers_are_skipped() {
        let local = ledger_of_len(2);
        let good = ledger_of_len(3);
        let mut transport = FakeTransport::default()
            .with("slow:1", Ok(snapshot(&ledger_of_len(6))))
            .with(
                "down:1",
                Err(TransportError::Status {
                    peer: "down:1".into(),
                    status: 503,
                }),
            )
            .with("good:1", Ok(snapshot(&good)));
        transport.slow.push("slow:1".into());

        let resolution = run(
            &local,
            &peers(&["missing:1", "slow:1", "down:1", "good:1"]),
            transport,
        )
        .await;
        assert!(resolution.replaced);
        assert_eq!(resolution.source.as_deref(), Some("good:1"));
    }

    #[tokio::test]
    async fn no_peers_keeps_local_chain() {
        let local = ledger_of_len(2);
        let resolution = run(&local, &[], FakeTransport::default()).await;
        assert!(!resolution.replaced);
        assert_eq!(resolution.chain, local.chain());
    }

    #[test]
    fn lying_about_length_is_discarded() {
        let chain = ledger_of_len(3).chain().to_vec();
        let lie = ChainSnapshot { chain, length: 9 };
        let picked = select_longest(
            1,
            vec![("liar:1".to_string(), Ok(lie))],
            &ChainValidator::new(DIFFICULTY),
        );
        assert!(picked.is_none());
    }

    #[test]
    fn resolution_never_shrinks_ledger() {
        let mut local = ledger_of_len(4);
        let stale = Resolution {
            replaced: true,
            chain: ledger_of_len(3).chain().to_vec(),
            source: Some("p:1".into()),
        };
        assert!(!stale.apply(&mut local));
        assert_eq!(local.len(), 4);
        assert_eq!(local.generation(), 0);
    }
}
