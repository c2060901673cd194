use crate::config::NodeConfig;
use crate::peers::PeerRegistry;
use crate::transport::HttpTransport;
use ledger_core::{CancelFlag, Ledger};
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::{Mutex, RwLock};

/// Handles shared by every request. The ledger's chain and pending pool sit
/// behind one lock.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<Mutex<Ledger>>,
    pub peers: Arc<RwLock<PeerRegistry>>,
    pub transport: Arc<HttpTransport>,
    pub config: Arc<NodeConfig>,
    mining: Arc<StdMutex<CancelFlag>>,
}

impl AppState {
    pub fn new(config: NodeConfig) -> anyhow::Result<Self> {
        let transport = HttpTransport::new(config.peer_timeout)?;
        Ok(Self {
            ledger: Arc::new(Mutex::new(Ledger::new(config.difficulty))),
            peers: Arc::new(RwLock::new(PeerRegistry::new())),
            transport: Arc::new(transport),
            config: Arc::new(config),
            mining: Arc::new(StdMutex::new(CancelFlag::new())),
        })
    }

    /// Flag for a proof search about to start.
    pub(crate) fn mining_flag(&self) -> CancelFlag {
        self.mining
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Stops every running proof search; later searches get a fresh flag.
    pub fn cancel_mining(&self) {
        let mut current = self
            .mining
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        current.cancel();
        *current = CancelFlag::new();
    }
}
