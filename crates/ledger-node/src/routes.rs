//! HTTP handlers. Each one parses the request, calls into `ledger-core` and
//! renders the result.

use crate::constants::{
    MSG_BLOCK_FORGED, MSG_CHAIN_AUTHORITATIVE, MSG_CHAIN_REPLACED, MSG_NODES_ADDED, MSG_TX_QUEUED,
};
use crate::error::ApiError;
use crate::mining;
use crate::state::AppState;
use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use ledger_core::{resolve, Block, ChainSnapshot, ChainValidator, Transaction};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Serialize)]
pub struct Health {
    status: &'static str,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct Head {
    pub height: u64,
    pub hash: String,
}

/// Fields are optional so a missing one is reported as malformed input
/// instead of a generic decode failure.
#[derive(Deserialize)]
pub struct TxIn {
    sender: Option<String>,
    recipient: Option<String>,
    amount: Option<serde_json::Number>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct TxQueued {
    pub message: String,
    pub index: u64,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct Mined {
    pub message: String,
    pub index: u64,
    pub transactions: Vec<Transaction>,
    pub proof: u64,
    pub previous_hash: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct Validity {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Deserialize)]
pub struct RegisterIn {
    nodes: Option<Vec<String>>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct Registered {
    pub message: String,
    pub total_nodes: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct Nodes {
    pub nodes: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct Resolved {
    pub message: String,
    pub replaced: bool,
    pub chain: Vec<Block>,
}

/// GET /health
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// GET /mine
pub async fn mine(State(state): State<AppState>) -> Result<Json<Mined>, ApiError> {
    let block = mining::mine(&state).await?;
    Ok(Json(Mined {
        message: MSG_BLOCK_FORGED.to_string(),
        index: block.index,
        transactions: block.transactions,
        proof: block.proof,
        previous_hash: block.previous_hash,
    }))
}

/// POST /transactions/new
pub async fn new_transaction(
    State(state): State<AppState>,
    payload: Result<Json<TxIn>, JsonRejection>,
) -> Result<(StatusCode, Json<TxQueued>), ApiError> {
    let Json(tx) = payload?;
    let (Some(sender), Some(recipient), Some(amount)) = (tx.sender, tx.recipient, tx.amount)
    else {
        return Err(ApiError::malformed("Missing values"));
    };

    let index = state
        .ledger
        .lock()
        .await
        .new_transaction(sender, recipient, amount);
    Ok((
        StatusCode::CREATED,
        Json(TxQueued {
            message: format!("{MSG_TX_QUEUED} {index}"),
            index,
        }),
    ))
}

/// GET /transactions/pending
pub async fn pending(State(state): State<AppState>) -> Json<Vec<Transaction>> {
    Json(state.ledger.lock().await.pending().to_vec())
}

/// GET /chain
pub async fn chain(State(state): State<AppState>) -> Json<ChainSnapshot> {
    Json(ChainSnapshot::new(state.ledger.lock().await.chain().to_vec()))
}

/// GET /chain/head
pub async fn head(State(state): State<AppState>) -> Result<Json<Head>, ApiError> {
    let ledger = state.ledger.lock().await;
    let last = ledger.last_block()?;
    Ok(Json(Head {
        height: last.index,
        hash: last.digest(),
    }))
}

/// GET /chain/valid
pub async fn validate(State(state): State<AppState>) -> Json<Validity> {
    let ledger = state.ledger.lock().await;
    let result = ChainValidator::with_pow(ledger.pow()).validate(ledger.chain());
    Json(Validity {
        valid: result.is_ok(),
        error: result.err().map(|e| e.to_string()),
    })
}

/// POST /nodes/register
pub async fn register_nodes(
    State(state): State<AppState>,
    payload: Result<Json<RegisterIn>, JsonRejection>,
) -> Result<(StatusCode, Json<Registered>), ApiError> {
    let Json(body) = payload?;
    let nodes = match body.nodes {
        Some(nodes) if !nodes.is_empty() => nodes,
        _ => return Err(ApiError::malformed("Please supply a valid list of nodes")),
    };
    // Normalise everything first so a bad entry leaves the registry untouched.
    let normalized = nodes
        .iter()
        .map(|n| crate::peers::normalize(n))
        .collect::<Result<Vec<_>, _>>()?;

    let mut peers = state.peers.write().await;
    for node in &normalized {
        if peers.register(node)? {
            info!(%node, "registered peer");
        }
    }
    Ok((
        StatusCode::CREATED,
        Json(Registered {
            message: MSG_NODES_ADDED.to_string(),
            total_nodes: peers.list().to_vec(),
        }),
    ))
}

/// GET /nodes
pub async fn list_nodes(State(state): State<AppState>) -> Json<Nodes> {
    Json(Nodes {
        nodes: state.peers.read().await.list().to_vec(),
    })
}

/// GET /nodes/resolve
pub async fn resolve_conflicts(State(state): State<AppState>) -> Json<Resolved> {
    let (local, validator) = {
        let ledger = state.ledger.lock().await;
        (
            ledger.chain().to_vec(),
            ChainValidator::with_pow(ledger.pow()),
        )
    };
    let peers = state.peers.read().await.list().to_vec();

    let resolution = resolve(
        local,
        &peers,
        state.transport.clone(),
        validator,
        state.config.peer_timeout,
    )
    .await;

    let mut ledger = state.ledger.lock().await;
    let replaced = resolution.apply(&mut ledger);
    let chain = ledger.chain().to_vec();
    drop(ledger);

    let message = if replaced {
        state.cancel_mining();
        MSG_CHAIN_REPLACED
    } else {
        MSG_CHAIN_AUTHORITATIVE
    };
    if replaced {
        warn!(length = chain.len(), "local chain replaced by consensus");
    }
    Json(Resolved {
        message: message.to_string(),
        replaced,
        chain,
    })
}
