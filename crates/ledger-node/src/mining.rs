use crate::error::ApiError;
use crate::state::AppState;
use ledger_core::constants::{MINING_REWARD_AMOUNT, MINING_REWARD_SENDER};
use ledger_core::Block;
use tracing::info;

/// Finds a proof for the current tip off the async runtime and seals the
/// pending pool, plus a reward for this node, into a new block.
///
/// The search runs without the ledger lock. If the tip moved meanwhile (a
/// block was sealed or consensus swapped the chain) the proof is stale and
/// the search starts over against the new tip.
pub async fn mine(state: &AppState) -> Result<Block, ApiError> {
    loop {
        let (last_proof, tip, generation, pow) = {
            let ledger = state.ledger.lock().await;
            (
                ledger.last_proof()?,
                ledger.len(),
                ledger.generation(),
                ledger.pow(),
            )
        };

        let cancel = state.mining_flag();
        let parallel = state.config.parallel_mining;
        let found = tokio::task::spawn_blocking(move || {
            if parallel {
                pow.find_proof_parallel(last_proof, &cancel)
            } else {
                pow.find_proof_cancellable(last_proof, &cancel)
            }
        })
        .await?;

        let mut ledger = state.ledger.lock().await;
        match found {
            Some(proof) if ledger.len() == tip && ledger.generation() == generation => {
                ledger.new_transaction(
                    MINING_REWARD_SENDER,
                    state.config.node_id.as_str(),
                    MINING_REWARD_AMOUNT,
                );
                let block = ledger.new_block(proof, None);
                info!(index = block.index, proof, "mined block");
                return Ok(block);
            }
            _ => info!(last_proof, "tip moved during proof search; restarting"),
        }
    }
}
