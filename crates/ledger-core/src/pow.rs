//! Proof-of-work puzzle: find `proof` such that `sha256("{proof}{last_proof}")`
//! starts with `difficulty` zero hex digits.

use crate::constants::{CANCEL_POLL_INTERVAL, POW_DEFAULT_DIFFICULTY};
use crate::hasher::{sha256, Hash};
use rayon::prelude::*;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tracing::{debug, info};

/// Shared flag a running proof search polls to stop early.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProofOfWork {
    pub difficulty: usize,
}

impl Default for ProofOfWork {
    fn default() -> Self {
        Self::new(POW_DEFAULT_DIFFICULTY)
    }
}

impl ProofOfWork {
    pub fn new(difficulty: usize) -> Self {
        Self { difficulty }
    }

    pub fn valid_proof(&self, last_proof: u64, proof: u64) -> bool {
        let guess = format!("{proof}{last_proof}");
        count_leading_zero_nibbles(&sha256(guess.as_bytes())) >= self.difficulty
    }

    /// Linear search from zero; returns the lowest valid proof.
    pub fn find_proof(&self, last_proof: u64) -> u64 {
        let mut proof = 0u64;
        while !self.valid_proof(last_proof, proof) {
            proof += 1;
        }
        debug!(last_proof, proof, "proof found");
        proof
    }

    /// Same search as [`find_proof`](Self::find_proof), giving up with `None`
    /// once `cancel` is set.
    pub fn find_proof_cancellable(&self, last_proof: u64, cancel: &CancelFlag) -> Option<u64> {
        let mut proof = 0u64;
        loop {
            if proof % CANCEL_POLL_INTERVAL == 0 && cancel.is_cancelled() {
                info!(last_proof, tried = proof, "proof search cancelled");
                return None;
            }
            if self.valid_proof(last_proof, proof) {
                debug!(last_proof, proof, "proof found");
                return Some(proof);
            }
            proof += 1;
        }
    }

    /// Searches batches of candidates across the rayon pool. Each batch
    /// keeps the lowest hit, so the result equals [`find_proof`](Self::find_proof).
    pub fn find_proof_parallel(&self, last_proof: u64, cancel: &CancelFlag) -> Option<u64> {
        let batch = CANCEL_POLL_INTERVAL * rayon::current_num_threads().max(1) as u64;
        let mut start = 0u64;
        loop {
            if cancel.is_cancelled() {
                info!(last_proof, tried = start, "parallel proof search cancelled");
                return None;
            }
            let end = start.saturating_add(batch);
            let found = (start..end)
                .into_par_iter()
                .find_first(|proof| self.valid_proof(last_proof, *proof));
            if let Some(proof) = found {
                debug!(last_proof, proof, "proof found");
                return Some(proof);
            }
            start = end;
        }
    }
}

/// Number of leading zero hex digits of `hash`.
pub fn count_leading_zero_nibbles(hash: &Hash) -> usize {
    let mut total = 0usize;
    for b in hash {
        if *b == 0 {
            total += 2;
        } else {
            if *b < 0x10 {
                total += 1;
            }
            break;
        }
    }
    total
}

/// [`ProofOfWork::valid_proof`] at the default difficulty.
pub fn valid_proof(last_proof: u64, proof: u64) -> bool {
    ProofOfWork::default().valid_proof(last_proof, proof)
}

/// [`ProofOfWork::find_proof`] at the default difficulty.
pub fn find_proof(last_proof: u64) -> u64 {
    ProofOfWork::default().find_proof(last_proof)
}
