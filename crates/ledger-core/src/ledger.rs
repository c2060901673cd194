use crate::constants::{GENESIS_PREVIOUS_HASH, GENESIS_PROOF, POW_DEFAULT_DIFFICULTY};
use crate::error::{LedgerError, Result};
use crate::pow::ProofOfWork;
use crate::{hasher, now_secs, Block, Transaction};
use tracing::{debug, info};

/// In-memory chain plus the pool of transactions waiting for the next block.
///
/// Not synchronized: hosts that share a ledger across tasks wrap it in a
/// single lock so the chain and the pending pool change together.
#[derive(Clone, Debug)]
pub struct Ledger {
    chain: Vec<Block>,
    pending: Vec<Transaction>,
    pow: ProofOfWork,
    generation: u64,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(POW_DEFAULT_DIFFICULTY)
    }
}

impl Ledger {
    /// Creates a ledger holding only the genesis block.
    pub fn new(difficulty: usize) -> Self {
        let mut ledger = Self {
            chain: Vec::new(),
            pending: Vec::new(),
            pow: ProofOfWork::new(difficulty),
            generation: 0,
        };
        ledger.new_block(GENESIS_PROOF, Some(GENESIS_PREVIOUS_HASH.to_string()));
        ledger
    }

    /// Queues a transaction; returns the index of the block that will hold it.
    pub fn new_transaction(
        &mut self,
        sender: impl Into<String>,
        recipient: impl Into<String>,
        amount: impl Into<serde_json::Number>,
    ) -> u64 {
        self.pending.push(Transaction::new(sender, recipient, amount));
        self.next_index()
    }

    /// Seals the pending pool into a new block and appends it.
    ///
    /// Without `previous_hash` the block links to the digest of the current
    /// last block.
    pub fn new_block(&mut self, proof: u64, previous_hash: Option<String>) -> Block {
        let last = self.chain.last();
        let previous_hash = previous_hash
            .or_else(|| last.map(hasher::digest))
            .unwrap_or_else(|| GENESIS_PREVIOUS_HASH.to_string());
        let timestamp = match last {
            Some(b) => now_secs().max(b.timestamp),
            None => now_secs(),
        };

        let block = Block {
            index: self.next_index(),
            timestamp,
            transactions: std::mem::take(&mut self.pending),
            proof,
            previous_hash,
        };
        debug!(
            index = block.index,
            txs = block.transactions.len(),
            proof,
            "sealed block"
        );
        self.chain.push(block.clone());
        block
    }

    pub fn last_block(&self) -> Result<&Block> {
        self.chain.last().ok_or(LedgerError::EmptyChain)
    }

    pub fn last_proof(&self) -> Result<u64> {
        self.last_block().map(|b| b.proof)
    }

    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    pub fn pending(&self) -> &[Transaction] {
        &self.pending
    }

    pub fn pow(&self) -> ProofOfWork {
        self.pow
    }

    pub fn difficulty(&self) -> usize {
        self.pow.difficulty
    }

    /// Bumped every time the chain is swapped out by [`replace_chain`](Self::replace_chain).
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Swaps in a whole chain accepted by consensus. The pending pool is kept.
    ///
    /// An empty replacement is refused, the genesis block must always exist.
    pub fn replace_chain(&mut self, chain: Vec<Block>) -> Result<()> {
        if chain.is_empty() {
            return Err(LedgerError::EmptyChain);
        }
        info!(
            old_len = self.chain.len(),
            new_len = chain.len(),
            "replacing local chain"
        );
        self.chain = chain;
        self.generation += 1;
        Ok(())
    }

    fn next_index(&self) -> u64 {
        self.chain.last().map_or(1, |b| b.index + 1)
    }
}
