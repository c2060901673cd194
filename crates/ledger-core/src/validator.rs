use crate::error::InvalidChain;
use crate::pow::ProofOfWork;
use crate::{hasher, Block};

/// Checks that every block follows, links to and solves the puzzle of its
/// predecessor.
#[derive(Clone, Copy, Debug, Default)]
pub struct ChainValidator {
    pow: ProofOfWork,
}

impl ChainValidator {
    pub fn new(difficulty: usize) -> Self {
        Self {
            pow: ProofOfWork::new(difficulty),
        }
    }

    pub fn with_pow(pow: ProofOfWork) -> Self {
        Self { pow }
    }

    /// Reports the first broken block. Chains of zero or one block pass.
    pub fn validate(&self, chain: &[Block]) -> Result<(), InvalidChain> {
        for pair in chain.windows(2) {
            let (prev, block) = (&pair[0], &pair[1]);
            if block.index != prev.index + 1 {
                return Err(InvalidChain::IndexGap {
                    index: block.index,
                    previous: prev.index,
                });
            }
            if block.previous_hash != hasher::digest(prev) {
                return Err(InvalidChain::BrokenLink { index: block.index });
            }
            if !self.pow.valid_proof(prev.proof, block.proof) {
                return Err(InvalidChain::InvalidProof { index: block.index });
            }
        }
        Ok(())
    }

    pub fn is_valid(&self, chain: &[Block]) -> bool {
        self.validate(chain).is_ok()
    }
}

/// [`ChainValidator::is_valid`] at the default difficulty.
pub fn is_valid(chain: &[Block]) -> bool {
    ChainValidator::default().is_valid(chain)
}
