//! Canonical block serialization and SHA-256 digests.
//!
//! Blocks are converted to a `serde_json::Value` first. Its object type is a
//! `BTreeMap` (the `preserve_order` feature must stay off), so keys come out
//! sorted at every nesting level and the compact writer emits no whitespace.

use crate::Block;
use sha2::{Digest, Sha256};

pub type Hash = [u8; 32];

pub fn sha256(bytes: &[u8]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest[..]);
    out
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(sha256(bytes))
}

/// Canonical byte form of a block: sorted keys, compact JSON.
pub fn canonical_bytes(block: &Block) -> Vec<u8> {
    // Every field of `Block` maps onto a JSON value; a failure here is a bug.
    let value = serde_json::to_value(block).expect("block is representable as JSON");
    value.to_string().into_bytes()
}

/// Lowercase hex SHA-256 of the block's canonical form.
pub fn digest(block: &Block) -> String {
    sha256_hex(&canonical_bytes(block))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::HASH_HEX_SIZE;
    use crate::Transaction;
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use serde_json::Number;

    fn sample_block() -> Block {
        Block {
            index: 2,
            timestamp: 1_600_000_200.25,
            transactions: vec![
                Transaction::new("Alice", "Bob", 10),
                Transaction::new("Bob", "Charlie", 5),
            ],
            proof: 35_293,
            previous_hash: sha256_hex(b"genesis"),
        }
    }

    #[test]
    fn sha256_hex_example() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn canonical_bytes_sort_keys_at_every_level() {
        let block = Block {
            index: 1,
            timestamp: 2.5,
            transactions: vec![Transaction::new("a", "b", 3)],
            proof: 11,
            previous_hash: "1".into(),
        };
        let text = String::from_utf8(canonical_bytes(&block)).unwrap();
        assert_eq!(
            text,
            r#"{"index":1,"previous_hash":"1","proof":11,"timestamp":2.5,"transactions":[{"amount":3,"recipient":"b","sender":"a"}]}"#
        );
    }

    #[test]
    fn fractional_amount_digest_is_stable() {
        let mut block = sample_block();
        block.transactions[1].amount = Number::from_f64(2.5).unwrap();
        let json = serde_json::to_string(&block).unwrap();
        let back: Block = serde_json::from_str(&json).unwrap();
        assert_eq!(digest(&back), digest(&block));

        let mut whole = block.clone();
        whole.transactions[1].amount = Number::from(2);
        assert_ne!(digest(&whole), digest(&block));
    }

    #[test]
    fn digest_is_fixed_length_lowercase_hex() {
        let d = digest(&sample_block());
        assert_eq!(d.len(), HASH_HEX_SIZE);
        assert!(d.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')));
    }

    #[test]
    fn block_hash_consistency() {
        let block = sample_block();
        assert_eq!(digest(&block), digest(&block));
        assert_eq!(digest(&block), digest(&block.clone()));
    }

    #[test]
    fn digest_survives_json_round_trip() {
        let block = sample_block();
        let json = serde_json::to_string(&block).unwrap();
        let back: Block = serde_json::from_str(&json).unwrap();
        assert_eq!(digest(&block), digest(&back));
    }

    #[test]
    fn digest_changes_with_each_field() {
        let base = sample_block();
        let base_digest = digest(&base);
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..200 {
            let mut b = base.clone();
            match rng.gen_range(0..7) {
                0 => b.index += rng.gen_range(1..1_000),
                1 => b.timestamp += rng.gen_range(0.001..1_000.0),
                2 => b.proof += rng.gen_range(1..1_000_000),
                3 => b.previous_hash = sha256_hex(&rng.gen::<[u8; 16]>()),
                4 => {
                    let old = b.transactions[0].amount.as_u64().unwrap();
                    b.transactions[0].amount = Number::from(old + rng.gen_range(1..1_000));
                }
                5 => b.transactions.swap(0, 1),
                _ => b.transactions.push(Transaction::new("x", "y", rng.gen::<u64>())),
            }
            assert_ne!(digest(&b), base_digest, "perturbed block {b:?}");
        }
    }
}
