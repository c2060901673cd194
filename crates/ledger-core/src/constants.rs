pub const HASH_SIZE: usize = 32;
pub const HASH_HEX_SIZE: usize = HASH_SIZE * 2;
/// Leading `'0'` hex digits a proof digest must start with.
pub const POW_DEFAULT_DIFFICULTY: usize = 4;
pub const GENESIS_PROOF: u64 = 11;
pub const GENESIS_PREVIOUS_HASH: &str = "first block in the blockchain created by Aquasar";
/// Sender recorded on the reward transaction of a mined block.
pub const MINING_REWARD_SENDER: &str = "0";
pub const MINING_REWARD_AMOUNT: u64 = 1;
/// Candidates tested between two polls of a cancel flag.
pub const CANCEL_POLL_INTERVAL: u64 = 1024;
pub const PEER_FETCH_TIMEOUT_SECS: u64 = 5;
