pub mod block;
pub mod model;

pub use block::Block;
pub use model::Blockchain;

/// How many past blocks the host ledger serves hashes for.
pub const HASH_RETENTION: u64 = 256;

/// Read access to the host ledger the contract runs on.
pub trait BlockSource {
    /// Height of the block currently executing.
    fn current_block(&self) -> u64;

    /// Hash of a historical block, or `None` if unknown or out of retention.
    fn block_hash(&self, height: u64) -> Option<[u8; 32]>;
}
