use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A block of the host ledger. Only its height and hash matter to the
/// contract: the hash seeds the lottery draw of a maturing window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub timestamp: i64, // Unix timestamp (UTC)
    pub previous_hash: String,
    pub hash: String,
}

impl Block {
    /// Create the genesis block (first block in the chain).
    pub fn genesis() -> Self {
        Self::new(0, String::from("0"))
    }

    pub fn new(index: u64, previous_hash: String) -> Self {
        Self::new_with_timestamp(index, previous_hash, Utc::now().timestamp())
    }

    pub fn new_with_timestamp(index: u64, previous_hash: String, timestamp: i64) -> Self {
        let mut block = Self {
            index,
            timestamp,
            previous_hash,
            hash: String::new(),
        };
        block.hash = block.compute_hash();
        block
    }

    /// SHA-256 over the header fields (excluding the `hash` field itself).
    pub fn compute_hash(&self) -> String {
        let preimage = format!("{}:{}:{}", self.index, self.timestamp, self.previous_hash);
        let mut hasher = Sha256::new();
        hasher.update(preimage.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Raw hash bytes, if the cached hex hash is well formed.
    pub fn hash_bytes(&self) -> Option<[u8; 32]> {
        let bytes = hex::decode(&self.hash).ok()?;
        bytes.try_into().ok()
    }

    /// Validate that the cached `hash` matches the content. (Does NOT validate chain linkage.)
    pub fn is_valid(&self) -> bool {
        self.hash == self.compute_hash()
    }
}

#[cfg(test)]
mod tests {
    use super::Block;

    #[test]
    fn genesis_has_valid_hash() {
        let b = Block::genesis();
        assert_eq!(b.hash, b.compute_hash());
        assert!(b.hash_bytes().is_some());
    }

    #[test]
    fn invalid_when_mutated() {
        let mut b = Block::new_with_timestamp(2, "prev".into(), 1_700_000_000);
        assert!(b.is_valid());
        b.previous_hash = "other".into();
        assert!(!b.is_valid());
    }

    #[test]
    fn hash_depends_on_height() {
        let a = Block::new_with_timestamp(1, "p".into(), 10);
        let b = Block::new_with_timestamp(2, "p".into(), 10);
        assert_ne!(a.hash, b.hash);
    }
}
