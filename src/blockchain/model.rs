use super::{BlockSource, Block, HASH_RETENTION};

/// In-memory host ledger. Heights advance by appending blocks; historical
/// hashes are only served inside the retention window, like an EVM
/// `BLOCKHASH` lookup.
#[derive(Debug)]
pub struct Blockchain {
    pub chain: Vec<Block>,
}

impl Blockchain {
    /// Initialize a new host chain with a genesis block.
    pub fn new() -> Self {
        Self {
            chain: vec![Block::genesis()],
        }
    }

    /// Return the last block in the chain.
    pub fn last_block(&self) -> &Block {
        self.chain
            .last()
            .expect("Blockchain should always have at least the genesis block")
    }

    /// Append `count` blocks and return the new tip height.
    pub fn advance(&mut self, count: u64) -> u64 {
        for _ in 0..count {
            let index = self.chain.len() as u64;
            let prev_hash = self.last_block().hash.clone();
            self.chain.push(Block::new(index, prev_hash));
        }
        self.height()
    }

    pub fn height(&self) -> u64 {
        self.last_block().index
    }

    /// Validate the entire chain: linkage and hashes.
    pub fn is_valid_chain(&self) -> bool {
        let Some(genesis) = self.chain.first() else {
            return false;
        };
        if genesis.index != 0 || genesis.previous_hash != "0" || !genesis.is_valid() {
            return false;
        }

        self.chain.windows(2).all(|pair| {
            let (prev, current) = (&pair[0], &pair[1]);
            current.index == prev.index + 1
                && current.previous_hash == prev.hash
                && current.is_valid()
        })
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }
}

impl Default for Blockchain {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockSource for Blockchain {
    fn current_block(&self) -> u64 {
        self.height()
    }

    fn block_hash(&self, height: u64) -> Option<[u8; 32]> {
        let tip = self.height();
        if height > tip || tip - height > HASH_RETENTION {
            return None;
        }
        self.chain.get(height as usize)?.hash_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_genesis() {
        let bc = Blockchain::new();
        assert_eq!(bc.len(), 1);
        assert_eq!(bc.current_block(), 0);
        assert!(bc.is_valid_chain());
    }

    #[test]
    fn advance_links_blocks() {
        let mut bc = Blockchain::new();
        assert_eq!(bc.advance(10), 10);
        assert_eq!(bc.len(), 11);
        assert!(bc.is_valid_chain());
        assert_eq!(bc.chain[5].previous_hash, bc.chain[4].hash);
    }

    #[test]
    fn tampering_breaks_validation() {
        let mut bc = Blockchain::new();
        bc.advance(3);
        bc.chain[2].timestamp += 1;
        assert!(!bc.is_valid_chain());
    }

    #[test]
    fn hashes_fall_out_of_retention() {
        let mut bc = Blockchain::new();
        bc.advance(HASH_RETENTION + 10);
        assert!(bc.block_hash(bc.height() + 1).is_none());
        assert!(bc.block_hash(bc.height()).is_some());
        assert!(bc.block_hash(10).is_some());
        assert!(bc.block_hash(9).is_none());
    }
}
