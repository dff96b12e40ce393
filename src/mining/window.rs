/// Maps external block heights onto mining windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowIndexer {
    pub block_creation_rate: u64,
    pub redemption_lookback: u64,
}

impl WindowIndexer {
    pub fn new(block_creation_rate: u64, redemption_lookback: u64) -> Self {
        Self {
            block_creation_rate,
            redemption_lookback,
        }
    }

    pub fn window_of(&self, external_block: u64) -> u64 {
        external_block / self.block_creation_rate
    }

    /// First external block whose hash decides `window`. `None` only for
    /// windows past the end of the height range.
    pub fn maturity_block(&self, window: u64) -> Option<u64> {
        window
            .checked_add(1)?
            .checked_mul(self.block_creation_rate)
    }

    pub fn is_mature(&self, window: u64, external_block: u64) -> bool {
        self.maturity_block(window)
            .is_some_and(|maturity| external_block >= maturity)
    }

    /// Last external block at which `window` can still be claimed.
    pub fn redemption_deadline(&self, window: u64) -> Option<u64> {
        self.maturity_block(window)
            .map(|maturity| maturity.saturating_add(self.redemption_lookback))
    }

    pub fn is_redeemable(&self, window: u64, external_block: u64) -> bool {
        match (self.maturity_block(window), self.redemption_deadline(window)) {
            (Some(maturity), Some(deadline)) => {
                maturity <= external_block && external_block <= deadline
            }
            _ => false,
        }
    }

    /// Whether a retarget period that started at `last_adjustment` has run out.
    pub fn is_adjustment_due(&self, last_adjustment: u64, period: u64, external_block: u64) -> bool {
        let span = period.saturating_mul(self.block_creation_rate);
        external_block > last_adjustment.saturating_add(span)
    }
}
