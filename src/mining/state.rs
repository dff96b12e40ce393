use primitive_types::U256;
use serde::Serialize;

use super::error::{ContractError, ContractResult};
use super::keyspace;
use crate::config::ContractConfig;
use crate::wallet::Address;

/// Contract-wide accounting, one per deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalState {
    pub current_difficulty_wei: U256,
    pub minimum_difficulty_threshold_wei: U256,
    pub block_creation_rate: u64,
    pub difficulty_adjustment_period: u64,
    pub reward_adjustment_period: u64,
    pub difficulty_scale_limit: u64,
    pub last_difficulty_adjustment_external_block: u64,
    pub total_blocks_mined: u64,
    /// Wei committed since the last retarget.
    pub total_wei_committed: U256,
    /// Wei expected over one full retarget period.
    pub total_wei_expected: U256,
    pub total_wei_burned: U256,
    pub total_supply_issued: u64,
    pub maximum_supply: u64,
    pub mining_halted: bool,
}

impl GlobalState {
    pub fn new(config: &ContractConfig, deployed_at: u64) -> Self {
        let difficulty = config.minimum_difficulty_wei;
        Self {
            current_difficulty_wei: difficulty,
            minimum_difficulty_threshold_wei: difficulty,
            block_creation_rate: config.block_creation_rate,
            difficulty_adjustment_period: config.difficulty_adjustment_period,
            reward_adjustment_period: config.reward_adjustment_period,
            difficulty_scale_limit: config.difficulty_scale_limit,
            last_difficulty_adjustment_external_block: deployed_at,
            total_blocks_mined: 0,
            total_wei_committed: U256::zero(),
            total_wei_expected: difficulty
                .saturating_mul(U256::from(config.difficulty_adjustment_period)),
            total_wei_burned: U256::zero(),
            total_supply_issued: 0,
            maximum_supply: config.maximum_supply,
            mining_halted: false,
        }
    }

    pub fn remaining_supply(&self) -> u64 {
        self.maximum_supply.saturating_sub(self.total_supply_issued)
    }
}

/// Per-window aggregate. Created by the first attempt, never removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MiningWindow {
    pub target_difficulty_wei: U256,
    pub total_mining_wei: U256,
    pub total_attempts: u64,
    /// Wei committed so far; the next attempt's offset.
    pub current_attempt_offset: U256,
    pub payed: bool,
    pub payee: Option<Address>,
}

impl MiningWindow {
    pub fn new(target_difficulty_wei: U256) -> Self {
        Self {
            target_difficulty_wei,
            total_mining_wei: U256::zero(),
            total_attempts: 0,
            current_attempt_offset: U256::zero(),
            payed: false,
            payee: None,
        }
    }

    /// Advance the cursor by `value`, returning the offset the attempt starts at.
    pub fn record(&mut self, value: U256) -> ContractResult<U256> {
        let (offset, end) = keyspace::range(self.current_attempt_offset, value)?;
        let total = self
            .total_mining_wei
            .checked_add(value)
            .ok_or(ContractError::ArithmeticOverflow)?;
        self.current_attempt_offset = end;
        self.total_mining_wei = total;
        self.total_attempts += 1;
        Ok(offset)
    }

    pub fn is_oversubscribed(&self) -> bool {
        self.total_mining_wei > self.target_difficulty_wei
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MiningAttempt {
    pub keyspace_offset: U256,
    pub value: U256,
}

/// Lifecycle of a window relative to the host height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowPhase {
    Open,
    Closed,
    Matured,
    Claimed,
    Expired,
}

/// Snapshot returned by `contract_state`.
#[derive(Debug, Clone, Serialize)]
pub struct ContractState {
    pub current_difficulty_wei: U256,
    pub minimum_difficulty_threshold_wei: U256,
    pub block_number: u64,
    pub block_creation_rate: u64,
    pub difficulty_adjustment_period: u64,
    pub reward_adjustment_period: u64,
    pub difficulty_scale_limit: u64,
    pub last_difficulty_adjustment_external_block: u64,
    pub total_blocks_mined: u64,
    pub total_wei_committed: U256,
    pub total_wei_expected: U256,
    pub block_target_difficulty_wei: U256,
    pub block_total_mining_wei: U256,
    pub block_current_attempt_offset: U256,
    pub total_wei_burned: U256,
    pub total_supply_issued: u64,
    pub maximum_supply: u64,
    pub mining_active: bool,
    pub mining_halted: bool,
    pub external_block: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct BlockData {
    pub target_difficulty_wei: U256,
    pub block_number: u64,
    pub total_mining_wei: U256,
    pub total_attempts: u64,
    pub current_attempt_offset: U256,
    pub payed: bool,
    pub payee: Option<Address>,
    pub exists: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AttemptData {
    pub offset: U256,
    pub value: U256,
    pub exists: bool,
}

/// Outcome of a successful `mine`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AttemptReceipt {
    pub window: u64,
    pub keyspace_offset: U256,
    pub value: U256,
    /// Slice size at entry, relative to what had been committed before.
    pub projected_keyspace: U256,
    pub target_difficulty_wei: U256,
}

/// Outcome of a successful `claim`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ClaimReceipt {
    pub window: u64,
    pub credit_to: Address,
    pub reward: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_expectation_covers_full_period() {
        let config = ContractConfig::default();
        let g = GlobalState::new(&config, 7);
        assert_eq!(g.current_difficulty_wei, config.minimum_difficulty_wei);
        assert_eq!(
            g.total_wei_expected,
            config.minimum_difficulty_wei * U256::from(2016u64)
        );
        assert_eq!(g.last_difficulty_adjustment_external_block, 7);
        assert_eq!(g.remaining_supply(), config.maximum_supply);
    }

    #[test]
    fn record_advances_cursor() {
        let mut w = MiningWindow::new(U256::from(100u64));
        assert_eq!(w.record(U256::from(40u64)).unwrap(), U256::zero());
        assert_eq!(w.record(U256::from(70u64)).unwrap(), U256::from(40u64));
        assert_eq!(w.total_attempts, 2);
        assert_eq!(w.total_mining_wei, U256::from(110u64));
        assert_eq!(w.current_attempt_offset, w.total_mining_wei);
        assert!(w.is_oversubscribed());
    }

    #[test]
    fn record_rejects_wrapping_offset() {
        let mut w = MiningWindow::new(U256::one());
        w.record(U256::MAX).unwrap();
        let before = w.clone();
        assert_eq!(w.record(U256::one()), Err(ContractError::ArithmeticOverflow));
        assert_eq!(w, before);
    }
}
