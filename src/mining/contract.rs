use log::{debug, info, warn};
use primitive_types::U256;
use std::collections::HashMap;

use super::error::{ContractError, ContractResult};
use super::events::{ContractEvent, EventLog};
use super::keyspace;
use super::retarget::Retarget;
use super::reward;
use super::state::{
    AttemptData, AttemptReceipt, BlockData, ClaimReceipt, ContractState, GlobalState,
    MiningAttempt, MiningWindow, WindowPhase,
};
use super::window::WindowIndexer;
use crate::blockchain::BlockSource;
use crate::config::ContractConfig;
use crate::token::{self, TRANSMUTABLE_INTERFACE, TokenLedger, TransmuteTarget};
use crate::wallet::Address;

/// The burn-mining contract: owns all window, attempt and balance records.
///
/// Every public mutator validates first and commits last, so an `Err`
/// leaves the contract exactly as it was.
#[derive(Debug)]
pub struct BurnContract {
    config: ContractConfig,
    indexer: WindowIndexer,
    global: GlobalState,
    windows: HashMap<u64, MiningWindow>,
    attempts: HashMap<(u64, Address), MiningAttempt>,
    ledger: TokenLedger,
    events: EventLog,
}

impl BurnContract {
    pub fn deploy(config: ContractConfig, chain: &impl BlockSource) -> Self {
        let deployed_at = chain.current_block();
        info!(
            "DEPLOY - contract {} at external block {} (difficulty {} wei)",
            config.contract_address, deployed_at, config.minimum_difficulty_wei
        );
        Self {
            indexer: WindowIndexer::new(config.block_creation_rate, config.redemption_lookback),
            global: GlobalState::new(&config, deployed_at),
            windows: HashMap::new(),
            attempts: HashMap::new(),
            ledger: TokenLedger::new(),
            events: EventLog::default(),
            config,
        }
    }

    pub fn config(&self) -> &ContractConfig {
        &self.config
    }

    pub fn global(&self) -> &GlobalState {
        &self.global
    }

    pub fn indexer(&self) -> WindowIndexer {
        self.indexer
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Reward the next claimed window would receive before dilution.
    pub fn current_base_reward(&self) -> u64 {
        reward::base_reward(
            self.config.initial_reward,
            self.global.total_blocks_mined,
            self.global.reward_adjustment_period,
        )
    }

    /// False once another full reward could overshoot the maximum supply.
    pub fn mining_active(&self) -> bool {
        !self.global.mining_halted
            && self.global.total_supply_issued < self.global.maximum_supply
            && self
                .global
                .total_supply_issued
                .checked_add(self.current_base_reward())
                .is_some_and(|supply| supply <= self.global.maximum_supply)
    }

    /* -------------------- Mining -------------------- */

    /// Burn `value` wei for a slice of the current window's keyspace.
    pub fn mine(
        &mut self,
        chain: &impl BlockSource,
        caller: &Address,
        window: u64,
        value: U256,
    ) -> ContractResult<AttemptReceipt> {
        self.try_mine(chain, caller, window, value)
            .inspect_err(|e| warn!("MINE - rejected {caller} in window {window}: {e}"))
    }

    fn try_mine(
        &mut self,
        chain: &impl BlockSource,
        caller: &Address,
        window: u64,
        value: U256,
    ) -> ContractResult<AttemptReceipt> {
        let external_block = chain.current_block();
        let current = self.indexer.window_of(external_block);
        if window != current {
            return Err(ContractError::StaleWindow {
                requested: window,
                current,
            });
        }
        if value < self.config.minimum_mining_wei {
            return Err(ContractError::InsufficientValue {
                value,
                minimum: self.config.minimum_mining_wei,
            });
        }
        if value > self.config.maximum_mining_wei {
            return Err(ContractError::ExcessiveValue {
                value,
                maximum: self.config.maximum_mining_wei,
            });
        }
        if !self.mining_active() {
            return Err(ContractError::SupplyExhausted);
        }
        let key = (window, caller.clone());
        if self.attempts.contains_key(&key) {
            return Err(ContractError::DuplicateAttempt {
                window,
                address: caller.clone(),
            });
        }

        let retarget = self
            .indexer
            .is_adjustment_due(
                self.global.last_difficulty_adjustment_external_block,
                self.global.difficulty_adjustment_period,
                external_block,
            )
            .then(|| Retarget::compute(&self.global, external_block));

        let mut slot = match self.windows.get(&window) {
            Some(existing) => existing.clone(),
            None => MiningWindow::new(
                retarget.map_or(self.global.current_difficulty_wei, |r| r.current_difficulty_wei),
            ),
        };
        let projected_keyspace =
            keyspace::allocate(slot.target_difficulty_wei, slot.total_mining_wei, value)?;
        let keyspace_offset = slot.record(value)?;

        let committed_before = match retarget {
            Some(_) => U256::zero(),
            None => self.global.total_wei_committed,
        };
        let committed = committed_before
            .checked_add(value)
            .ok_or(ContractError::ArithmeticOverflow)?;
        let burned = self
            .global
            .total_wei_burned
            .checked_add(value)
            .ok_or(ContractError::ArithmeticOverflow)?;

        if let Some(retarget) = retarget {
            retarget.apply(&mut self.global);
        }
        self.global.total_wei_committed = committed;
        self.global.total_wei_burned = burned;

        let receipt = AttemptReceipt {
            window,
            keyspace_offset,
            value,
            projected_keyspace,
            target_difficulty_wei: slot.target_difficulty_wei,
        };
        self.events.emit(
            external_block,
            ContractEvent::MiningAttempt {
                from: caller.clone(),
                value,
                window,
                total_mined_wei: slot.total_mining_wei,
                target_difficulty_wei: slot.target_difficulty_wei,
            },
        );
        info!(
            "MINE - {} burned {} wei in window {} (attempt #{}, window total {} wei)",
            caller, value, window, slot.total_attempts, slot.total_mining_wei
        );
        self.windows.insert(window, slot);
        self.attempts.insert(
            key,
            MiningAttempt {
                keyspace_offset,
                value,
            },
        );
        Ok(receipt)
    }

    /* -------------------- Settlement -------------------- */

    /// Redeem a won window, crediting the reward to `credit_to`.
    pub fn claim(
        &mut self,
        chain: &impl BlockSource,
        caller: &Address,
        window: u64,
        credit_to: &Address,
    ) -> ContractResult<ClaimReceipt> {
        self.try_claim(chain, caller, window, credit_to)
            .inspect_err(|e| warn!("CLAIM - rejected {caller} for window {window}: {e}"))
    }

    fn try_claim(
        &mut self,
        chain: &impl BlockSource,
        caller: &Address,
        window: u64,
        credit_to: &Address,
    ) -> ContractResult<ClaimReceipt> {
        let external_block = chain.current_block();
        let slot = self
            .windows
            .get(&window)
            .ok_or(ContractError::NoSuchWindow(window))?;
        let maturity = self
            .indexer
            .maturity_block(window)
            .ok_or(ContractError::ArithmeticOverflow)?;
        if external_block < maturity {
            return Err(ContractError::NotMatured { window, maturity });
        }
        if !self.indexer.is_redeemable(window, external_block) {
            return Err(ContractError::RedemptionExpired {
                window,
                deadline: self.indexer.redemption_deadline(window).unwrap_or(u64::MAX),
            });
        }
        if slot.payed {
            return Err(ContractError::AlreadyClaimed(window));
        }
        let attempt = self
            .attempts
            .get(&(window, caller.clone()))
            .ok_or_else(|| ContractError::Unauthorized {
                window,
                address: caller.clone(),
            })?;

        let draw = self.draw(chain, window)?;
        let slice = keyspace::settled_slice(slot, attempt)?;
        if !keyspace::in_slice(draw, slice) {
            return Err(ContractError::NotWinner {
                window,
                address: caller.clone(),
            });
        }

        let base = self.current_base_reward();
        let reward = if slot.is_oversubscribed() {
            reward::proportional_reward(base, slot.target_difficulty_wei, slot.total_mining_wei)?
        } else {
            base
        };
        let reward = reward.min(self.global.remaining_supply());
        debug!(
            "CLAIM - window {} draw {:#x} in [{:#x}, {:#x}), base {} -> reward {}",
            window, draw, slice.0, slice.1, base, reward
        );

        self.ledger.credit(credit_to, reward)?;
        self.global.total_supply_issued += reward;
        self.global.total_blocks_mined += 1;
        if self.global.total_supply_issued >= self.global.maximum_supply {
            self.global.mining_halted = true;
            warn!("SUPPLY - maximum supply reached, mining halted");
        }
        if let Some(slot) = self.windows.get_mut(&window) {
            slot.payed = true;
            slot.payee = Some(credit_to.clone());
        }

        self.events.emit(
            external_block,
            ContractEvent::BlockClaimed {
                from: caller.clone(),
                credit_to: credit_to.clone(),
                reward,
                window,
            },
        );
        self.events.emit(
            external_block,
            ContractEvent::Transfer {
                from: self.config.contract_address.clone(),
                to: credit_to.clone(),
                value: reward,
            },
        );
        info!(
            "CLAIM - {} redeemed window {} for {} tokens to {}",
            caller,
            window,
            token::format_units(reward),
            credit_to
        );
        Ok(ClaimReceipt {
            window,
            credit_to: credit_to.clone(),
            reward,
        })
    }

    /// Drawn value for `window`, from the hash of its maturity block.
    fn draw(&self, chain: &impl BlockSource, window: u64) -> ContractResult<U256> {
        let maturity = self
            .indexer
            .maturity_block(window)
            .ok_or(ContractError::ArithmeticOverflow)?;
        let hash = chain
            .block_hash(maturity)
            .ok_or(ContractError::DrawUnavailable(maturity))?;
        Ok(keyspace::winning_value(&hash))
    }

    /* -------------------- Queries -------------------- */

    /// Read-only winner check: true only for a mature window whose draw
    /// lands in `address`'s slice.
    pub fn check_winning(&self, chain: &impl BlockSource, window: u64, address: &Address) -> bool {
        if !self.indexer.is_mature(window, chain.current_block()) {
            return false;
        }
        match (self.attempt_slice(window, address), self.draw(chain, window)) {
            (Ok(slice), Ok(draw)) => keyspace::in_slice(draw, slice),
            _ => false,
        }
    }

    /// Settled keyspace slice of `address` in `window`.
    pub fn attempt_slice(&self, window: u64, address: &Address) -> ContractResult<(U256, U256)> {
        let slot = self
            .windows
            .get(&window)
            .ok_or(ContractError::NoSuchWindow(window))?;
        let attempt = self
            .attempts
            .get(&(window, address.clone()))
            .ok_or_else(|| ContractError::NoSuchAttempt {
                window,
                address: address.clone(),
            })?;
        keyspace::settled_slice(slot, attempt)
    }

    pub fn has_attempt(&self, window: u64, address: &Address) -> bool {
        self.windows.contains_key(&window) && self.attempts.contains_key(&(window, address.clone()))
    }

    pub fn is_window_redeemed(&self, window: u64) -> bool {
        self.windows.get(&window).is_some_and(|w| w.payed)
    }

    /// Phase of `window` at the current height; `None` for future windows and
    /// for past windows nobody mined in.
    pub fn window_phase(&self, chain: &impl BlockSource, window: u64) -> Option<WindowPhase> {
        let external_block = chain.current_block();
        let current = self.indexer.window_of(external_block);
        if window > current || (window != current && !self.windows.contains_key(&window)) {
            return None;
        }
        let phase = if self.is_window_redeemed(window) {
            WindowPhase::Claimed
        } else if window == current {
            WindowPhase::Open
        } else if !self.indexer.is_mature(window, external_block) {
            WindowPhase::Closed
        } else if self.indexer.is_redeemable(window, external_block) {
            WindowPhase::Matured
        } else {
            WindowPhase::Expired
        };
        Some(phase)
    }

    pub fn contract_state(&self, chain: &impl BlockSource) -> ContractState {
        let external_block = chain.current_block();
        let block_number = self.indexer.window_of(external_block);
        let current = self.block_data(block_number);
        ContractState {
            current_difficulty_wei: self.global.current_difficulty_wei,
            minimum_difficulty_threshold_wei: self.global.minimum_difficulty_threshold_wei,
            block_number,
            block_creation_rate: self.global.block_creation_rate,
            difficulty_adjustment_period: self.global.difficulty_adjustment_period,
            reward_adjustment_period: self.global.reward_adjustment_period,
            difficulty_scale_limit: self.global.difficulty_scale_limit,
            last_difficulty_adjustment_external_block: self
                .global
                .last_difficulty_adjustment_external_block,
            total_blocks_mined: self.global.total_blocks_mined,
            total_wei_committed: self.global.total_wei_committed,
            total_wei_expected: self.global.total_wei_expected,
            block_target_difficulty_wei: if current.exists {
                current.target_difficulty_wei
            } else {
                self.global.current_difficulty_wei
            },
            block_total_mining_wei: current.total_mining_wei,
            block_current_attempt_offset: current.current_attempt_offset,
            total_wei_burned: self.global.total_wei_burned,
            total_supply_issued: self.global.total_supply_issued,
            maximum_supply: self.global.maximum_supply,
            mining_active: self.mining_active(),
            mining_halted: self.global.mining_halted,
            external_block,
        }
    }

    pub fn block_data(&self, window: u64) -> BlockData {
        match self.windows.get(&window) {
            Some(w) => BlockData {
                target_difficulty_wei: w.target_difficulty_wei,
                block_number: window,
                total_mining_wei: w.total_mining_wei,
                total_attempts: w.total_attempts,
                current_attempt_offset: w.current_attempt_offset,
                payed: w.payed,
                payee: w.payee.clone(),
                exists: true,
            },
            None => BlockData {
                target_difficulty_wei: U256::zero(),
                block_number: window,
                total_mining_wei: U256::zero(),
                total_attempts: 0,
                current_attempt_offset: U256::zero(),
                payed: false,
                payee: None,
                exists: false,
            },
        }
    }

    pub fn mining_attempt(&self, window: u64, address: &Address) -> AttemptData {
        match self.attempts.get(&(window, address.clone())) {
            Some(a) => AttemptData {
                offset: a.keyspace_offset,
                value: a.value,
                exists: true,
            },
            None => AttemptData {
                offset: U256::zero(),
                value: U256::zero(),
                exists: false,
            },
        }
    }

    /* -------------------- Token -------------------- */

    pub fn balance_of(&self, address: &Address) -> u64 {
        self.ledger.balance_of(address)
    }

    pub fn total_supply(&self) -> u64 {
        self.global.total_supply_issued
    }

    pub fn transfer(
        &mut self,
        chain: &impl BlockSource,
        from: &Address,
        to: &Address,
        amount: u64,
    ) -> ContractResult<()> {
        self.ledger
            .transfer(from, to, amount)
            .inspect_err(|e| warn!("TRANSFER - rejected {from} -> {to}: {e}"))?;
        self.events.emit(
            chain.current_block(),
            ContractEvent::Transfer {
                from: from.clone(),
                to: to.clone(),
                value: amount,
            },
        );
        info!("TRANSFER - {} -> {}: {}", from, to, token::format_units(amount));
        Ok(())
    }

    /// Burn `amount` here and have `target` credit the caller. The debit is
    /// undone if the target refuses.
    pub fn transmute(
        &mut self,
        chain: &impl BlockSource,
        caller: &Address,
        target_address: &Address,
        target: &mut dyn TransmuteTarget,
        amount: u64,
    ) -> ContractResult<u64> {
        self.try_transmute(chain, caller, target_address, target, amount)
            .inspect_err(|e| warn!("TRANSMUTE - rejected {caller} -> {target_address}: {e}"))
    }

    fn try_transmute(
        &mut self,
        chain: &impl BlockSource,
        caller: &Address,
        target_address: &Address,
        target: &mut dyn TransmuteTarget,
        amount: u64,
    ) -> ContractResult<u64> {
        if amount == 0 {
            return Err(ContractError::ZeroAmount);
        }
        let available = self.ledger.balance_of(caller);
        if available < amount {
            return Err(ContractError::InsufficientBalance {
                required: amount,
                available,
            });
        }
        if !target.supports_interface(TRANSMUTABLE_INTERFACE) {
            return Err(ContractError::UnsupportedCapability(target_address.clone()));
        }

        self.ledger.debit(caller, amount)?;
        self.global.total_supply_issued -= amount;

        let dest_quantity =
            match target.transmuted(&self.config.contract_address, caller, amount) {
                Ok(quantity) => quantity,
                Err(rejection) => {
                    self.ledger.credit(caller, amount)?;
                    self.global.total_supply_issued += amount;
                    return Err(ContractError::TransmuteRejected {
                        target: target_address.clone(),
                        reason: rejection.to_string(),
                    });
                }
            };

        self.events.emit(
            chain.current_block(),
            ContractEvent::Transmuted {
                who: caller.clone(),
                base_contract: self.config.contract_address.clone(),
                transmuted_contract: target_address.clone(),
                source_quantity: amount,
                dest_quantity,
            },
        );
        info!(
            "TRANSMUTE - {} moved {} tokens into {} ({} credited)",
            caller,
            token::format_units(amount),
            target_address,
            dest_quantity
        );
        Ok(dest_quantity)
    }
}
