//! Difficulty retargeting at period boundaries.

use log::debug;
use primitive_types::U256;

use super::state::GlobalState;

/// Clamp `committed_wei` into `[previous / scale_limit, previous * scale_limit]`,
/// then floor the result at `minimum_expected_wei`.
pub fn next_expected_wei(
    committed_wei: U256,
    previous_expected_wei: U256,
    minimum_expected_wei: U256,
    scale_limit: u64,
) -> U256 {
    let scale = U256::from(scale_limit.max(1));
    let ceiling = previous_expected_wei.saturating_mul(scale);
    let floor = previous_expected_wei / scale;
    let clamped = committed_wei.min(ceiling).max(floor);
    clamped.max(minimum_expected_wei)
}

/// New difficulty values produced by one retarget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Retarget {
    pub total_wei_expected: U256,
    pub current_difficulty_wei: U256,
    pub adjusted_at: u64,
}

impl Retarget {
    /// Compute the retarget for `global` at `external_block` without applying it.
    pub fn compute(global: &GlobalState, external_block: u64) -> Self {
        let period = U256::from(global.difficulty_adjustment_period);
        let minimum_expected = global.minimum_difficulty_threshold_wei.saturating_mul(period);
        let total_wei_expected = next_expected_wei(
            global.total_wei_committed,
            global.total_wei_expected,
            minimum_expected,
            global.difficulty_scale_limit,
        );
        Self {
            total_wei_expected,
            current_difficulty_wei: total_wei_expected / period,
            adjusted_at: external_block,
        }
    }

    pub fn apply(self, global: &mut GlobalState) {
        debug!(
            "RETARGET at block {}: difficulty {} -> {} wei (committed {} / expected {})",
            self.adjusted_at,
            global.current_difficulty_wei,
            self.current_difficulty_wei,
            global.total_wei_committed,
            global.total_wei_expected
        );
        global.total_wei_expected = self.total_wei_expected;
        global.current_difficulty_wei = self.current_difficulty_wei;
        global.total_wei_committed = U256::zero();
        global.last_difficulty_adjustment_external_block = self.adjusted_at;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ContractConfig, ETHER, SZABO};

    fn szabo(n: u64) -> U256 {
        U256::from(n * SZABO)
    }

    #[test]
    fn unchanged_when_demand_matches() {
        assert_eq!(next_expected_wei(szabo(100), szabo(100), szabo(100), 4), szabo(100));
    }

    #[test]
    fn scales_up_within_band() {
        assert_eq!(next_expected_wei(szabo(200), szabo(100), szabo(100), 4), szabo(200));
        assert_eq!(next_expected_wei(szabo(500), szabo(100), szabo(100), 4), szabo(400));
    }

    #[test]
    fn scales_down_within_band() {
        assert_eq!(next_expected_wei(szabo(150), szabo(200), szabo(100), 4), szabo(150));
        assert_eq!(next_expected_wei(szabo(200), szabo(1000), szabo(100), 4), szabo(250));
    }

    #[test]
    fn protocol_floor_applies_after_band() {
        assert_eq!(next_expected_wei(szabo(50), szabo(100), szabo(100), 4), szabo(100));
        // band would allow 50, floor lifts it
        assert_eq!(next_expected_wei(szabo(10), szabo(200), szabo(100), 4), szabo(100));
        // floor is independent of the band ceiling
        assert_eq!(next_expected_wei(szabo(100), szabo(10), szabo(100), 4), szabo(100));
    }

    #[test]
    fn compute_caps_growth_and_keeps_difficulty_above_floor() {
        let config = ContractConfig::default();
        let mut global = GlobalState::new(&config, 0);
        let period = U256::from(config.difficulty_adjustment_period);

        global.total_wei_expected = U256::from(ETHER) * period;
        global.total_wei_committed = U256::from(ETHER) * U256::from(100u64) * period;
        let up = Retarget::compute(&global, 100_801);
        assert_eq!(up.current_difficulty_wei, U256::from(ETHER) * U256::from(4u64));

        global.total_wei_committed = U256::zero();
        global.total_wei_expected = szabo(200) * period;
        let down = Retarget::compute(&global, 100_801);
        assert_eq!(down.current_difficulty_wei, config.minimum_difficulty_wei);
        assert_eq!(down.total_wei_expected, config.minimum_difficulty_wei * period);
    }

    #[test]
    fn apply_resets_period_accounting() {
        let config = ContractConfig::default();
        let mut global = GlobalState::new(&config, 0);
        global.total_wei_committed = szabo(500) * U256::from(2016u64);
        Retarget::compute(&global, 100_801).apply(&mut global);
        assert_eq!(global.total_wei_committed, U256::zero());
        assert_eq!(global.current_difficulty_wei, szabo(400));
        assert_eq!(global.last_difficulty_adjustment_external_block, 100_801);
    }
}
