use primitive_types::{U256, U512};

use super::error::{ContractError, ContractResult};

/// Number of halvings that have happened by reward index `index`.
pub fn halvings(index: u64, reward_adjustment_period: u64) -> u64 {
    index.saturating_sub(1) / reward_adjustment_period
}

/// Reward for index `index`: `initial_reward` shifted right once per halving.
pub fn base_reward(initial_reward: u64, index: u64, reward_adjustment_period: u64) -> u64 {
    let shift = halvings(index, reward_adjustment_period);
    u32::try_from(shift)
        .ok()
        .and_then(|shift| initial_reward.checked_shr(shift))
        .unwrap_or(0)
}

/// Dilute `base` for a window where `total_mining_wei` overshot its target.
pub fn proportional_reward(
    base: u64,
    target_difficulty_wei: U256,
    total_mining_wei: U256,
) -> ContractResult<u64> {
    if total_mining_wei.is_zero() || total_mining_wei < target_difficulty_wei {
        return Err(ContractError::InvalidProportion {
            target: target_difficulty_wei,
            total: total_mining_wei,
        });
    }
    let scaled =
        U512::from(base) * U512::from(target_difficulty_wei) / U512::from(total_mining_wei);
    // scaled <= base, so it always fits
    Ok(scaled.low_u64())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ETHER, SZABO, TOKEN_UNIT};

    const INITIAL: u64 = 100 * TOKEN_UNIT;
    const PERIOD: u64 = 210_000;

    #[test]
    fn halving_schedule() {
        assert_eq!(base_reward(INITIAL, 0, PERIOD), INITIAL);
        assert_eq!(base_reward(INITIAL, 1, PERIOD), INITIAL);
        assert_eq!(base_reward(INITIAL, PERIOD, PERIOD), INITIAL);
        assert_eq!(base_reward(INITIAL, PERIOD + 1, PERIOD), INITIAL / 2);
        assert_eq!(base_reward(INITIAL, 2 * PERIOD + 1, PERIOD), INITIAL / 4);
    }

    #[test]
    fn reward_runs_out_without_looping() {
        assert_eq!(base_reward(INITIAL, 64 * PERIOD + 1, PERIOD), 0);
        assert_eq!(base_reward(INITIAL, u64::MAX, 1), 0);
        assert_eq!(halvings(u64::MAX, 1), u64::MAX - 1);
    }

    #[test]
    fn proportional_dilution() {
        let target = U256::from(100 * SZABO);
        assert_eq!(proportional_reward(INITIAL, target, target).unwrap(), INITIAL);
        assert_eq!(
            proportional_reward(INITIAL, target, target * 2).unwrap(),
            INITIAL / 2
        );
        assert_eq!(
            proportional_reward(INITIAL, target, target * 4).unwrap(),
            INITIAL / 4
        );
        let big = U256::from(ETHER) * U256::from(400u64);
        assert_eq!(proportional_reward(INITIAL, big, big).unwrap(), INITIAL);
    }

    #[test]
    fn undersubscribed_window_is_rejected() {
        let target = U256::from(ETHER) * U256::from(400u64);
        let total = U256::from(ETHER) * U256::from(100u64);
        assert!(matches!(
            proportional_reward(INITIAL, target, total),
            Err(ContractError::InvalidProportion { .. })
        ));
        assert!(proportional_reward(INITIAL, U256::zero(), U256::zero()).is_err());
    }
}
