//! Keyspace lottery allocation.
//!
//! Every window owns the keyspace `[0, U256::MAX)`. An attempt's share of it
//! is its burned value over the window's effective difficulty; the drawn
//! value picks the single slice that wins.

use primitive_types::{U256, U512};

use super::error::{ContractError, ContractResult};
use super::state::{MiningAttempt, MiningWindow};

/// Upper (exclusive) bound of the keyspace.
pub const KEYSPACE_MAX: U256 = U256::MAX;

pub fn effective_difficulty(target_difficulty_wei: U256, prior_committed_wei: U256) -> U256 {
    prior_committed_wei.max(target_difficulty_wei)
}

/// Size of the keyspace slice bought by `attempt_value_wei`.
pub fn allocate(
    target_difficulty_wei: U256,
    prior_committed_wei: U256,
    attempt_value_wei: U256,
) -> ContractResult<U256> {
    let effective = effective_difficulty(target_difficulty_wei, prior_committed_wei);
    if effective.is_zero() {
        return Err(ContractError::DivideByZero);
    }
    let share = attempt_value_wei.min(effective);
    let scaled = U512::from(share) * U512::from(KEYSPACE_MAX) / U512::from(effective);
    Ok(narrow_saturating(scaled))
}

pub fn range(offset: U256, size: U256) -> ContractResult<(U256, U256)> {
    offset
        .checked_add(size)
        .map(|end| (offset, end))
        .ok_or(ContractError::ArithmeticOverflow)
}

/// Draw value in `[0, KEYSPACE_MAX)` derived from a host block hash.
pub fn winning_value(block_hash: &[u8; 32]) -> U256 {
    U256::from_big_endian(block_hash) % KEYSPACE_MAX
}

/// Keyspace slice of `attempt`, resolved against the final totals of its
/// window. Slices of one window never overlap.
pub fn settled_slice(window: &MiningWindow, attempt: &MiningAttempt) -> ContractResult<(U256, U256)> {
    let target = window.target_difficulty_wei;
    let total = window.total_mining_wei;
    let start = allocate(target, total, attempt.keyspace_offset)?;
    let size = allocate(target, total, attempt.value)?;
    range(start, size)
}

pub fn in_slice(draw: U256, (start, end): (U256, U256)) -> bool {
    start <= draw && draw < end
}

fn narrow_saturating(value: U512) -> U256 {
    let mut bytes = [0u8; 64];
    value.to_big_endian(&mut bytes);
    if bytes[..32].iter().any(|b| *b != 0) {
        return KEYSPACE_MAX;
    }
    U256::from_big_endian(&bytes[32..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ETHER, SZABO};

    fn t() -> U256 {
        U256::from(100 * SZABO)
    }

    fn window(target: U256, values: &[U256]) -> (MiningWindow, Vec<MiningAttempt>) {
        let mut w = MiningWindow::new(target);
        let attempts = values
            .iter()
            .map(|v| {
                let attempt = MiningAttempt {
                    keyspace_offset: w.current_attempt_offset,
                    value: *v,
                };
                w.record(*v).unwrap();
                attempt
            })
            .collect();
        (w, attempts)
    }

    #[test]
    fn matching_target_alone_takes_whole_keyspace() {
        assert_eq!(allocate(t(), U256::zero(), t()).unwrap(), KEYSPACE_MAX);
    }

    #[test]
    fn zero_attempt_gets_nothing() {
        assert_eq!(allocate(t(), U256::zero(), U256::zero()).unwrap(), U256::zero());
        assert_eq!(allocate(t(), t(), U256::zero()).unwrap(), U256::zero());
    }

    #[test]
    fn oversized_attempt_is_capped() {
        let huge = U256::from(ETHER) * U256::from(100u64);
        assert_eq!(allocate(t(), U256::zero(), huge).unwrap(), KEYSPACE_MAX);
        let ten_million_ether = U256::from(ETHER) * U256::from(10_000_000u64);
        assert_eq!(
            allocate(t(), ten_million_ether, ten_million_ether).unwrap(),
            KEYSPACE_MAX
        );
    }

    #[test]
    fn shares_follow_effective_difficulty() {
        let half = KEYSPACE_MAX / 2;
        assert_eq!(allocate(t(), t(), t() / 2).unwrap(), half);
        assert_eq!(allocate(t(), t() * 2, t()).unwrap(), half);
        assert_eq!(allocate(t(), t() / 4, t() / 4).unwrap(), KEYSPACE_MAX / 4);
    }

    #[test]
    fn tiny_share_of_huge_difficulty() {
        let target = U256::from(ETHER) * U256::from(100_000_000u64);
        let slice = allocate(target, U256::zero(), t()).unwrap();
        assert_eq!(slice, KEYSPACE_MAX / U256::from(1_000_000_000_000u64));
    }

    #[test]
    fn zero_difficulty_fails() {
        assert_eq!(
            allocate(U256::zero(), U256::zero(), t()),
            Err(ContractError::DivideByZero)
        );
    }

    #[test]
    fn range_search() {
        let x = t();
        assert_eq!(range(x, x).unwrap(), (x, x * 2));
        assert_eq!(range(U256::zero(), U256::zero()).unwrap(), (U256::zero(), U256::zero()));
        assert_eq!(range(KEYSPACE_MAX, U256::one()), Err(ContractError::ArithmeticOverflow));
    }

    #[test]
    fn draw_never_reaches_keyspace_end() {
        assert_eq!(winning_value(&[0xff; 32]), U256::zero());
        assert_eq!(winning_value(&[0u8; 32]), U256::zero());
        let mut one = [0u8; 32];
        one[31] = 1;
        assert_eq!(winning_value(&one), U256::one());
    }

    #[test]
    fn settled_slices_never_overlap() {
        let (w, attempts) = window(t(), &[t(), t(), t() * 2]);
        let slices: Vec<_> = attempts
            .iter()
            .map(|a| settled_slice(&w, a).unwrap())
            .collect();
        assert_eq!(slices[0], (U256::zero(), KEYSPACE_MAX / 4));
        assert_eq!(slices[1].0, KEYSPACE_MAX / 4);
        // floors can leave a one-unit gap, never an overlap
        assert!(slices[0].1 <= slices[1].0);
        assert!(slices[1].1 <= slices[2].0);
        assert_eq!(slices[2].0, KEYSPACE_MAX / 2);
        assert!(slices[2].1 <= KEYSPACE_MAX);
    }

    #[test]
    fn undersubscribed_window_leaves_tail_unowned() {
        let (w, attempts) = window(t(), &[t() / 4, t() / 4]);
        let last = settled_slice(&w, &attempts[1]).unwrap();
        assert_eq!(last.0, KEYSPACE_MAX / 4);
        assert!(last.1 <= KEYSPACE_MAX / 2);
        assert!(!in_slice(KEYSPACE_MAX - U256::one(), last));
    }

    #[test]
    fn sole_full_attempt_always_wins() {
        let (w, attempts) = window(t(), &[t()]);
        let slice = settled_slice(&w, &attempts[0]).unwrap();
        assert!(in_slice(winning_value(&[0xff; 32]), slice));
        let mut high = [0xff; 32];
        high[31] = 0xfe;
        assert!(in_slice(winning_value(&high), slice));
    }
}
