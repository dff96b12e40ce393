//! Burn-here, credit-there conversion into cooperating contracts.

use log::info;
use std::collections::HashMap;
use std::fmt;

use crate::wallet::Address;

/// Four-byte capability identifier a target advertises.
pub type InterfaceId = [u8; 4];

/// Capability a target must declare before anything is debited.
pub const TRANSMUTABLE_INTERFACE: InterfaceId = *b"TRMU";

/// Why a target refused a credit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransmuteRejection(pub String);

impl fmt::Display for TransmuteRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A contract that can receive transmuted balances.
pub trait TransmuteTarget {
    /// Capability introspection, checked before the source is debited.
    fn supports_interface(&self, interface: InterfaceId) -> bool;

    /// Credit `who` for `quantity` units burned at `source`; returns the
    /// quantity credited on this side.
    fn transmuted(
        &mut self,
        source: &Address,
        who: &Address,
        quantity: u64,
    ) -> Result<u64, TransmuteRejection>;
}

/// In-process target hosted by the service: credits holders at a fixed rate.
#[derive(Debug, Default)]
pub struct Reserve {
    rate: u64,
    holdings: HashMap<Address, u64>,
    total: u64,
}

impl Reserve {
    pub fn new(rate: u64) -> Self {
        Self {
            rate,
            holdings: HashMap::new(),
            total: 0,
        }
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn holding_of(&self, who: &Address) -> u64 {
        self.holdings.get(who).copied().unwrap_or(0)
    }
}

impl TransmuteTarget for Reserve {
    fn supports_interface(&self, interface: InterfaceId) -> bool {
        interface == TRANSMUTABLE_INTERFACE
    }

    fn transmuted(
        &mut self,
        source: &Address,
        who: &Address,
        quantity: u64,
    ) -> Result<u64, TransmuteRejection> {
        let credited = quantity
            .checked_mul(self.rate)
            .ok_or_else(|| TransmuteRejection("credit overflows".into()))?;
        let total = self
            .total
            .checked_add(credited)
            .ok_or_else(|| TransmuteRejection("reserve total overflows".into()))?;
        let holding = self.holding_of(who);
        let holding = holding
            .checked_add(credited)
            .ok_or_else(|| TransmuteRejection("holding overflows".into()))?;
        self.holdings.insert(who.clone(), holding);
        self.total = total;
        info!("RESERVE - credited {credited} to {who} for {quantity} burned at {source}");
        Ok(credited)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserve_declares_capability() {
        let reserve = Reserve::new(1);
        assert!(reserve.supports_interface(TRANSMUTABLE_INTERFACE));
        assert!(!reserve.supports_interface(*b"ERC2"));
    }

    #[test]
    fn reserve_credits_at_rate() {
        let mut reserve = Reserve::new(3);
        let who = Address::from("who");
        assert_eq!(reserve.transmuted(&Address::from("src"), &who, 5).unwrap(), 15);
        assert_eq!(reserve.holding_of(&who), 15);
        assert_eq!(reserve.total(), 15);
    }

    #[test]
    fn reserve_rejects_overflow_without_crediting() {
        let mut reserve = Reserve::new(2);
        let who = Address::from("who");
        assert!(reserve.transmuted(&Address::from("src"), &who, u64::MAX).is_err());
        assert_eq!(reserve.total(), 0);
    }
}
