use primitive_types::U256;
use serde::Serialize;

use crate::wallet::Address;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ContractEvent {
    MiningAttempt {
        from: Address,
        value: U256,
        window: u64,
        total_mined_wei: U256,
        target_difficulty_wei: U256,
    },
    BlockClaimed {
        from: Address,
        credit_to: Address,
        reward: u64,
        window: u64,
    },
    Transfer {
        from: Address,
        to: Address,
        value: u64,
    },
    Transmuted {
        who: Address,
        base_contract: Address,
        transmuted_contract: Address,
        source_quantity: u64,
        dest_quantity: u64,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct LoggedEvent {
    pub seq: u64,
    pub external_block: u64,
    #[serde(flatten)]
    pub event: ContractEvent,
}

/// Append-only public log of everything the contract emitted.
#[derive(Debug, Default)]
pub struct EventLog {
    entries: Vec<LoggedEvent>,
}

impl EventLog {
    pub fn emit(&mut self, external_block: u64, event: ContractEvent) {
        let seq = self.entries.len() as u64;
        self.entries.push(LoggedEvent {
            seq,
            external_block,
            event,
        });
    }

    /// Entries with `seq >= from`.
    pub fn since(&self, from: u64) -> &[LoggedEvent] {
        let start = usize::try_from(from).unwrap_or(usize::MAX).min(self.entries.len());
        &self.entries[start..]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&ContractEvent> {
        self.entries.last().map(|e| &e.event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transfer(value: u64) -> ContractEvent {
        ContractEvent::Transfer {
            from: Address::from("a"),
            to: Address::from("b"),
            value,
        }
    }

    #[test]
    fn entries_are_sequenced() {
        let mut log = EventLog::default();
        log.emit(5, transfer(1));
        log.emit(6, transfer(2));
        assert_eq!(log.len(), 2);
        assert_eq!(log.since(1)[0].seq, 1);
        assert_eq!(log.since(1)[0].external_block, 6);
        assert!(log.since(10).is_empty());
        assert_eq!(log.last(), Some(&transfer(2)));
    }

    #[test]
    fn serializes_with_event_tag() {
        let mut log = EventLog::default();
        log.emit(1, transfer(9));
        let json = serde_json::to_value(&log.since(0)[0]).unwrap();
        assert_eq!(json["event"], "transfer");
        assert_eq!(json["value"], 9);
        assert_eq!(json["seq"], 0);
    }
}
