//! Bounded transaction log kept for auditing.
//!
//! Retired contracts disappear from the market's active table but their
//! transaction rows stay here, capped to the most recent entries.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use outpost_types::Transaction;

/// Maximum rows retained.
pub const TRANSACTION_LOG_CAP: usize = 1_000;

/// A bounded, append-only view of recent transactions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionLog {
    entries: VecDeque<Transaction>,
    cap: usize,
}

impl Default for TransactionLog {
    fn default() -> Self {
        Self::new(TRANSACTION_LOG_CAP)
    }
}

impl TransactionLog {
    /// Create a log bounded to `cap` rows.
    pub const fn new(cap: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            cap,
        }
    }

    /// Append a row, evicting the oldest when full.
    pub fn push(&mut self, row: Transaction) {
        if self.entries.len() >= self.cap {
            self.entries.pop_front();
        }
        self.entries.push_back(row);
    }

    /// Number of retained rows.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate rows oldest-first.
    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.entries.iter()
    }

    /// Drop every row.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use outpost_types::{Commodity, ContractId, CorpId};
    use rust_decimal::Decimal;

    use super::*;

    fn row(n: u64) -> Transaction {
        Transaction {
            tick: n,
            contract: ContractId(n),
            seller: CorpId::from("s"),
            buyer: CorpId::from("b"),
            commodity: Commodity::Energy,
            quantity: 1,
            price_per_unit: Decimal::ONE,
        }
    }

    #[test]
    fn log_is_bounded() {
        let mut log = TransactionLog::new(3);
        for n in 0..5 {
            log.push(row(n));
        }
        assert_eq!(log.len(), 3);
        let ticks: Vec<u64> = log.iter().map(|t| t.tick).collect();
        assert_eq!(ticks, vec![2, 3, 4]);
    }
}
