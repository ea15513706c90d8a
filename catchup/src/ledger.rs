// Copyright © Tessera Labs
// SPDX-License-Identifier: Apache-2.0

use parking_lot::RwLock;
use tessera_accumulator::MerkleAccumulator;
use tessera_types::{SeqNo, Transaction};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("sequence range [{start}, {end}] is outside the committed log of size {size}")]
    RangeOutOfBounds {
        start: SeqNo,
        end: SeqNo,
        size: SeqNo,
    },
}

/// Read-only view over one committed transaction log.
///
/// The seeder holds one of these per registered ledger and never writes
/// through it; committing is the ordering pipeline's business.
pub trait LedgerView: Send + Sync {
    /// Number of committed transactions (equals the highest `SeqNo`).
    fn size(&self) -> SeqNo;

    /// Committed transactions with sequence numbers in `[start, end]`,
    /// inclusive on both ends; requires `1 <= start <= end <= size()`.
    ///
    /// The returned batch is a stable snapshot: concurrent appends do not
    /// affect it.
    fn get_range(&self, start: SeqNo, end: SeqNo)
        -> Result<Vec<(SeqNo, Transaction)>, LedgerError>;

    /// Snapshot of the Merkle accumulator over the committed prefix. Proofs
    /// computed from the snapshot stay valid after further appends, since
    /// the log only grows.
    fn tree(&self) -> MerkleAccumulator;
}

/// In-memory committed log. Backs tests and small embeddings; a node with
/// durable storage provides its own [`LedgerView`] over the same contract.
#[derive(Default)]
pub struct MemoryLedger {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    txns: Vec<Transaction>,
    tree: MerkleAccumulator,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commit a transaction, returning its assigned 1-based sequence number.
    pub fn append(&self, txn: Transaction) -> SeqNo {
        let mut inner = self.inner.write();
        inner.tree.append_leaf(&txn.canonical_bytes());
        inner.txns.push(txn);
        inner.txns.len() as SeqNo
    }
}

impl LedgerView for MemoryLedger {
    fn size(&self) -> SeqNo {
        self.inner.read().txns.len() as SeqNo
    }

    fn get_range(
        &self,
        start: SeqNo,
        end: SeqNo,
    ) -> Result<Vec<(SeqNo, Transaction)>, LedgerError> {
        let inner = self.inner.read();
        let size = inner.txns.len() as SeqNo;
        if start == 0 || start > end || end > size {
            return Err(LedgerError::RangeOutOfBounds { start, end, size });
        }
        Ok((start..=end)
            .map(|seq_no| (seq_no, inner.txns[(seq_no - 1) as usize].clone()))
            .collect())
    }

    fn tree(&self) -> MerkleAccumulator {
        self.inner.read().tree.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claims::{assert_err, assert_ok};
    use serde_json::json;

    fn txn(i: u64) -> Transaction {
        Transaction::new(json!({ "seqNo": i }))
    }

    #[test]
    fn append_assigns_one_based_seq_nos() {
        let ledger = MemoryLedger::new();
        assert_eq!(ledger.append(txn(1)), 1);
        assert_eq!(ledger.append(txn(2)), 2);
        assert_eq!(ledger.size(), 2);
    }

    #[test]
    fn get_range_is_inclusive_and_ordered() {
        let ledger = MemoryLedger::new();
        for i in 1..=5 {
            ledger.append(txn(i));
        }
        let range = assert_ok!(ledger.get_range(2, 4));
        assert_eq!(
            range.iter().map(|(s, _)| *s).collect::<Vec<_>>(),
            vec![2, 3, 4]
        );
        assert_eq!(range[0].1, txn(2));
    }

    #[test]
    fn get_range_rejects_out_of_contract_windows() {
        let ledger = MemoryLedger::new();
        for i in 1..=3 {
            ledger.append(txn(i));
        }
        assert_err!(ledger.get_range(0, 2));
        assert_err!(ledger.get_range(3, 2));
        assert_err!(ledger.get_range(2, 4));
    }

    #[test]
    fn tree_snapshot_is_stable_across_appends() {
        let ledger = MemoryLedger::new();
        for i in 1..=4 {
            ledger.append(txn(i));
        }
        let snapshot = ledger.tree();
        let root_before = snapshot.root_hash();
        ledger.append(txn(5));
        assert_eq!(snapshot.num_leaves(), 4);
        assert_eq!(snapshot.root_hash(), root_before);
        assert_ne!(ledger.tree().root_hash(), root_before);
    }

    #[test]
    fn tree_tracks_committed_transactions() {
        let ledger = MemoryLedger::new();
        ledger.append(txn(1));
        let mut expected = MerkleAccumulator::new();
        expected.append_leaf(&txn(1).canonical_bytes());
        assert_eq!(ledger.tree().root_hash(), expected.root_hash());
    }
}
