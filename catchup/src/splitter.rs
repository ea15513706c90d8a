// Copyright © Tessera Labs
// SPDX-License-Identifier: Apache-2.0

use crate::counters;
use tessera_accumulator::{MerkleAccumulator, NodeHash};
use tessera_types::{CatchupRep, SeqNo};
use tracing::warn;

/// Splits a [`CatchupRep`] the transport cannot fit on the wire.
///
/// The split halves the ordered transaction batch and regenerates, for each
/// half, a consistency proof from that half's last sequence number to the
/// catchup target the requester already committed to, so either half
/// verifies on its own. The transport drives recursion by splitting the
/// halves again if they are still too large.
///
/// The splitter captures the accumulator snapshot taken when the reply was
/// built; appends since then cannot invalidate its proofs.
pub struct CatchupRepSplitter {
    tree: MerkleAccumulator,
    catchup_till: SeqNo,
}

impl std::fmt::Debug for CatchupRepSplitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatchupRepSplitter")
            .field("num_leaves", &self.tree.num_leaves())
            .field("catchup_till", &self.catchup_till)
            .finish()
    }
}

impl CatchupRepSplitter {
    pub(crate) fn new(tree: MerkleAccumulator, catchup_till: SeqNo) -> Self {
        CatchupRepSplitter { tree, catchup_till }
    }

    /// One split step. `None` means the reply cannot be halved (fewer than
    /// two transactions); the transport must abandon the response.
    pub fn split(&self, rep: &CatchupRep) -> Option<(CatchupRep, CatchupRep)> {
        if rep.txn_count() < 2 {
            counters::CATCHUP_REP_SPLIT_FAILURE_COUNT.inc();
            warn!(
                txn_count = rep.txn_count(),
                message = ?rep,
                "catchup reply does not hold enough transactions to split"
            );
            return None;
        }

        let txns: Vec<_> = rep.txns.iter().collect();
        let divider = txns.len() / 2;
        let (left, right) = txns.split_at(divider);
        let left_last_seq_no = *left.last()?.0;
        let right_last_seq_no = *right.last()?.0;

        let left_proof = self.consistency_proof_to_target(left_last_seq_no)?;
        let right_proof = self.consistency_proof_to_target(right_last_seq_no)?;

        counters::CATCHUP_REP_SPLIT_COUNT.inc();
        let half = |txns: &[(&SeqNo, &tessera_types::Transaction)], cons_proof| CatchupRep {
            ledger_id: rep.ledger_id,
            txns: txns.iter().map(|(s, t)| (**s, (*t).clone())).collect(),
            cons_proof,
        };
        Some((half(left, left_proof), half(right, right_proof)))
    }

    fn consistency_proof_to_target(&self, from: SeqNo) -> Option<Vec<String>> {
        match self.tree.consistency_proof(from, self.catchup_till) {
            Ok(proof) => Some(proof.iter().map(NodeHash::to_hex).collect()),
            Err(error) => {
                // The reply was built against this same snapshot, so the
                // sequence numbers cannot be out of range; refuse the split
                // rather than ship an unverifiable half.
                warn!(%error, from, catchup_till = self.catchup_till,
                    "failed to rebuild consistency proof while splitting");
                None
            }
        }
    }
}
