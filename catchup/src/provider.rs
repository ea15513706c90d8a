// Copyright © Tessera Labs
// SPDX-License-Identifier: Apache-2.0

use crate::ledger::LedgerView;
use crate::splitter::CatchupRepSplitter;
use tessera_types::{
    CatchupMsg, LedgerId, LedgerStatus, PpSeqNo, SeqNo, Transaction, ViewNo,
    CURRENT_PROTOCOL_VERSION,
};

/// Capabilities the hosting node lends to the seeder.
///
/// Kept deliberately narrow: the seeder needs a way to put messages on the
/// wire, a hook to enrich outgoing transactions, and a lookup for the
/// consensus coordinates of a committed transaction. Everything else about
/// the node stays on the other side of this trait.
pub trait CatchupDataProvider: Send + Sync {
    /// Name of the hosting node, for diagnostics only.
    fn node_name(&self) -> String;

    /// Enqueue `msg` toward the named peer. When a splitter is supplied the
    /// transport may invoke it if the serialized message exceeds the wire
    /// limit; the transport also drives any further splitting of the halves.
    fn send_to(&self, msg: CatchupMsg, dest: &str, splitter: Option<CatchupRepSplitter>);

    /// Attach auxiliary data that is not part of the Merkle commitment.
    /// Must be pure: same input, same output.
    fn update_txn_with_extra_data(&self, txn: Transaction) -> Transaction;

    /// Consensus coordinates of the transaction committed at `seq_no`, if
    /// the node still knows them. Historical transactions ordered before the
    /// current view may have none.
    fn three_phase_key_for_txn_seq_no(
        &self,
        ledger_id: LedgerId,
        seq_no: SeqNo,
    ) -> Option<(ViewNo, PpSeqNo)>;
}

/// Our own current status for `ledger_id`, as sent back to peers that turn
/// out to be as up-to-date as we are.
pub fn build_ledger_status(
    ledger_id: LedgerId,
    ledger: &dyn LedgerView,
    provider: &dyn CatchupDataProvider,
) -> LedgerStatus {
    let tree = ledger.tree();
    let size = tree.num_leaves();
    let (view_no, pp_seq_no) = provider
        .three_phase_key_for_txn_seq_no(ledger_id, size)
        .unwrap_or((0, 0));
    LedgerStatus {
        ledger_id,
        txn_seq_no: size as i64,
        view_no,
        pp_seq_no,
        merkle_root: tree.root_hash().to_hex(),
        protocol_version: CURRENT_PROTOCOL_VERSION,
    }
}
