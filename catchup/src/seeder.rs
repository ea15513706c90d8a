// Copyright © Tessera Labs
// SPDX-License-Identifier: Apache-2.0

use crate::counters;
use crate::ledger::LedgerView;
use crate::provider::{build_ledger_status, CatchupDataProvider};
use crate::splitter::CatchupRepSplitter;
use crate::validation;
use futures::StreamExt;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use tessera_accumulator::{AccumulatorResult, MerkleAccumulator, NodeHash};
use tessera_types::{
    CatchupMsg, CatchupRep, CatchupReq, ConsistencyProof, LedgerId, LedgerStatus, SeqNo,
};
use tracing::{debug, info, warn};

/// Serves catchup data to lagging peers.
///
/// One instance is created at node boot, bound to the node's ledgers via
/// [`register_ledger`](Self::register_ledger), and fed inbound messages by
/// the transport. Handlers run to completion one at a time and keep no state
/// across messages; every answer is computed from a snapshot of the ledger
/// taken at handler entry.
///
/// The client-facing deployment echoes our own `LedgerStatus` back to peers
/// that are already caught up (a confirming witness toward their quorum);
/// the node-facing deployment stays silent in that case. The two differ by
/// nothing but that flag.
pub struct SeederService {
    provider: Arc<dyn CatchupDataProvider>,
    ledgers: HashMap<LedgerId, Arc<dyn LedgerView>>,
    echo_ledger_status_if_up_to_date: bool,
}

impl SeederService {
    pub fn new(
        provider: Arc<dyn CatchupDataProvider>,
        echo_ledger_status_if_up_to_date: bool,
    ) -> Self {
        SeederService {
            provider,
            ledgers: HashMap::new(),
            echo_ledger_status_if_up_to_date,
        }
    }

    /// Seeder for client-facing deployments: confirms peers that are already
    /// caught up.
    pub fn client_seeder(provider: Arc<dyn CatchupDataProvider>) -> Self {
        Self::new(provider, true)
    }

    /// Seeder for node-to-node deployments: silent toward caught-up peers.
    pub fn node_seeder(provider: Arc<dyn CatchupDataProvider>) -> Self {
        Self::new(provider, false)
    }

    pub fn register_ledger(&mut self, ledger_id: LedgerId, ledger: Arc<dyn LedgerView>) {
        self.ledgers.insert(ledger_id, ledger);
    }

    /// Cooperative dispatch loop: one message at a time, each handler run to
    /// completion, responses emitted in processing order.
    pub async fn start(
        self,
        mut network_rx: futures::channel::mpsc::Receiver<(String, CatchupMsg)>,
    ) {
        while let Some((sender, msg)) = network_rx.next().await {
            self.handle_message(msg, &sender);
        }
        debug!(node = %self.provider.node_name(), "seeder input channel closed, stopping");
    }

    pub fn handle_message(&self, msg: CatchupMsg, sender: &str) {
        match msg {
            CatchupMsg::LedgerStatus(status) => self.process_ledger_status(status, sender),
            CatchupMsg::CatchupReq(req) => self.process_catchup_req(req, sender),
            // Replies and proofs are input to the requesting side, not to us.
            other => debug!(
                node = %self.provider.node_name(),
                from = %sender,
                message = ?other,
                "ignoring catchup message not addressed to the seeder"
            ),
        }
    }

    pub fn process_ledger_status(&self, status: LedgerStatus, sender: &str) {
        counters::RECEIVED_MESSAGE_COUNT
            .with_label_values(&["LEDGER_STATUS"])
            .inc();
        info!(
            node = %self.provider.node_name(),
            from = %sender,
            status = ?status,
            "received ledger status"
        );

        let Some(ledger) = self.ledgers.get(&status.ledger_id) else {
            self.discard(sender, &status, "it references invalid ledger");
            return;
        };
        if let Err(fault) = validation::check_ledger_status(&status) {
            self.discard(sender, &status, fault);
            return;
        }

        let tree = ledger.tree();
        let size = tree.num_leaves();
        if status.txn_seq_no as SeqNo >= size {
            if self.echo_ledger_status_if_up_to_date {
                let own_status = build_ledger_status(
                    status.ledger_id,
                    ledger.as_ref(),
                    self.provider.as_ref(),
                );
                self.send(CatchupMsg::LedgerStatus(own_status), sender, None);
            }
            return;
        }

        let start = status.txn_seq_no as SeqNo;
        match self.build_consistency_proof(status.ledger_id, &tree, start, size) {
            Ok(proof) => {
                info!(
                    node = %self.provider.node_name(),
                    to = %sender,
                    proof = ?proof,
                    "sending consistency proof"
                );
                self.send(CatchupMsg::ConsistencyProof(proof), sender, None);
            }
            Err(error) => self.discard(sender, &status, error),
        }
    }

    pub fn process_catchup_req(&self, req: CatchupReq, sender: &str) {
        counters::RECEIVED_MESSAGE_COUNT
            .with_label_values(&["CATCHUP_REQ"])
            .inc();
        info!(
            node = %self.provider.node_name(),
            from = %sender,
            req = ?req,
            "received catchup request"
        );

        let Some(ledger) = self.ledgers.get(&req.ledger_id) else {
            self.discard(sender, &req, "it references invalid ledger");
            return;
        };
        let tree = ledger.tree();
        if let Err(fault) = validation::check_catchup_req(&req, tree.num_leaves()) {
            self.discard(sender, &req, fault);
            return;
        }

        let cons_proof = match tree.consistency_proof(req.seq_no_end, req.catchup_till) {
            Ok(proof) => proof.iter().map(NodeHash::to_hex).collect(),
            Err(error) => {
                self.discard(sender, &req, error);
                return;
            }
        };

        let range = match ledger.get_range(req.seq_no_start, req.seq_no_end) {
            Ok(range) => range,
            Err(error) => {
                self.discard(sender, &req, error);
                return;
            }
        };
        let txns: BTreeMap<_, _> = range
            .into_iter()
            .map(|(seq_no, txn)| (seq_no, self.provider.update_txn_with_extra_data(txn)))
            .collect();

        let rep = CatchupRep {
            ledger_id: req.ledger_id,
            txns,
            cons_proof,
        };
        let splitter = CatchupRepSplitter::new(tree, req.catchup_till);
        self.send(CatchupMsg::CatchupRep(rep), sender, Some(splitter));
    }

    // Proof that the size-`start` tree is a prefix of the size-`end` tree,
    // in wire form. A peer with no data (`start == 0`) cannot be given a
    // real proof; it gets the current root as a single placeholder element
    // so it can still bind the reply to our view of history.
    fn build_consistency_proof(
        &self,
        ledger_id: LedgerId,
        tree: &MerkleAccumulator,
        start: SeqNo,
        end: SeqNo,
    ) -> AccumulatorResult<ConsistencyProof> {
        let old_root = tree.prefix_root_hash(start)?;
        let proof = if start == 0 {
            vec![old_root]
        } else {
            tree.consistency_proof(start, end)?
        };
        let new_root = tree.prefix_root_hash(end)?;
        let (view_no, pp_seq_no) = self
            .provider
            .three_phase_key_for_txn_seq_no(ledger_id, end)
            .unwrap_or((0, 0));
        Ok(ConsistencyProof {
            ledger_id,
            seq_no_start: start,
            seq_no_end: end,
            view_no,
            pp_seq_no,
            old_merkle_root: old_root.to_hex(),
            new_merkle_root: new_root.to_hex(),
            hashes: proof.iter().map(NodeHash::to_hex).collect(),
        })
    }

    fn send(&self, msg: CatchupMsg, dest: &str, splitter: Option<CatchupRepSplitter>) {
        let op = match &msg {
            CatchupMsg::LedgerStatus(_) => "LEDGER_STATUS",
            CatchupMsg::CatchupReq(_) => "CATCHUP_REQ",
            CatchupMsg::CatchupRep(_) => "CATCHUP_REP",
            CatchupMsg::ConsistencyProof(_) => "CONSISTENCY_PROOF",
        };
        counters::SENT_MESSAGE_COUNT.with_label_values(&[op]).inc();
        self.provider.send_to(msg, dest, splitter);
    }

    fn discard(&self, sender: &str, message: &dyn fmt::Debug, reason: impl fmt::Display) {
        counters::DISCARDED_MESSAGE_COUNT.inc();
        warn!(
            node = %self.provider.node_name(),
            from = %sender,
            message = ?message,
            %reason,
            "discarding message"
        );
    }
}
