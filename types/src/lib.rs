// Copyright © Tessera Labs
// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

//! Core wire types for the Tessera ledger node: ledger identifiers, the
//! opaque committed transaction record, and the catchup message family
//! exchanged between lagging peers and the nodes that seed them.

mod messages;
mod transaction;

pub use messages::{CatchupMsg, CatchupRep, CatchupReq, ConsistencyProof, LedgerStatus};
pub use transaction::{
    LedgerId, PpSeqNo, SeqNo, Transaction, ViewNo, CONFIG_LEDGER_ID, CURRENT_PROTOCOL_VERSION,
    DOMAIN_LEDGER_ID, POOL_LEDGER_ID,
};
