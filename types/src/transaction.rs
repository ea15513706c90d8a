// Copyright © Tessera Labs
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Selects one of the node's append-only logs. Each ledger carries its own
/// Merkle tree and its own committed sequence numbering.
pub type LedgerId = u32;

/// 1-based index of a committed transaction within a single ledger. `0` is
/// reserved to mean "empty prefix" in catchup messages.
pub type SeqNo = u64;

/// Consensus view in which a transaction was ordered.
pub type ViewNo = u64;

/// Pre-prepare sequence number within a view.
pub type PpSeqNo = u64;

pub const POOL_LEDGER_ID: LedgerId = 0;
pub const DOMAIN_LEDGER_ID: LedgerId = 1;
pub const CONFIG_LEDGER_ID: LedgerId = 2;

/// Protocol version advertised in `LedgerStatus` messages.
pub const CURRENT_PROTOCOL_VERSION: u16 = 2;

/// An opaque committed transaction record.
///
/// The catchup machinery never interprets the contents; it stores, hashes and
/// ships the record as-is. Auxiliary fields that are not part of the Merkle
/// commitment may be attached by the host node before a record goes out on
/// the wire (see `CatchupDataProvider::update_txn_with_extra_data`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transaction(Value);

impl Transaction {
    pub fn new(payload: Value) -> Self {
        Transaction(payload)
    }

    pub fn payload(&self) -> &Value {
        &self.0
    }

    /// Mutable access for decorators attaching data outside the Merkle
    /// commitment.
    pub fn payload_mut(&mut self) -> &mut Value {
        &mut self.0
    }

    pub fn into_payload(self) -> Value {
        self.0
    }

    /// The byte string committed to the ledger's Merkle tree for this record.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(&self.0).expect("serializing an in-memory JSON value cannot fail")
    }
}

impl From<Value> for Transaction {
    fn from(payload: Value) -> Self {
        Transaction(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn canonical_bytes_round_trip() {
        let txn = Transaction::new(json!({"type": "NYM", "dest": "abc"}));
        let parsed: Value = serde_json::from_slice(&txn.canonical_bytes()).unwrap();
        assert_eq!(&parsed, txn.payload());
    }

    #[test]
    fn transparent_serde() {
        let txn = Transaction::new(json!({"k": 1}));
        let wire = serde_json::to_string(&txn).unwrap();
        assert_eq!(wire, r#"{"k":1}"#);
        let back: Transaction = serde_json::from_str(&wire).unwrap();
        assert_eq!(back, txn);
    }
}
