// Copyright © Tessera Labs
// SPDX-License-Identifier: Apache-2.0

use tessera_types::{CatchupReq, LedgerStatus, SeqNo};
use thiserror::Error;

/// Why an inbound message was refused. The `Display` text is the discard
/// reason that ends up in the warning log next to the peer identity.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RequestFault {
    #[error("it contains negative sequence number {0}")]
    NegativeSeqNo(i64),

    #[error("its start {start} is greater than its end {end}")]
    StartAfterEnd { start: SeqNo, end: SeqNo },

    #[error("its end {end} is greater than its catchup till {till}")]
    EndBeyondTarget { end: SeqNo, till: SeqNo },

    #[error("its catchup till {till} is greater than the ledger size {size}")]
    TargetBeyondLedger { till: SeqNo, size: SeqNo },
}

pub(crate) fn check_ledger_status(status: &LedgerStatus) -> Result<(), RequestFault> {
    if status.txn_seq_no < 0 {
        return Err(RequestFault::NegativeSeqNo(status.txn_seq_no));
    }
    Ok(())
}

pub(crate) fn check_catchup_req(req: &CatchupReq, ledger_size: SeqNo) -> Result<(), RequestFault> {
    if req.seq_no_start > req.seq_no_end {
        return Err(RequestFault::StartAfterEnd {
            start: req.seq_no_start,
            end: req.seq_no_end,
        });
    }
    if req.seq_no_end > req.catchup_till {
        return Err(RequestFault::EndBeyondTarget {
            end: req.seq_no_end,
            till: req.catchup_till,
        });
    }
    if req.catchup_till > ledger_size {
        return Err(RequestFault::TargetBeyondLedger {
            till: req.catchup_till,
            size: ledger_size,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use claims::{assert_err_eq, assert_ok};

    fn status(txn_seq_no: i64) -> LedgerStatus {
        LedgerStatus {
            ledger_id: 1,
            txn_seq_no,
            view_no: 0,
            pp_seq_no: 0,
            merkle_root: String::new(),
            protocol_version: 2,
        }
    }

    fn req(start: SeqNo, end: SeqNo, till: SeqNo) -> CatchupReq {
        CatchupReq {
            ledger_id: 1,
            seq_no_start: start,
            seq_no_end: end,
            catchup_till: till,
        }
    }

    #[test]
    fn status_seq_no_must_be_non_negative() {
        assert_ok!(check_ledger_status(&status(0)));
        assert_ok!(check_ledger_status(&status(42)));
        assert_err_eq!(
            check_ledger_status(&status(-1)),
            RequestFault::NegativeSeqNo(-1)
        );
    }

    #[test]
    fn catchup_req_window_must_be_ordered() {
        assert_ok!(check_catchup_req(&req(4, 6, 10), 10));
        assert_ok!(check_catchup_req(&req(5, 5, 10), 10));
        assert_err_eq!(
            check_catchup_req(&req(7, 5, 10), 10),
            RequestFault::StartAfterEnd { start: 7, end: 5 }
        );
        assert_err_eq!(
            check_catchup_req(&req(4, 11, 10), 12),
            RequestFault::EndBeyondTarget { end: 11, till: 10 }
        );
        assert_err_eq!(
            check_catchup_req(&req(1, 5, 12), 10),
            RequestFault::TargetBeyondLedger { till: 12, size: 10 }
        );
    }

    #[test]
    fn fault_display_reads_as_a_discard_reason() {
        let fault = RequestFault::TargetBeyondLedger { till: 12, size: 10 };
        assert_eq!(
            fault.to_string(),
            "its catchup till 12 is greater than the ledger size 10"
        );
    }
}
