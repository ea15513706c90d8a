// Copyright © Tessera Labs
// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

//! Seeder side of ledger catchup.
//!
//! A lagging peer (node or client) announces how much of a ledger it holds
//! via `LedgerStatus` and pulls missing transactions via `CatchupReq`. This
//! crate answers both: it proves to the peer that its prefix is consistent
//! with our current tree, and streams transaction ranges whose authenticity
//! the peer can check against the same target root. The requesting side, the
//! consensus state machine and the transport are external collaborators.

mod counters;
mod ledger;
mod provider;
mod seeder;
mod splitter;
mod validation;

pub use ledger::{LedgerError, LedgerView, MemoryLedger};
pub use provider::{build_ledger_status, CatchupDataProvider};
pub use seeder::SeederService;
pub use splitter::CatchupRepSplitter;
pub use validation::RequestFault;
