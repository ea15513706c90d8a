// Copyright © Tessera Labs
// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

//! In-memory Merkle accumulator over an append-only transaction log.
//!
//! The accumulator is the binary hash tree of RFC 6962: SHA-256 with a
//! `0x00` prefix on leaf hashes and a `0x01` prefix on internal nodes, and
//! the split point of every subtree at the largest power of two below its
//! width. Because the log is append-only, the tree over any committed prefix
//! is itself well-defined, which is what makes prefix-consistency proofs
//! between two historical sizes possible.

mod hash;
mod proof;
mod tree;

pub use hash::{empty_tree_hash, leaf_hash, node_hash, NodeHash};
pub use proof::verify_consistency_proof;
pub use tree::{AccumulatorError, AccumulatorResult, MerkleAccumulator};
