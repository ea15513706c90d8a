// Copyright © Tessera Labs
// SPDX-License-Identifier: Apache-2.0

use crate::hash::{node_hash, NodeHash};

/// Verify a consistency proof produced by
/// [`MerkleAccumulator::consistency_proof`](crate::MerkleAccumulator::consistency_proof)
/// against the two prefix roots it connects (RFC 6962 §2.1.4.2).
///
/// `old_size == 0` always fails: no proof can cover the empty tree, and the
/// placeholder that catchup messages ship for that case is not a proof.
pub fn verify_consistency_proof(
    old_size: u64,
    old_root: &NodeHash,
    new_size: u64,
    new_root: &NodeHash,
    proof: &[NodeHash],
) -> bool {
    if old_size > new_size {
        return false;
    }
    if old_size == new_size {
        return proof.is_empty() && old_root == new_root;
    }
    if old_size == 0 {
        return false;
    }

    // When the old tree is a complete subtree its root is the implicit first
    // path element; otherwise the first element comes from the proof itself.
    let mut hashes = proof.iter();
    let (mut old_recomputed, mut new_recomputed) = if old_size.is_power_of_two() {
        (*old_root, *old_root)
    } else {
        match hashes.next() {
            Some(first) => (*first, *first),
            None => return false,
        }
    };

    let mut old_node = old_size - 1;
    let mut new_node = new_size - 1;
    while old_node & 1 == 1 {
        old_node >>= 1;
        new_node >>= 1;
    }

    for sibling in hashes {
        if new_node == 0 {
            return false;
        }
        if old_node & 1 == 1 || old_node == new_node {
            old_recomputed = node_hash(sibling, &old_recomputed);
            new_recomputed = node_hash(sibling, &new_recomputed);
            while old_node != 0 && old_node & 1 == 0 {
                old_node >>= 1;
                new_node >>= 1;
            }
        } else {
            new_recomputed = node_hash(&new_recomputed, sibling);
        }
        old_node >>= 1;
        new_node >>= 1;
    }

    old_recomputed == *old_root && new_recomputed == *new_root && new_node == 0
}
