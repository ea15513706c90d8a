// Copyright © Tessera Labs
// SPDX-License-Identifier: Apache-2.0

use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

const LEAF_PREFIX: u8 = 0x00;
const NODE_PREFIX: u8 = 0x01;

/// A node of the Merkle accumulator: a fixed-width SHA-256 digest.
///
/// Rendered as lowercase hex everywhere it crosses a wire or a log line.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeHash([u8; 32]);

impl NodeHash {
    pub const LENGTH: usize = 32;

    pub const fn new(bytes: [u8; 32]) -> Self {
        NodeHash(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes: [u8; 32] = hex::FromHex::from_hex(s)?;
        Ok(NodeHash(bytes))
    }
}

impl fmt::Display for NodeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for NodeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeHash({})", self.to_hex())
    }
}

impl AsRef<[u8]> for NodeHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for NodeHash {
    fn from(bytes: [u8; 32]) -> Self {
        NodeHash(bytes)
    }
}

impl FromStr for NodeHash {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeHash::from_hex(s)
    }
}

fn finalize(hasher: Sha256) -> NodeHash {
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    NodeHash(out)
}

/// Hash of a leaf record. The `0x00` domain separator keeps leaf hashes
/// disjoint from internal node hashes, closing the second-preimage hole.
pub fn leaf_hash(data: &[u8]) -> NodeHash {
    let mut hasher = Sha256::new();
    hasher.update([LEAF_PREFIX]);
    hasher.update(data);
    finalize(hasher)
}

/// Hash of an internal node over two children, `0x01`-prefixed.
pub fn node_hash(left: &NodeHash, right: &NodeHash) -> NodeHash {
    let mut hasher = Sha256::new();
    hasher.update([NODE_PREFIX]);
    hasher.update(left.as_bytes());
    hasher.update(right.as_bytes());
    finalize(hasher)
}

/// Root of the empty tree: SHA-256 of the empty string.
pub fn empty_tree_hash() -> NodeHash {
    finalize(Sha256::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tree_hash_is_sha256_of_nothing() {
        assert_eq!(
            empty_tree_hash().to_hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn leaf_hash_of_empty_input_matches_known_vector() {
        // SHA-256 of the single prefix byte 0x00.
        assert_eq!(
            leaf_hash(b"").to_hex(),
            "6e340b9cffb37a989ca544e6bb780a2c78901d3fb33738768511a30617afa01d"
        );
    }

    #[test]
    fn leaf_and_node_domains_are_disjoint() {
        let a = leaf_hash(b"a");
        let b = leaf_hash(b"b");
        let mut concatenated = Vec::new();
        concatenated.extend_from_slice(a.as_bytes());
        concatenated.extend_from_slice(b.as_bytes());
        assert_ne!(node_hash(&a, &b), leaf_hash(&concatenated));
    }

    #[test]
    fn hex_round_trip() {
        let h = leaf_hash(b"round trip");
        let parsed: NodeHash = h.to_hex().parse().unwrap();
        assert_eq!(parsed, h);
        assert!(h.to_hex().chars().all(|c| !c.is_ascii_uppercase()));
    }
}
