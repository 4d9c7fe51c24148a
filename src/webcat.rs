//! Sidecar verifier for a sparse-Merkle (Jellyfish-style) construction.
//!
//! Rebuilds a sparse-Merkle root directly from a supplied, fully-materialized
//! `(key, value)` leaf set using bitwise key-hash steering and a fixed
//! placeholder for empty subtrees, then chains through the generic
//! existence verifier to a top-level application hash (spec.md §4.8).

use serde::{Deserialize, Serialize};

use crate::error::{VerifyError, VerifyResult};
use crate::existence::verify_existence;
use crate::hash::{do_hash, HashOp};
use crate::ops::apply_leaf;
use crate::proof::CommitmentProof;
use crate::spec::webcat_spec;

/// A raw leaf as supplied to the sidecar: a UTF-8 key (possibly carrying a
/// `"canonical/"` prefix) and its value, hex-encoded on the wire the way
/// the rest of this crate's test fixtures encode digests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebcatLeafInput {
    pub key: String,
    pub value_hex: String,
}

/// A leaf normalized (hex-decoded) after a successful verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebcatLeaf {
    pub key: String,
    pub value: Vec<u8>,
}

/// The full sidecar input: the leaf set to rebuild the canonical root from,
/// the canonical root hash the producer claims, the application root to
/// chain to, and the existence-proof chain linking the two.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebcatProofData {
    pub leaves: Vec<WebcatLeafInput>,
    pub canonical_root_hash_hex: String,
    pub app_hash: Vec<u8>,
    /// Already-decoded proof chain; the last element must be an existence
    /// proof for `("canonical", canonical_root_hash)` against `app_hash`.
    pub proof_bytes: Vec<CommitmentProof>,
}

const PLACEHOLDER_PREIMAGE: &[u8] = b"SPARSE_MERKLE_PLACEHOLDER_HASH__";
const INNER_PREFIX: &[u8] = b"JMT::InternalNode";

fn placeholder_hash() -> VerifyResult<Vec<u8>> {
    do_hash(HashOp::Sha256, PLACEHOLDER_PREIMAGE)
}

fn canonicalize_key(key: &str) -> &str {
    key.strip_prefix("canonical/").unwrap_or(key)
}

fn bit_at(key_hash: &[u8], depth: usize) -> u8 {
    let byte_idx = depth / 8;
    let bit_idx_from_msb = 7 - (depth % 8);
    (key_hash[byte_idx] >> bit_idx_from_msb) & 1
}

struct LeafNode {
    key_hash: Vec<u8>,
    node_hash: Vec<u8>,
}

fn hash_internal(left: &[u8], right: &[u8]) -> VerifyResult<Vec<u8>> {
    let mut preimage = INNER_PREFIX.to_vec();
    preimage.extend_from_slice(left);
    preimage.extend_from_slice(right);
    do_hash(HashOp::Sha256, &preimage)
}

/// `buildJmtRoot`: no leaves -> placeholder; one leaf or `depth >= 256` ->
/// that leaf's own node hash; otherwise partition by `bit(depth)` of each
/// leaf's key-hash (MSB-first within each byte) and recurse.
fn build_jmt_root(nodes: &[LeafNode], depth: usize) -> VerifyResult<Vec<u8>> {
    if nodes.is_empty() {
        return placeholder_hash();
    }
    if nodes.len() == 1 || depth >= 256 {
        return Ok(nodes[0].node_hash.clone());
    }

    let mut left = Vec::new();
    let mut right = Vec::new();
    for node in nodes {
        if bit_at(&node.key_hash, depth) == 0 {
            left.push(LeafNode {
                key_hash: node.key_hash.clone(),
                node_hash: node.node_hash.clone(),
            });
        } else {
            right.push(LeafNode {
                key_hash: node.key_hash.clone(),
                node_hash: node.node_hash.clone(),
            });
        }
    }

    let left_hash = if left.is_empty() {
        placeholder_hash()?
    } else {
        build_jmt_root(&left, depth + 1)?
    };
    let right_hash = if right.is_empty() {
        placeholder_hash()?
    } else {
        build_jmt_root(&right, depth + 1)?
    };

    hash_internal(&left_hash, &right_hash)
}

/// Non-catching variant of `verify_webcat_proof`; returns the specific
/// failure reason instead of collapsing it.
pub fn try_verify_webcat_proof(data: &WebcatProofData) -> VerifyResult<Vec<WebcatLeaf>> {
    let spec = webcat_spec();

    let mut nodes = Vec::with_capacity(data.leaves.len());
    let mut normalized = Vec::with_capacity(data.leaves.len());
    for leaf in &data.leaves {
        let value = hex::decode(&leaf.value_hex)
            .map_err(|e| VerifyError::InvalidEncoding(format!("leaf value: {e}")))?;
        let canonical_key = canonicalize_key(&leaf.key);

        let node_hash = apply_leaf(&spec.leaf_spec, canonical_key.as_bytes(), &value)?;
        let key_hash = do_hash(HashOp::Sha256, canonical_key.as_bytes())?;

        nodes.push(LeafNode { key_hash, node_hash });
        normalized.push(WebcatLeaf {
            key: leaf.key.clone(),
            value,
        });
    }

    let canonical_root = build_jmt_root(&nodes, 0)?;

    let expected_root = hex::decode(&data.canonical_root_hash_hex)
        .map_err(|e| VerifyError::InvalidEncoding(format!("canonical root hash: {e}")))?;
    if canonical_root != expected_root {
        return Err(VerifyError::RootMismatch);
    }

    let last = data
        .proof_bytes
        .last()
        .ok_or_else(|| VerifyError::MalformedProof("proof_bytes is empty".to_string()))?;
    let exist = match last {
        CommitmentProof::Exist(e) => e,
        _ => {
            return Err(VerifyError::MalformedProof(
                "last proof_bytes element is not an existence proof".to_string(),
            ))
        }
    };

    verify_existence(exist, &spec, &data.app_hash, b"canonical", &canonical_root)?;

    Ok(normalized)
}

/// Verify a sidecar sparse-Merkle proof end to end: rebuild the canonical
/// root from the supplied leaves, then chain that root through an
/// existence proof to the application hash. Returns the normalized leaf
/// list on success, `None` on any failure.
pub fn verify_webcat_proof(data: &WebcatProofData) -> Option<Vec<WebcatLeaf>> {
    try_verify_webcat_proof(data).ok()
}
