use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{VerifyError, VerifyResult};
use crate::existence::ExistenceProof;
use crate::hash::{HashOp, LengthOp};
use crate::ops::{InnerOp, LeafOp};

/// Describes how inner nodes are structured for a given tree shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InnerSpec {
    /// Permutation of `0..branching_factor` giving the serialization order
    /// of each branch's child.
    pub child_order: Vec<i32>,
    pub child_size: i32,
    pub min_prefix_length: i32,
    pub max_prefix_length: i32,
    pub empty_child: Vec<u8>,
    pub hash: HashOp,
}

/// Pins the hashing/encoding choices of a tree so a proof can't equivocate
/// on its own shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofSpec {
    pub leaf_spec: LeafOp,
    pub inner_spec: InnerSpec,
    pub min_depth: i32,
    pub max_depth: i32,
    pub prehash_key_before_comparison: bool,
}

/// `getPosition(order, b)`: index of `b` within the permutation `order`.
pub fn get_position(order: &[i32], branch: i32) -> VerifyResult<usize> {
    order
        .iter()
        .position(|&b| b == branch)
        .ok_or_else(|| VerifyError::SpecViolation(format!("branch {branch} not found in child order")))
}

/// The byte-arrangement a given branch position implies for an inner node's
/// prefix/suffix lengths (spec.md §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaddingSignature {
    pub min_prefix: usize,
    pub max_prefix: usize,
    pub suffix: usize,
}

pub fn padding_signature(inner_spec: &InnerSpec, branch: i32) -> VerifyResult<PaddingSignature> {
    let idx = get_position(&inner_spec.child_order, branch)?;
    let branching = inner_spec.child_order.len();
    let child_size = inner_spec.child_size as usize;
    let prefix_from_siblings = idx * child_size;

    Ok(PaddingSignature {
        min_prefix: prefix_from_siblings + inner_spec.min_prefix_length as usize,
        max_prefix: prefix_from_siblings + inner_spec.max_prefix_length as usize,
        suffix: (branching - 1 - idx) * child_size,
    })
}

/// Whether `op` has the byte-length padding implied by `branch`.
pub fn has_padding(op: &InnerOp, inner_spec: &InnerSpec, branch: i32) -> VerifyResult<bool> {
    let sig = padding_signature(inner_spec, branch)?;
    Ok(op.prefix.len() >= sig.min_prefix
        && op.prefix.len() <= sig.max_prefix
        && op.suffix.len() == sig.suffix)
}

/// `orderFromPadding`: the unique branch whose padding matches `op`.
pub fn order_from_padding(op: &InnerOp, inner_spec: &InnerSpec) -> VerifyResult<i32> {
    for &branch in &inner_spec.child_order {
        if has_padding(op, inner_spec, branch)? {
            return Ok(branch);
        }
    }
    Err(VerifyError::SpecViolation(
        "inner op does not match any branch's padding".to_string(),
    ))
}

/// Every step has padding for the leftmost branch (`b = 0`).
pub fn ensure_left_most(path: &[InnerOp], inner_spec: &InnerSpec) -> VerifyResult<()> {
    for op in path {
        if !has_padding(op, inner_spec, 0)? {
            return Err(VerifyError::OrderingViolation(
                "path is not leftmost".to_string(),
            ));
        }
    }
    Ok(())
}

/// Every step has padding for the rightmost branch.
pub fn ensure_right_most(path: &[InnerOp], inner_spec: &InnerSpec) -> VerifyResult<()> {
    let last_branch = *inner_spec
        .child_order
        .last()
        .ok_or_else(|| VerifyError::SpecViolation("empty child order".to_string()))?;
    for op in path {
        if !has_padding(op, inner_spec, last_branch)? {
            return Err(VerifyError::OrderingViolation(
                "path is not rightmost".to_string(),
            ));
        }
    }
    Ok(())
}

/// `ensureLeaf`: byte-equality on every field of the proof's leaf operator
/// against the spec's.
pub fn ensure_leaf(leaf: &LeafOp, leaf_spec: &LeafOp) -> VerifyResult<()> {
    if leaf != leaf_spec {
        return Err(VerifyError::SpecViolation(
            "leaf operator does not match spec".to_string(),
        ));
    }
    Ok(())
}

/// `ensureInner`: hash match, leaf/inner prefix collision guard, and
/// prefix-length bounds (accounting for sibling children that may be
/// serialized into the prefix depending on branch position).
pub fn ensure_inner(op: &InnerOp, leaf_prefix: &[u8], inner_spec: &InnerSpec) -> VerifyResult<()> {
    if op.hash != inner_spec.hash {
        return Err(VerifyError::SpecViolation(
            "inner op hash does not match spec".to_string(),
        ));
    }
    if !leaf_prefix.is_empty() && op.prefix.starts_with(leaf_prefix) {
        return Err(VerifyError::SpecViolation(
            "inner op prefix collides with leaf prefix".to_string(),
        ));
    }

    let branching = inner_spec.child_order.len().max(1) as i32;
    let max_prefix = inner_spec.max_prefix_length + (branching - 1) * inner_spec.child_size;
    let len = op.prefix.len() as i32;
    if len < inner_spec.min_prefix_length || len > max_prefix {
        return Err(VerifyError::SpecViolation(format!(
            "inner op prefix length {len} outside [{}, {max_prefix}]",
            inner_spec.min_prefix_length
        )));
    }

    Ok(())
}

/// `ensureSpec`: validate that an existence proof's leaf and every inner
/// step matches the tree's spec, and that the path length is within
/// `[minDepth, maxDepth]` (a zero bound means unbounded on that side).
pub fn ensure_spec(proof: &ExistenceProof, spec: &ProofSpec) -> VerifyResult<()> {
    ensure_leaf(&proof.leaf, &spec.leaf_spec)?;

    let depth = proof.path.len() as i32;
    if spec.min_depth != 0 && depth < spec.min_depth {
        return Err(VerifyError::SpecViolation(format!(
            "path length {depth} below minDepth {}",
            spec.min_depth
        )));
    }
    if spec.max_depth != 0 && depth > spec.max_depth {
        return Err(VerifyError::SpecViolation(format!(
            "path length {depth} above maxDepth {}",
            spec.max_depth
        )));
    }

    for op in &proof.path {
        ensure_inner(op, &spec.leaf_spec.prefix, &spec.inner_spec)?;
    }

    Ok(())
}

/// IAVL built-in spec (cosmos-sdk's default store).
pub fn iavl_spec() -> ProofSpec {
    ProofSpec {
        leaf_spec: LeafOp {
            hash: HashOp::Sha256,
            prehash_key: HashOp::NoHash,
            prehash_value: HashOp::Sha256,
            length: LengthOp::VarProto,
            prefix: vec![0],
        },
        inner_spec: InnerSpec {
            child_order: vec![0, 1],
            child_size: 33,
            min_prefix_length: 4,
            max_prefix_length: 12,
            empty_child: vec![],
            hash: HashOp::Sha256,
        },
        min_depth: 0,
        max_depth: 0,
        prehash_key_before_comparison: false,
    }
}

/// Tendermint built-in spec (the ICS-23 proofs produced over the consensus
/// multistore).
pub fn tendermint_spec() -> ProofSpec {
    ProofSpec {
        leaf_spec: LeafOp {
            hash: HashOp::Sha256,
            prehash_key: HashOp::NoHash,
            prehash_value: HashOp::Sha256,
            length: LengthOp::VarProto,
            prefix: vec![0],
        },
        inner_spec: InnerSpec {
            child_order: vec![0, 1],
            child_size: 32,
            min_prefix_length: 1,
            max_prefix_length: 1,
            empty_child: vec![],
            hash: HashOp::Sha256,
        },
        min_depth: 0,
        max_depth: 0,
        prehash_key_before_comparison: false,
    }
}

/// SMT built-in spec (a generic sparse-Merkle tree).
pub fn smt_spec() -> ProofSpec {
    ProofSpec {
        leaf_spec: LeafOp {
            hash: HashOp::Sha256,
            prehash_key: HashOp::Sha256,
            prehash_value: HashOp::Sha256,
            length: LengthOp::NoPrefix,
            prefix: vec![0],
        },
        inner_spec: InnerSpec {
            child_order: vec![0, 1],
            child_size: 32,
            min_prefix_length: 1,
            max_prefix_length: 1,
            empty_child: vec![0; 32],
            hash: HashOp::Sha256,
        },
        min_depth: 0,
        max_depth: 256,
        prehash_key_before_comparison: true,
    }
}

/// Webcat built-in spec: the sidecar sparse-Merkle (JMT-style) tree. The
/// prefix-length bound is one byte wider than `"JMT::InternalNode"` alone to
/// tolerate a known historical typo ("JMT::IntrnalNode", one byte short) in
/// proofs produced by older sidecar versions.
pub fn webcat_spec() -> ProofSpec {
    ProofSpec {
        leaf_spec: LeafOp {
            hash: HashOp::Sha256,
            prehash_key: HashOp::Sha256,
            prehash_value: HashOp::Sha256,
            length: LengthOp::NoPrefix,
            prefix: b"JMT::LeafNode".to_vec(),
        },
        inner_spec: InnerSpec {
            child_order: vec![0, 1],
            child_size: 32,
            min_prefix_length: 16,
            max_prefix_length: 17,
            empty_child: Sha256::digest(b"SPARSE_MERKLE_PLACEHOLDER_HASH__").to_vec(),
            hash: HashOp::Sha256,
        },
        min_depth: 0,
        max_depth: 256,
        prehash_key_before_comparison: true,
    }
}
