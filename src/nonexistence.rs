use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{VerifyError, VerifyResult};
use crate::existence::{verify_existence, ExistenceProof};
use crate::hash::do_hash_or_noop;
use crate::ops::InnerOp;
use crate::spec::{ensure_left_most, ensure_right_most, order_from_padding, ProofSpec};

/// Witnesses that `key` is absent by exhibiting its sorted neighbors. At
/// least one of `left`/`right` must be set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonExistenceProof {
    pub key: Vec<u8>,
    pub left: Option<ExistenceProof>,
    pub right: Option<ExistenceProof>,
}

/// `K(k)`: the key as compared for ordering purposes -- prehashed when the
/// spec says comparisons happen post-prehash (e.g. the SMT spec, which
/// compares SHA-256(key) rather than the raw key), otherwise the raw key.
pub(crate) fn comparison_key(spec: &ProofSpec, key: &[u8]) -> VerifyResult<Vec<u8>> {
    if spec.prehash_key_before_comparison {
        do_hash_or_noop(spec.leaf_spec.prehash_key, key)
    } else {
        Ok(key.to_vec())
    }
}

/// Full non-existence check: verify whichever neighbor(s) are present,
/// check they bracket `key` under the spec's comparison mapping, and check
/// tree adjacency (spec.md §4.4-§4.5).
pub fn verify_non_existence(
    proof: &NonExistenceProof,
    spec: &ProofSpec,
    root: &[u8],
    key: &[u8],
) -> VerifyResult<()> {
    if proof.left.is_none() && proof.right.is_none() {
        return Err(VerifyError::MalformedProof(
            "non-existence proof has neither a left nor a right neighbor".to_string(),
        ));
    }

    if let Some(left) = &proof.left {
        verify_existence(left, spec, root, &left.key, &left.value)?;
    }
    if let Some(right) = &proof.right {
        verify_existence(right, spec, root, &right.key, &right.value)?;
    }

    let k = comparison_key(spec, key)?;
    if let Some(left) = &proof.left {
        let left_key = comparison_key(spec, &left.key)?;
        if left_key >= k {
            debug!("non-existence proof: left neighbor is not less than key");
            return Err(VerifyError::OrderingViolation(
                "left neighbor key is not less than the queried key".to_string(),
            ));
        }
    }
    if let Some(right) = &proof.right {
        let right_key = comparison_key(spec, &right.key)?;
        if k >= right_key {
            debug!("non-existence proof: right neighbor is not greater than key");
            return Err(VerifyError::OrderingViolation(
                "right neighbor key is not greater than the queried key".to_string(),
            ));
        }
    }

    match (&proof.left, &proof.right) {
        (None, Some(right)) => ensure_left_most(&right.path, &spec.inner_spec),
        (Some(left), None) => ensure_right_most(&left.path, &spec.inner_spec),
        (Some(left), Some(right)) => {
            ensure_left_neighbor(&left.path, &right.path, &spec.inner_spec)
        }
        (None, None) => unreachable!("checked above"),
    }
}

/// `ensureLeftNeighbor`: isolate the lowest common ancestor of `left` and
/// `right` by popping identical root-most steps off both paths, then check
/// that the first divergent steps are consecutive sibling branches and that
/// the remainder of each path hugs the correct edge (spec.md §4.5).
///
/// Both `left` and `right` are ordered bottom-up (index 0 is the step
/// applied to the leaf first), so the "top" of each stack -- the root-most
/// step -- is the last element.
pub fn ensure_left_neighbor(
    left: &[InnerOp],
    right: &[InnerOp],
    inner_spec: &crate::spec::InnerSpec,
) -> VerifyResult<()> {
    let mut li = left.len();
    let mut ri = right.len();

    while li > 0 && ri > 0 {
        let l = &left[li - 1];
        let r = &right[ri - 1];
        if l.prefix == r.prefix && l.suffix == r.suffix {
            li -= 1;
            ri -= 1;
        } else {
            break;
        }
    }

    if li == 0 || ri == 0 {
        return Err(VerifyError::OrderingViolation(
            "left and right paths share no divergent step".to_string(),
        ));
    }

    let left_branch = order_from_padding(&left[li - 1], inner_spec)?;
    let right_branch = order_from_padding(&right[ri - 1], inner_spec)?;
    if right_branch != left_branch + 1 {
        return Err(VerifyError::OrderingViolation(
            "divergent steps are not consecutive sibling branches".to_string(),
        ));
    }

    ensure_right_most(&left[..li - 1], inner_spec)?;
    ensure_left_most(&right[..ri - 1], inner_spec)?;
    Ok(())
}
