use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{VerifyError, VerifyResult};
use crate::ops::{apply_inner, apply_leaf, InnerOp, LeafOp};
use crate::spec::{ensure_spec, ProofSpec};

/// Witnesses that `(key, value)` is committed by a root: a leaf plus a
/// bottom-up sequence of inner steps. `path[0]` is applied to the leaf
/// hash first; `path[len-1]` yields the root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistenceProof {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
    pub leaf: LeafOp,
    pub path: Vec<InnerOp>,
}

/// Replay leaf hashing, then inner hashing bottom-up, and return the
/// resulting root digest.
pub fn calculate_existence_root(proof: &ExistenceProof) -> VerifyResult<Vec<u8>> {
    if proof.key.is_empty() {
        return Err(VerifyError::MalformedProof("missing key".to_string()));
    }
    if proof.value.is_empty() {
        return Err(VerifyError::MalformedProof("missing value".to_string()));
    }

    let mut acc = apply_leaf(&proof.leaf, &proof.key, &proof.value)?;
    for op in &proof.path {
        acc = apply_inner(op, &acc)?;
    }
    Ok(acc)
}

/// Full existence check: the proof must conform to `spec`, its recomputed
/// root must byte-equal `root`, and its key/value must byte-equal the
/// queried `key`/`value`.
pub fn verify_existence(
    proof: &ExistenceProof,
    spec: &ProofSpec,
    root: &[u8],
    key: &[u8],
    value: &[u8],
) -> VerifyResult<()> {
    ensure_spec(proof, spec)?;

    let computed = calculate_existence_root(proof)?;
    if computed != root {
        debug!("existence proof root mismatch");
        return Err(VerifyError::RootMismatch);
    }

    if proof.key != key || proof.value != value {
        debug!("existence proof key/value mismatch");
        return Err(VerifyError::KeyValueMismatch);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::{HashOp, LengthOp};
    use crate::spec::tendermint_spec;

    fn sample_proof() -> ExistenceProof {
        ExistenceProof {
            key: b"food".to_vec(),
            value: b"some longer text".to_vec(),
            leaf: LeafOp {
                hash: HashOp::Sha256,
                prehash_key: HashOp::NoHash,
                prehash_value: HashOp::Sha256,
                length: LengthOp::VarProto,
                prefix: vec![0],
            },
            path: vec![],
        }
    }

    #[test]
    fn empty_path_is_a_valid_one_element_tree() {
        let proof = sample_proof();
        let root = calculate_existence_root(&proof).unwrap();
        assert!(verify_existence(&proof, &tendermint_spec(), &root, &proof.key, &proof.value).is_ok());
    }

    #[test]
    fn min_depth_rejects_empty_path() {
        let proof = sample_proof();
        let mut spec = tendermint_spec();
        spec.min_depth = 1;
        let root = calculate_existence_root(&proof).unwrap();
        let err = verify_existence(&proof, &spec, &root, &proof.key, &proof.value).unwrap_err();
        assert!(matches!(err, VerifyError::SpecViolation(_)));
    }

    #[test]
    fn root_mismatch_detected() {
        let proof = sample_proof();
        let bad_root = vec![0u8; 32];
        let err = verify_existence(&proof, &tendermint_spec(), &bad_root, &proof.key, &proof.value)
            .unwrap_err();
        assert_eq!(err, VerifyError::RootMismatch);
    }

    #[test]
    fn key_value_mismatch_detected() {
        let proof = sample_proof();
        let root = calculate_existence_root(&proof).unwrap();
        let err = verify_existence(&proof, &tendermint_spec(), &root, b"other", &proof.value)
            .unwrap_err();
        assert_eq!(err, VerifyError::KeyValueMismatch);
    }

    #[test]
    fn single_bit_flip_in_root_breaks_verification() {
        let proof = sample_proof();
        let mut root = calculate_existence_root(&proof).unwrap();
        root[0] ^= 0x01;
        assert!(verify_existence(&proof, &tendermint_spec(), &root, &proof.key, &proof.value).is_err());
    }
}
