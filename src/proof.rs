use serde::{Deserialize, Serialize};

use crate::compress::{decompress, CompressedBatchProof};
use crate::error::VerifyResult;
use crate::existence::{verify_existence, ExistenceProof};
use crate::nonexistence::{comparison_key, verify_non_existence, NonExistenceProof};
use crate::spec::ProofSpec;

/// One entry of a `BatchProof`: either a membership or a non-membership
/// witness for some key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchEntry {
    Exist(ExistenceProof),
    NonExist(NonExistenceProof),
}

/// An ordered collection of existence/non-existence proofs against a
/// single root, verified independently per entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchProof {
    pub entries: Vec<BatchEntry>,
}

/// The generic proof format: exactly one of an existence proof, a
/// non-existence proof, a batch of either, or a compressed batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommitmentProof {
    Exist(ExistenceProof),
    NonExist(NonExistenceProof),
    Batch(BatchProof),
    Compressed(CompressedBatchProof),
}

fn find_existence<'a>(proof: &'a CommitmentProof, key: &[u8]) -> Option<&'a ExistenceProof> {
    match proof {
        CommitmentProof::Exist(e) if e.key == key => Some(e),
        CommitmentProof::Batch(batch) => batch.entries.iter().find_map(|entry| match entry {
            BatchEntry::Exist(e) if e.key == key => Some(e),
            _ => None,
        }),
        _ => None,
    }
}

fn bracket_contains(ne: &NonExistenceProof, spec: &ProofSpec, key: &[u8]) -> bool {
    let k = match comparison_key(spec, key) {
        Ok(k) => k,
        Err(_) => return false,
    };
    if let Some(left) = &ne.left {
        match comparison_key(spec, &left.key) {
            Ok(left_key) if left_key < k => {}
            _ => return false,
        }
    }
    if let Some(right) = &ne.right {
        match comparison_key(spec, &right.key) {
            Ok(right_key) if k < right_key => {}
            _ => return false,
        }
    }
    true
}

fn find_non_existence<'a>(
    proof: &'a CommitmentProof,
    spec: &ProofSpec,
    key: &[u8],
) -> Option<&'a NonExistenceProof> {
    match proof {
        CommitmentProof::NonExist(ne) if bracket_contains(ne, spec, key) => Some(ne),
        CommitmentProof::Batch(batch) => batch.entries.iter().find_map(|entry| match entry {
            BatchEntry::NonExist(ne) if bracket_contains(ne, spec, key) => Some(ne),
            _ => None,
        }),
        _ => None,
    }
}

/// Decide whether `proof` witnesses that `key` maps to `value` under
/// `root`. Never propagates an error: any internal failure (malformed
/// proof, spec violation, root/key/value mismatch) collapses to `false`.
pub fn verify_membership(
    proof: &CommitmentProof,
    spec: &ProofSpec,
    root: &[u8],
    key: &[u8],
    value: &[u8],
) -> bool {
    let norm = match decompress(proof) {
        Ok(p) => p,
        Err(_) => return false,
    };
    match find_existence(&norm, key) {
        Some(e) => verify_existence(e, spec, root, key, value).is_ok(),
        None => false,
    }
}

/// Decide whether `proof` witnesses that `key` is absent under `root`.
pub fn verify_non_membership(
    proof: &CommitmentProof,
    spec: &ProofSpec,
    root: &[u8],
    key: &[u8],
) -> bool {
    let norm = match decompress(proof) {
        Ok(p) => p,
        Err(_) => return false,
    };
    match find_non_existence(&norm, spec, key) {
        Some(ne) => verify_non_existence(ne, spec, root, key).is_ok(),
        None => false,
    }
}

/// Verify a batch of membership claims; short-circuits (returns `false`) on
/// the first failing item.
pub fn batch_verify_membership(
    proof: &CommitmentProof,
    spec: &ProofSpec,
    root: &[u8],
    items: &[(&[u8], &[u8])],
) -> bool {
    items
        .iter()
        .all(|(key, value)| verify_membership(proof, spec, root, key, value))
}

/// Verify a batch of non-membership claims; short-circuits (returns
/// `false`) on the first failing item.
pub fn batch_verify_non_membership(
    proof: &CommitmentProof,
    spec: &ProofSpec,
    root: &[u8],
    keys: &[&[u8]],
) -> bool {
    keys.iter()
        .all(|key| verify_non_membership(proof, spec, root, key))
}

/// Internal (non-catching) variant of `verify_membership`, used by callers
/// that want the specific failure reason -- e.g. the webcat sidecar's chain
/// step.
pub fn try_verify_membership(
    proof: &CommitmentProof,
    spec: &ProofSpec,
    root: &[u8],
    key: &[u8],
    value: &[u8],
) -> VerifyResult<()> {
    let norm = decompress(proof)?;
    match find_existence(&norm, key) {
        Some(e) => verify_existence(e, spec, root, key, value),
        None => Err(crate::error::VerifyError::MalformedProof(
            "no existence proof found for the queried key".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::existence::calculate_existence_root;
    use crate::hash::{HashOp, LengthOp};
    use crate::ops::LeafOp;
    use crate::spec::tendermint_spec;

    fn leaf(key: &[u8], value: &[u8]) -> ExistenceProof {
        ExistenceProof {
            key: key.to_vec(),
            value: value.to_vec(),
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
    fn verify_membership_on_bare_exist_proof() {
        let e = leaf(b"food", b"some longer text");
        let root = calculate_existence_root(&e).unwrap();
        let proof = CommitmentProof::Exist(e);
        let spec = tendermint_spec();
        assert!(verify_membership(
            &proof,
            &spec,
            &root,
            b"food",
            b"some longer text"
        ));
        assert!(!verify_membership(&proof, &spec, &root, b"food", b"wrong value"));
        assert!(!verify_membership(&proof, &spec, &root, b"other key", b"x"));
    }

    #[test]
    fn batch_verify_membership_short_circuits() {
        let a = leaf(b"aaa", b"1");
        let root = calculate_existence_root(&a).unwrap();
        let proof = CommitmentProof::Batch(BatchProof {
            entries: vec![BatchEntry::Exist(a)],
        });
        let spec = tendermint_spec();
        let items: Vec<(&[u8], &[u8])> = vec![(b"aaa", b"1"), (b"missing", b"2")];
        assert!(!batch_verify_membership(&proof, &spec, &root, &items));
    }
}
