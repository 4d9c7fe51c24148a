use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{VerifyError, VerifyResult};
use crate::existence::ExistenceProof;
use crate::hash::{encode_varint, HashOp};
use crate::nonexistence::NonExistenceProof;
use crate::ops::{InnerOp, LeafOp};
use crate::proof::{BatchEntry, BatchProof, CommitmentProof};

/// An `ExistenceProof` whose `path` has been replaced by integer indices
/// into a shared `lookup_inners` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressedExistenceProof {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
    pub leaf: LeafOp,
    pub path: Vec<i32>,
}

/// A `NonExistenceProof` whose neighbor paths have been compressed likewise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressedNonExistenceProof {
    pub key: Vec<u8>,
    pub left: Option<CompressedExistenceProof>,
    pub right: Option<CompressedExistenceProof>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompressedBatchEntry {
    Exist(CompressedExistenceProof),
    NonExist(CompressedNonExistenceProof),
}

/// A `BatchProof` with every inner operator that appears in any of its
/// existence subproofs deduplicated into `lookup_inners`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressedBatchProof {
    pub entries: Vec<CompressedBatchEntry>,
    pub lookup_inners: Vec<InnerOp>,
}

fn hash_op_tag(op: HashOp) -> u8 {
    match op {
        HashOp::NoHash => 0,
        HashOp::Sha256 => 1,
        HashOp::Sha512 => 2,
        HashOp::Keccak => 3,
        HashOp::Ripemd160 => 4,
        HashOp::Bitcoin => 5,
        HashOp::Sha512_256 => 6,
        HashOp::Blake2b512 => 7,
        HashOp::Blake2s256 => 8,
        HashOp::Blake3 => 9,
    }
}

/// Canonical encoded bytes of an `InnerOp`, used as the dedup key in
/// `compress`. This is not the wire format (decoding the wire format is out
/// of this crate's scope) -- it only needs to be an injective byte encoding
/// of the fields that make two `InnerOp`s the same operator.
fn inner_op_key(op: &InnerOp) -> Vec<u8> {
    let mut buf = vec![hash_op_tag(op.hash)];
    buf.extend(encode_varint(op.prefix.len()));
    buf.extend_from_slice(&op.prefix);
    buf.extend(encode_varint(op.suffix.len()));
    buf.extend_from_slice(&op.suffix);
    buf
}

struct InnerTable {
    index_of: HashMap<Vec<u8>, usize>,
    ops: Vec<InnerOp>,
}

impl InnerTable {
    fn new() -> Self {
        Self {
            index_of: HashMap::new(),
            ops: Vec::new(),
        }
    }

    fn intern(&mut self, op: &InnerOp) -> i32 {
        let key = inner_op_key(op);
        if let Some(&idx) = self.index_of.get(&key) {
            return idx as i32;
        }
        let idx = self.ops.len();
        self.index_of.insert(key, idx);
        self.ops.push(op.clone());
        idx as i32
    }
}

fn compress_existence(e: &ExistenceProof, table: &mut InnerTable) -> CompressedExistenceProof {
    CompressedExistenceProof {
        key: e.key.clone(),
        value: e.value.clone(),
        leaf: e.leaf.clone(),
        path: e.path.iter().map(|op| table.intern(op)).collect(),
    }
}

fn compress_non_existence(
    ne: &NonExistenceProof,
    table: &mut InnerTable,
) -> CompressedNonExistenceProof {
    CompressedNonExistenceProof {
        key: ne.key.clone(),
        left: ne.left.as_ref().map(|e| compress_existence(e, table)),
        right: ne.right.as_ref().map(|e| compress_existence(e, table)),
    }
}

/// Deduplicate inner operators across a batch's existence subproofs,
/// replacing each `path` with indices into a shared table. Non-batch
/// proofs (a bare existence, non-existence, or already-compressed proof)
/// are returned unchanged.
pub fn compress(proof: &CommitmentProof) -> CommitmentProof {
    let batch = match proof {
        CommitmentProof::Batch(b) => b,
        other => return other.clone(),
    };

    let mut table = InnerTable::new();
    let entries = batch
        .entries
        .iter()
        .map(|entry| match entry {
            BatchEntry::Exist(e) => CompressedBatchEntry::Exist(compress_existence(e, &mut table)),
            BatchEntry::NonExist(ne) => {
                CompressedBatchEntry::NonExist(compress_non_existence(ne, &mut table))
            }
        })
        .collect();

    CommitmentProof::Compressed(CompressedBatchProof {
        entries,
        lookup_inners: table.ops,
    })
}

fn lookup(lookup_inners: &[InnerOp], idx: i32) -> VerifyResult<InnerOp> {
    let idx: usize = idx.try_into().map_err(|_| {
        VerifyError::MalformedProof(format!("negative lookup_inners index {idx}"))
    })?;
    lookup_inners.get(idx).cloned().ok_or_else(|| {
        VerifyError::MalformedProof(format!(
            "lookup_inners index {idx} out of range (table has {} entries)",
            lookup_inners.len()
        ))
    })
}

fn decompress_existence(
    e: &CompressedExistenceProof,
    lookup_inners: &[InnerOp],
) -> VerifyResult<ExistenceProof> {
    let path = e
        .path
        .iter()
        .map(|&idx| lookup(lookup_inners, idx))
        .collect::<VerifyResult<Vec<_>>>()?;
    Ok(ExistenceProof {
        key: e.key.clone(),
        value: e.value.clone(),
        leaf: e.leaf.clone(),
        path,
    })
}

fn decompress_non_existence(
    ne: &CompressedNonExistenceProof,
    lookup_inners: &[InnerOp],
) -> VerifyResult<NonExistenceProof> {
    Ok(NonExistenceProof {
        key: ne.key.clone(),
        left: ne
            .left
            .as_ref()
            .map(|e| decompress_existence(e, lookup_inners))
            .transpose()?,
        right: ne
            .right
            .as_ref()
            .map(|e| decompress_existence(e, lookup_inners))
            .transpose()?,
    })
}

/// Inverse of `compress`: replace index sequences with the looked-up
/// `InnerOp`s. Non-compressed proofs are returned unchanged.
pub fn decompress(proof: &CommitmentProof) -> VerifyResult<CommitmentProof> {
    let compressed = match proof {
        CommitmentProof::Compressed(c) => c,
        other => return Ok(other.clone()),
    };

    let entries = compressed
        .entries
        .iter()
        .map(|entry| {
            Ok(match entry {
                CompressedBatchEntry::Exist(e) => {
                    BatchEntry::Exist(decompress_existence(e, &compressed.lookup_inners)?)
                }
                CompressedBatchEntry::NonExist(ne) => {
                    BatchEntry::NonExist(decompress_non_existence(ne, &compressed.lookup_inners)?)
                }
            })
        })
        .collect::<VerifyResult<Vec<_>>>()?;

    Ok(CommitmentProof::Batch(BatchProof { entries }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::LengthOp;

    fn op(prefix: &[u8], suffix: &[u8]) -> InnerOp {
        InnerOp {
            hash: HashOp::Sha256,
            prefix: prefix.to_vec(),
            suffix: suffix.to_vec(),
        }
    }

    fn leaf_op() -> LeafOp {
        LeafOp {
            hash: HashOp::Sha256,
            prehash_key: HashOp::NoHash,
            prehash_value: HashOp::Sha256,
            length: LengthOp::VarProto,
            prefix: vec![0],
        }
    }

    fn sample_batch() -> BatchProof {
        let shared = op(b"shared-prefix", b"");
        let a = ExistenceProof {
            key: b"a".to_vec(),
            value: b"1".to_vec(),
            leaf: leaf_op(),
            path: vec![shared.clone(), op(b"a-only", b"")],
        };
        let b = ExistenceProof {
            key: b"b".to_vec(),
            value: b"2".to_vec(),
            leaf: leaf_op(),
            path: vec![shared, op(b"b-only", b"")],
        };
        BatchProof {
            entries: vec![BatchEntry::Exist(a), BatchEntry::Exist(b)],
        }
    }

    #[test]
    fn compress_deduplicates_shared_inner_ops() {
        let batch = sample_batch();
        let total_occurrences: usize = batch
            .entries
            .iter()
            .map(|e| match e {
                BatchEntry::Exist(e) => e.path.len(),
                BatchEntry::NonExist(_) => 0,
            })
            .sum();

        let compressed = compress(&CommitmentProof::Batch(batch));
        let CommitmentProof::Compressed(c) = &compressed else {
            panic!("expected a compressed proof");
        };
        assert!(c.lookup_inners.len() < total_occurrences);
        assert_eq!(c.lookup_inners.len(), 3);
    }

    #[test]
    fn decompress_round_trips_to_structural_equality() {
        let original = CommitmentProof::Batch(sample_batch());
        let round_tripped = decompress(&compress(&original)).unwrap();
        assert_eq!(original, round_tripped);
    }

    #[test]
    fn decompress_rejects_out_of_range_index() {
        let bad = CommitmentProof::Compressed(CompressedBatchProof {
            entries: vec![CompressedBatchEntry::Exist(CompressedExistenceProof {
                key: b"k".to_vec(),
                value: b"v".to_vec(),
                leaf: leaf_op(),
                path: vec![5],
            })],
            lookup_inners: vec![],
        });
        assert!(decompress(&bad).is_err());
    }

    #[test]
    fn non_batch_proofs_pass_through_compress_unchanged() {
        let e = ExistenceProof {
            key: b"k".to_vec(),
            value: b"v".to_vec(),
            leaf: leaf_op(),
            path: vec![],
        };
        let proof = CommitmentProof::Exist(e);
        assert_eq!(compress(&proof), proof);
    }
}
