use serde::{Deserialize, Serialize};

use crate::error::{VerifyError, VerifyResult};
use crate::hash::{do_hash, do_hash_or_noop, do_length_op, HashOp, LengthOp};

/// Defines how to hash a leaf node: `hash(prefix || pkey || pvalue)` where
/// `pkey`/`pvalue` are the (possibly prehashed, possibly length-prefixed)
/// key and value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeafOp {
    pub hash: HashOp,
    pub prehash_key: HashOp,
    pub prehash_value: HashOp,
    pub length: LengthOp,
    pub prefix: Vec<u8>,
}

/// Defines one step up the tree: `hash(prefix || child || suffix)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InnerOp {
    pub hash: HashOp,
    pub prefix: Vec<u8>,
    pub suffix: Vec<u8>,
}

/// Compute a leaf digest from `(key, value)` under `op`.
pub fn apply_leaf(op: &LeafOp, key: &[u8], value: &[u8]) -> VerifyResult<Vec<u8>> {
    if key.is_empty() {
        return Err(VerifyError::MalformedProof("missing key".to_string()));
    }
    if value.is_empty() {
        return Err(VerifyError::MalformedProof("missing value".to_string()));
    }

    let pkey = do_length_op(op.length, &do_hash_or_noop(op.prehash_key, key)?)?;
    let pvalue = do_length_op(op.length, &do_hash_or_noop(op.prehash_value, value)?)?;

    let mut preimage = op.prefix.clone();
    preimage.extend_from_slice(&pkey);
    preimage.extend_from_slice(&pvalue);

    do_hash(op.hash, &preimage)
}

/// Combine a child digest with one step of inner-node framing.
pub fn apply_inner(op: &InnerOp, child: &[u8]) -> VerifyResult<Vec<u8>> {
    if child.is_empty() {
        return Err(VerifyError::MalformedProof(
            "inner op applied to an empty child".to_string(),
        ));
    }

    let mut preimage = op.prefix.clone();
    preimage.extend_from_slice(child);
    preimage.extend_from_slice(&op.suffix);

    do_hash(op.hash, &preimage)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf_op_var_proto() -> LeafOp {
        LeafOp {
            hash: HashOp::Sha256,
            prehash_key: HashOp::NoHash,
            prehash_value: HashOp::NoHash,
            length: LengthOp::VarProto,
            prefix: vec![],
        }
    }

    #[test]
    fn s1_leaf_hash_with_var_proto_length() {
        let digest = apply_leaf(&leaf_op_var_proto(), b"food", b"some longer text").unwrap();
        assert_eq!(
            hex::encode(digest),
            "b68f5d298e915ae1753dd333da1f9cf605411a5f2e12516be6758f365e6db265"
        );
    }

    #[test]
    fn s2_inner_step() {
        let op = InnerOp {
            hash: HashOp::Sha256,
            prefix: hex::decode("0123456789").unwrap(),
            suffix: hex::decode("deadbeef").unwrap(),
        };
        let child = hex::decode("00cafe00").unwrap();
        let digest = apply_inner(&op, &child).unwrap();
        assert_eq!(
            hex::encode(digest),
            "0339f76086684506a6d42a60da4b5a719febd4d96d8b8d85ae92849e3a849a5e"
        );
    }

    #[test]
    fn s3_leaf_then_one_inner() {
        let leaf = apply_leaf(&leaf_op_var_proto(), b"food", b"some longer text").unwrap();
        let op = InnerOp {
            hash: HashOp::Sha256,
            prefix: hex::decode("deadbeef00cafe00").unwrap(),
            suffix: vec![],
        };
        let digest = apply_inner(&op, &leaf).unwrap();
        assert_eq!(
            hex::encode(digest),
            "836ea236a6902a665c2a004c920364f24cad52ded20b1e4f22c3179bfe25b2a9"
        );
    }

    #[test]
    fn s4_fixed32_little_length() {
        let op = LeafOp {
            length: LengthOp::Fixed32Little,
            ..leaf_op_var_proto()
        };
        let digest = apply_leaf(&op, b"food", b"some longer text").unwrap();
        assert_eq!(
            hex::encode(digest),
            "c853652437be02501c674744bf2a2b45d92a0a9f29c4b1044010fb3e2d43a949"
        );
    }

    #[test]
    fn apply_leaf_rejects_empty_key_or_value() {
        let op = leaf_op_var_proto();
        assert!(apply_leaf(&op, b"", b"v").is_err());
        assert!(apply_leaf(&op, b"k", b"").is_err());
    }

    #[test]
    fn apply_inner_rejects_empty_child() {
        let op = InnerOp {
            hash: HashOp::Sha256,
            prefix: vec![],
            suffix: vec![],
        };
        assert!(apply_inner(&op, &[]).is_err());
    }
}
