use sha2::{Digest, Sha256};

use crate::error::{VerifyError, VerifyResult};

/// Hashing algorithm tag carried by a `LeafOp`/`InnerOp`/`InnerSpec`.
///
/// Only `Sha256` (and, as the identity, `NoHash`) is ever computed by this
/// crate. Any other value used as an active hash is a fatal
/// `UnsupportedOperator` -- the remaining variants exist so that wire
/// records using them can be rejected with a specific error instead of
/// failing to decode at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum HashOp {
    NoHash,
    Sha256,
    Sha512,
    Keccak,
    Ripemd160,
    Bitcoin,
    Sha512_256,
    Blake2b512,
    Blake2s256,
    Blake3,
}

/// Length-prefix encoding applied to a key or value before it enters a
/// leaf preimage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum LengthOp {
    NoPrefix,
    VarProto,
    VarRlp,
    Fixed32Big,
    Fixed32Little,
    Fixed64Big,
    Fixed64Little,
    Require32Bytes,
    Require64Bytes,
}

/// `doHash(op, bytes)`: SHA-256 digest, or an error for anything else.
pub fn do_hash(op: HashOp, bytes: &[u8]) -> VerifyResult<Vec<u8>> {
    match op {
        HashOp::Sha256 => Ok(Sha256::digest(bytes).to_vec()),
        other => Err(VerifyError::UnsupportedOperator(format!(
            "hash op {other:?} is not supported"
        ))),
    }
}

/// Same as `do_hash`, but `NoHash` returns the input unchanged instead of
/// erroring -- used for `prehashKey`/`prehashValue`, which are allowed to be
/// a no-op.
pub fn do_hash_or_noop(op: HashOp, bytes: &[u8]) -> VerifyResult<Vec<u8>> {
    match op {
        HashOp::NoHash => Ok(bytes.to_vec()),
        other => do_hash(other, bytes),
    }
}

/// `doLengthOp`: encode the length of `bytes` as a prefix (or assert an
/// exact length with no prefix), per the variant.
///
/// `VAR_PROTO` emits base-128 groups of the length integer, least
/// significant group first, each group OR'd with 0x80 except the final one
/// -- standard unsigned LEB128.
pub fn do_length_op(op: LengthOp, bytes: &[u8]) -> VerifyResult<Vec<u8>> {
    match op {
        LengthOp::NoPrefix => Ok(bytes.to_vec()),
        LengthOp::VarProto => {
            let mut out = encode_varint(bytes.len());
            out.extend_from_slice(bytes);
            Ok(out)
        }
        LengthOp::Fixed32Little => {
            let len: u32 = bytes.len().try_into().map_err(|_| {
                VerifyError::UnsupportedOperator(
                    "length exceeds 2^32 for FIXED32_LITTLE".to_string(),
                )
            })?;
            let mut out = len.to_le_bytes().to_vec();
            out.extend_from_slice(bytes);
            Ok(out)
        }
        LengthOp::Require32Bytes => {
            if bytes.len() != 32 {
                return Err(VerifyError::UnsupportedOperator(format!(
                    "expected 32 bytes, got {}",
                    bytes.len()
                )));
            }
            Ok(bytes.to_vec())
        }
        LengthOp::Require64Bytes => {
            if bytes.len() != 64 {
                return Err(VerifyError::UnsupportedOperator(format!(
                    "expected 64 bytes, got {}",
                    bytes.len()
                )));
            }
            Ok(bytes.to_vec())
        }
        other => Err(VerifyError::UnsupportedOperator(format!(
            "length op {other:?} is not supported"
        ))),
    }
}

/// Encode `value` as unsigned base-128 groups, low-order group first.
pub fn encode_varint(value: usize) -> Vec<u8> {
    let mut n = value as u64;
    let mut out = Vec::new();
    loop {
        let group = (n & 0x7f) as u8;
        n >>= 7;
        if n != 0 {
            out.push(group | 0x80);
        } else {
            out.push(group);
            break;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_of_food() {
        let digest = do_hash(HashOp::Sha256, b"food").unwrap();
        assert_eq!(
            hex::encode(digest),
            "c1f026582fe6e8cb620d0c85a72fe421ddded756662a8ec00ed4c297ad10676b"
        );
    }

    #[test]
    fn no_hash_is_identity() {
        assert_eq!(do_hash_or_noop(HashOp::NoHash, b"abc").unwrap(), b"abc");
    }

    #[test]
    fn unsupported_hash_errors() {
        assert!(matches!(
            do_hash(HashOp::Sha512, b"x"),
            Err(VerifyError::UnsupportedOperator(_))
        ));
    }

    #[test]
    fn varint_matches_protobuf_leb128() {
        assert_eq!(encode_varint(0), vec![0]);
        assert_eq!(encode_varint(4), vec![4]);
        assert_eq!(encode_varint(300), vec![0xac, 0x02]);
    }

    #[test]
    fn require_32_bytes_rejects_wrong_length() {
        assert!(do_length_op(LengthOp::Require32Bytes, b"short").is_err());
    }
}
