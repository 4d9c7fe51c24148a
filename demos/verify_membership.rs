// Example usage of the ics23-verify library
// Builds a tiny one-leaf tree and verifies membership and non-membership
// against it using the Tendermint built-in spec.

use ics23_verify::{
    tendermint_spec, verify_membership, verify_non_membership, CommitmentProof, ExistenceProof,
    HashOp, LeafOp, LengthOp, NonExistenceProof,
};

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

fn main() {
    tracing_subscriber::fmt::init();

    let spec = tendermint_spec();

    let exist = leaf(b"account/alice", b"100");
    let root = ics23_verify::calculate_existence_root(&exist).expect("leaf-only root");
    let proof = CommitmentProof::Exist(exist);

    println!(
        "membership of account/alice=100: {}",
        verify_membership(&proof, &spec, &root, b"account/alice", b"100")
    );
    println!(
        "membership of account/alice=999 (wrong value): {}",
        verify_membership(&proof, &spec, &root, b"account/alice", b"999")
    );

    // A single-leaf tree has no room for a witnessed non-membership
    // bracket, so this always reports false here -- a real non-membership
    // check needs a NonExistenceProof with left/right neighbors.
    let non_exist = NonExistenceProof {
        key: b"account/bob".to_vec(),
        left: None,
        right: None,
    };
    let non_exist_proof = CommitmentProof::NonExist(non_exist);
    println!(
        "non-membership of account/bob: {}",
        verify_non_membership(&non_exist_proof, &spec, &root, b"account/bob")
    );
}
