//! Vector-commitment membership and non-membership proof verifier for
//! Merkle commitment roots (ICS-23 style).
//!
//! The crate is organized the way the operator model reads: [`hash`] and
//! [`ops`] are the leaf/inner primitives, [`spec`] pins a tree's shape so a
//! proof can't equivocate on it, [`existence`] and [`nonexistence`] verify
//! single claims against a root, [`proof`] dispatches the generic
//! [`CommitmentProof`] envelope (including batches), [`compress`] handles
//! the batch-compression wire optimization, and [`webcat`] is a sidecar
//! verifier for a sparse-Merkle construction chained to an application
//! hash.
//!
//! The public surface is deliberately asymmetric: the internal routines
//! return a typed [`error::VerifyError`] so failures are diagnosable, but
//! [`verify_membership`], [`verify_non_membership`], the batch variants,
//! and [`verify_webcat_proof`] catch everything and collapse it to a
//! `bool`/`Option` -- a membership check must never panic or propagate an
//! error past this crate's boundary.

pub mod compress;
pub mod error;
pub mod existence;
pub mod hash;
pub mod nonexistence;
pub mod ops;
pub mod proof;
pub mod spec;
pub mod webcat;

pub use compress::{compress, decompress};
pub use error::{VerifyError, VerifyResult};
pub use existence::{calculate_existence_root, verify_existence, ExistenceProof};
pub use hash::{do_hash, do_hash_or_noop, do_length_op, HashOp, LengthOp};
pub use nonexistence::{verify_non_existence, NonExistenceProof};
pub use ops::{apply_inner, apply_leaf, InnerOp, LeafOp};
pub use proof::{
    batch_verify_membership, batch_verify_non_membership, verify_membership,
    verify_non_membership, BatchEntry, BatchProof, CommitmentProof,
};
pub use spec::{ensure_spec, iavl_spec, smt_spec, tendermint_spec, webcat_spec, InnerSpec, ProofSpec};
pub use webcat::{verify_webcat_proof, WebcatLeaf, WebcatLeafInput, WebcatProofData};
