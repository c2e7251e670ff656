//! Proof segments, their composition, and the JSON record handed to callers.
//!
//! A [`Proof<F, T>`] is a leaf plus branch whose index is typed by the tree it
//! was taken from (`F`) and the object it proves (`T`). Segments from
//! independently rooted trees are joined with [`Proof::then`], which
//! concatenates the branches leaf-to-root and re-roots the index, so the
//! composed proof verifies against the outermost root.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::gindex::frame::Frame;
use crate::gindex::{Gindex, RelativeIndex};
use crate::schema::Fork;
use crate::sparse_proof::ProofSource;
use crate::types::{hex_bytes32, proof_vec_serde, Hash32};
use crate::verify::{fold, verify_proof, VerifyError};

/// Errors that can occur during proof generation.
#[derive(Error, Debug)]
pub enum ProofError {
    #[error("{collection} index {index} out of bounds (limit {limit})")]
    IndexOutOfBounds {
        collection: &'static str,
        index: u64,
        limit: u64,
    },

    #[error("Unsupported fork: {0}")]
    UnsupportedFork(String),

    #[error("Failed to decode {object}: {source}")]
    Codec {
        object: &'static str,
        source: ssz_rs::DeserializeError,
    },

    #[error("SSZ merkleization error: {0}")]
    Merkleization(#[from] ssz_rs::MerkleizationError),

    #[error("{container} has no field `{field}`")]
    UnknownField {
        container: &'static str,
        field: &'static str,
    },

    #[error("gindex {gindex} descends below an unexpanded node at depth {depth}")]
    OpaqueSubtree { gindex: u64, depth: u32 },

    #[error("Invalid gindex {0}")]
    InvalidGindex(Gindex),

    #[error(
        "{what} leaf mismatch: expected 0x{}, got 0x{}",
        hex::encode(.expected),
        hex::encode(.actual)
    )]
    LeafMismatch {
        what: &'static str,
        expected: Hash32,
        actual: Hash32,
    },

    #[error(
        "{what} root mismatch: expected 0x{}, got 0x{}",
        hex::encode(.expected),
        hex::encode(.actual)
    )]
    RootMismatch {
        what: &'static str,
        expected: Hash32,
        actual: Hash32,
    },

    #[error("Slot {slot} has left the block_roots ring buffer of the state at slot {state_slot}")]
    SlotNotRecent { slot: u64, state_slot: u64 },

    #[error("Slot {slot} is not yet covered by a historical summary at state slot {state_slot}")]
    SlotNotHistorical { slot: u64, state_slot: u64 },

    #[error("State slot {state_slot} is not the first slot of an era")]
    UnalignedState { state_slot: u64 },

    #[error("Slot {slot} is outside the era that ended at state slot {state_slot}")]
    SlotOutsideEra { slot: u64, state_slot: u64 },

    #[error(transparent)]
    Verification(#[from] VerifyError),
}

/// A Merkle branch for `T` inside a tree rooted at `F`.
pub struct Proof<F, T> {
    leaf: Hash32,
    branch: Vec<Hash32>,
    index: RelativeIndex<F, T>,
}

impl<F, T> Proof<F, T> {
    /// Take the segment at `index` from `source`.
    ///
    /// # Errors
    /// Whatever `source` reports for `index`.
    pub fn from_source(
        source: &impl ProofSource,
        index: RelativeIndex<F, T>,
    ) -> Result<Self, ProofError> {
        let gindex =
            u64::try_from(index.value()).map_err(|_| ProofError::InvalidGindex(index.value()))?;
        let proof = source.prove(gindex)?;
        Ok(Self {
            leaf: proof.leaf,
            branch: proof.branch,
            index,
        })
    }

    #[must_use]
    pub const fn index(&self) -> RelativeIndex<F, T> {
        self.index
    }

    /// Generalized index of the leaf relative to the proof's root.
    #[must_use]
    pub const fn gindex(&self) -> Gindex {
        self.index.value()
    }

    #[must_use]
    pub const fn leaf(&self) -> &Hash32 {
        &self.leaf
    }

    #[must_use]
    pub fn branch(&self) -> &[Hash32] {
        &self.branch
    }

    #[must_use]
    pub fn into_branch(self) -> Vec<Hash32> {
        self.branch
    }

    /// The root this proof folds to.
    ///
    /// # Errors
    /// `Verification` if the branch length disagrees with the index.
    pub fn root(&self) -> Result<Hash32, ProofError> {
        Ok(fold(&self.leaf, &self.branch, self.index.value())?)
    }

    /// Check the proof against a trusted root.
    ///
    /// # Errors
    /// `Verification` with `MalformedProof` or `ProofMismatch`.
    pub fn verify(&self, root: &Hash32) -> Result<(), ProofError> {
        Ok(verify_proof(&self.leaf, &self.branch, self.index.value(), root)?)
    }
}

impl<F: Frame, T> Proof<F, T> {
    /// Extend this proof with `outer`, which proves this proof's root inside a
    /// larger tree `G`.
    ///
    /// # Errors
    /// `LeafMismatch` if `outer` does not prove the root this proof folds to.
    pub fn then<G>(self, outer: Proof<G, F>) -> Result<Proof<G, T>, ProofError> {
        let root = self.root()?;
        if root != outer.leaf {
            return Err(ProofError::LeafMismatch {
                what: F::NAME,
                expected: root,
                actual: outer.leaf,
            });
        }

        let mut branch = self.branch;
        branch.extend_from_slice(&outer.branch);
        Ok(Proof {
            leaf: self.leaf,
            branch,
            index: self.index.within(outer.index),
        })
    }
}

impl<F, T> Clone for Proof<F, T> {
    fn clone(&self) -> Self {
        Self {
            leaf: self.leaf,
            branch: self.branch.clone(),
            index: self.index,
        }
    }
}

impl<F, T> PartialEq for Proof<F, T> {
    fn eq(&self, other: &Self) -> bool {
        self.leaf == other.leaf && self.branch == other.branch && self.index == other.index
    }
}

impl<F, T> Eq for Proof<F, T> {}

impl<F: Frame, T: Frame> fmt::Debug for Proof<F, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Proof")
            .field("leaf", &hex::encode(self.leaf))
            .field("rows", &self.branch.len())
            .field("index", &self.index)
            .finish()
    }
}

/// The fact a [`ProofRecord`] attests to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactKind {
    ValidatorCredentials,
    ValidatorWithdrawableEpoch,
    Withdrawal,
    BlockRoot,
    HistoricalSummary,
    HistoricalBlockRoot,
}

impl fmt::Display for FactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ValidatorCredentials => "validator_credentials",
            Self::ValidatorWithdrawableEpoch => "validator_withdrawable_epoch",
            Self::Withdrawal => "withdrawal",
            Self::BlockRoot => "block_root",
            Self::HistoricalSummary => "historical_summary",
            Self::HistoricalBlockRoot => "historical_block_root",
        };
        f.write_str(name)
    }
}

/// A proof flattened for transport: the receiver already knows `kind` and
/// `selector`, so `gindex`, `leaf` and `root` are included only for
/// self-checking.
///
/// `root` is the trusted root the record was checked against when built, not
/// whatever the branch happens to fold to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofRecord {
    pub fork: Fork,
    pub kind: FactKind,

    /// Validator index, withdrawal index, or slot
    pub selector: u64,

    pub gindex: Gindex,

    #[serde(with = "hex_bytes32")]
    pub leaf: Hash32,

    /// Trusted root the proof folds to (block root for state facts)
    #[serde(with = "hex_bytes32")]
    pub root: Hash32,

    #[serde(with = "proof_vec_serde")]
    pub proof: Vec<Hash32>,
}

impl ProofRecord {
    /// Flatten `proof` after checking that it folds to `trusted_root`.
    ///
    /// # Errors
    /// `Verification` if the proof is malformed, `RootMismatch` if it folds
    /// to any other root.
    pub fn new<F, T>(
        fork: Fork,
        kind: FactKind,
        selector: u64,
        proof: Proof<F, T>,
        trusted_root: Hash32,
    ) -> Result<Self, ProofError> {
        let root = proof.root()?;
        if root != trusted_root {
            return Err(ProofError::RootMismatch {
                what: "proof record",
                expected: trusted_root,
                actual: root,
            });
        }
        Ok(Self {
            fork,
            kind,
            selector,
            gindex: proof.gindex(),
            leaf: proof.leaf,
            root,
            proof: proof.into_branch(),
        })
    }

    /// Re-fold the record against a root obtained independently of it.
    ///
    /// # Errors
    /// `RootMismatch` if the record claims a different root, `Verification`
    /// if the branch does not fold to `trusted_root`.
    pub fn verify(&self, trusted_root: &Hash32) -> Result<(), ProofError> {
        if self.root != *trusted_root {
            return Err(ProofError::RootMismatch {
                what: "proof record",
                expected: *trusted_root,
                actual: self.root,
            });
        }
        Ok(verify_proof(&self.leaf, &self.proof, self.gindex, trusted_root)?)
    }
}
