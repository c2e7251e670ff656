//! Reference proof fold.
//!
//! Any remote verifier has to fold in exactly this order: siblings from the
//! leaf upwards, with the parity of the running gindex choosing which side the
//! current node goes on.

use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::gindex::Gindex;
use crate::types::Hash32;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    #[error("Malformed proof: gindex {gindex} does not match {rows} proof rows")]
    MalformedProof { gindex: Gindex, rows: usize },

    #[error(
        "Proof mismatch: expected root 0x{}, computed 0x{}",
        hex::encode(.expected),
        hex::encode(.computed)
    )]
    ProofMismatch { expected: Hash32, computed: Hash32 },
}

/// Fold `leaf` up through `proof` and return the root it commits to.
///
/// # Errors
/// `MalformedProof` if the number of rows does not match the depth of `gindex`.
pub fn fold(leaf: &Hash32, proof: &[Hash32], gindex: Gindex) -> Result<Hash32, VerifyError> {
    let malformed = || VerifyError::MalformedProof {
        gindex,
        rows: proof.len(),
    };
    if gindex == 0 || (proof.is_empty() && gindex != 1) {
        return Err(malformed());
    }

    let mut current = *leaf;
    let mut g = gindex;
    let mut hasher = Sha256::new();
    for (row, sibling) in proof.iter().enumerate() {
        if row + 1 == proof.len() && g != 2 && g != 3 {
            return Err(malformed());
        }
        if g & 1 == 1 {
            hasher.update(sibling);
            hasher.update(current);
        } else {
            hasher.update(current);
            hasher.update(sibling);
        }
        current = hasher.finalize_reset().into();
        g /= 2;
    }
    Ok(current)
}

/// Check that `leaf` at `gindex` folds to `expected_root`.
///
/// # Errors
/// `MalformedProof` on a length/gindex disagreement, `ProofMismatch` when the
/// folded root differs.
pub fn verify_proof(
    leaf: &Hash32,
    proof: &[Hash32],
    gindex: Gindex,
    expected_root: &Hash32,
) -> Result<(), VerifyError> {
    let computed = fold(leaf, proof, gindex)?;
    if computed != *expected_root {
        return Err(VerifyError::ProofMismatch {
            expected: *expected_root,
            computed,
        });
    }
    Ok(())
}
