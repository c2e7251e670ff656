//! Cross-snapshot proof chains.
//!
//! A withdrawal lives in a block, but callers usually trust a later block
//! root. These helpers join a block proof to the state that remembers that
//! block, either through the recent `block_roots` ring buffer or through a
//! `historical_summaries` entry.

use tracing::debug;

use crate::block_prover::BlockProver;
use crate::gindex::frame;
use crate::proof::{Proof, ProofError};
use crate::state_prover::StateProver;

/// `withdrawals[index]` of `block`, proven up to the block root of `state`
/// through `state.block_roots`.
///
/// # Errors
/// `SlotNotRecent` if `state` no longer holds the block's root, `RootMismatch`
/// if it holds a different root at that slot.
pub fn recent_withdrawal_proof(
    block: &BlockProver,
    state: &StateProver,
    index: u64,
) -> Result<Proof<frame::BlockHeader, frame::Field>, ProofError> {
    let withdrawal = block.withdrawal_proof(index)?;
    let placed = state.block_root_proof(block.slot())?;
    if *placed.leaf() != block.block_root() {
        return Err(ProofError::RootMismatch {
            what: "block_roots entry",
            expected: block.block_root(),
            actual: *placed.leaf(),
        });
    }

    let proof = withdrawal.then(placed)?;
    debug!(
        index,
        block_slot = block.slot(),
        state_slot = state.slot(),
        gindex = proof.gindex(),
        "Recent withdrawal proof"
    );
    Ok(proof)
}

/// `withdrawals[index]` of `block`, proven up to the block root of `state`
/// through the historical summary of the block's era.
///
/// `era_state` is the state at the first slot after that era, whose ring
/// buffers the summary committed to.
///
/// # Errors
/// `RootMismatch` if `era_state` does not hold the block's root, or its
/// buffers do not hash to the summary recorded in `state`.
pub fn historical_withdrawal_proof(
    block: &BlockProver,
    era_state: &StateProver,
    state: &StateProver,
    index: u64,
) -> Result<Proof<frame::BlockHeader, frame::Field>, ProofError> {
    let withdrawal = block.withdrawal_proof(index)?;

    let in_era = era_state.historical_summary_block_root_proof(block.slot())?;
    if *in_era.leaf() != block.block_root() {
        return Err(ProofError::RootMismatch {
            what: "era block_roots entry",
            expected: block.block_root(),
            actual: *in_era.leaf(),
        });
    }

    let summary = state.historical_summary_proof(block.slot())?;
    let era_root = in_era.root()?;
    if era_root != *summary.leaf() {
        return Err(ProofError::RootMismatch {
            what: "historical summary",
            expected: *summary.leaf(),
            actual: era_root,
        });
    }

    let proof = withdrawal.then(in_era)?.then(summary)?;
    debug!(
        index,
        block_slot = block.slot(),
        state_slot = state.slot(),
        gindex = proof.gindex(),
        "Historical withdrawal proof"
    );
    Ok(proof)
}
