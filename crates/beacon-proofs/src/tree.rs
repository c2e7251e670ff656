//! Proof Source builders for beacon objects.
//!
//! Each builder hashes its object once and expands only the subtrees that
//! extractors descend into; all other fields become opaque leaves.

use rayon::prelude::*;
use ssz_rs::HashTreeRoot;
use tracing::{debug, instrument};

use crate::beacon_state::{
    BeaconBlockHeader, HistoricalSummaryLists, Validator, HISTORICAL_ROOTS_LIMIT,
    MAX_WITHDRAWALS_PER_PAYLOAD, SLOTS_PER_HISTORICAL_ROOT, VALIDATOR_REGISTRY_LIMIT,
};
use crate::codec::{per_fork, BeaconBlock, BeaconState};
use crate::proof::ProofError;
use crate::sparse_proof::{ChunkTree, MerkleTree, Subtree};
use crate::types::{FieldRoots, Hash32};

/// Container tree of `value` with the named fields replaced by expanded subtrees.
///
/// # Errors
/// `UnknownField` if a name is not a field of `C`.
pub fn container_with<C: FieldRoots>(
    value: &C,
    expanded: Vec<(&'static str, Subtree)>,
) -> Result<ChunkTree, ProofError> {
    let mut children = Vec::with_capacity(expanded.len());
    for (name, subtree) in expanded {
        let position = C::field_position(name).ok_or(ProofError::UnknownField {
            container: C::NAME,
            field: name,
        })?;
        children.push((position, subtree));
    }

    let roots = (0..C::FIELD_COUNT)
        .map(|i| match children.iter().find(|(position, _)| *position == i) {
            Some((_, subtree)) => Ok(subtree.root()),
            None => value.field_root(i),
        })
        .collect::<Result<Vec<_>, _>>()?;

    children
        .into_iter()
        .try_fold(Subtree::container(roots)?, |tree, (position, subtree)| {
            tree.with_child(position as u64, subtree)
        })
}

/// Roots of every element, hashed in parallel.
fn element_roots<T>(elements: &[T]) -> Result<Vec<Hash32>, ProofError>
where
    T: HashTreeRoot + Sync,
{
    elements
        .par_iter()
        .map(|element| -> Result<Hash32, ProofError> { Ok(element.hash_tree_root()?.into()) })
        .collect()
}

/// A single validator, all 8 fields as leaves.
///
/// # Errors
/// `Merkleization` if a field cannot be hashed.
pub fn validator_tree(validator: &Validator) -> Result<MerkleTree, ProofError> {
    Ok(MerkleTree::new(Subtree::container(validator.field_roots()?)?))
}

/// A block header, all 5 fields as leaves.
///
/// # Errors
/// `Merkleization` if a field cannot be hashed.
pub fn header_tree(header: &BeaconBlockHeader) -> Result<MerkleTree, ProofError> {
    Ok(MerkleTree::new(Subtree::container(header.field_roots()?)?))
}

/// One era's `{block_roots, state_roots}` with `block_roots` expanded.
///
/// # Errors
/// `Merkleization` if `state_roots` cannot be hashed.
pub fn summary_lists_tree(lists: &HistoricalSummaryLists) -> Result<MerkleTree, ProofError> {
    let block_roots = Subtree::vector(
        lists.block_roots.iter().copied().collect(),
        SLOTS_PER_HISTORICAL_ROOT as u64,
    )?;
    let tree = container_with(lists, vec![("block_roots", block_roots.into())])?;
    Ok(MerkleTree::new(tree))
}

/// A state with `validators`, `block_roots` and `historical_summaries` expanded.
///
/// Also returns the per-validator roots so callers can check registry leaves
/// without rehashing.
///
/// # Errors
/// `Merkleization` if any field cannot be hashed.
#[instrument(skip_all, fields(fork = %state.fork(), slot = state.slot()))]
pub fn state_tree(state: &BeaconState) -> Result<(MerkleTree, Vec<Hash32>), ProofError> {
    let validator_roots = element_roots(state.validators())?;
    debug!(count = validator_roots.len(), "Hashed validators");

    let validators = Subtree::list(validator_roots.clone(), VALIDATOR_REGISTRY_LIMIT as u64)?;
    let block_roots = Subtree::vector(
        state.block_roots().iter().copied().collect(),
        SLOTS_PER_HISTORICAL_ROOT as u64,
    )?;
    let summaries = Subtree::list(
        element_roots(state.historical_summaries())?,
        HISTORICAL_ROOTS_LIMIT as u64,
    )?;

    let expanded = vec![
        ("block_roots", block_roots.into()),
        ("validators", validators),
        ("historical_summaries", summaries),
    ];
    let tree = per_fork!(state, BeaconState, state => container_with(&**state, expanded)?);
    Ok((MerkleTree::new(tree), validator_roots))
}

/// A block with `body.execution_payload.withdrawals` expanded.
///
/// # Errors
/// `Merkleization` if any field cannot be hashed.
#[instrument(skip_all, fields(fork = %block.fork(), slot = block.slot()))]
pub fn block_tree(block: &BeaconBlock) -> Result<MerkleTree, ProofError> {
    let payload = block.execution_payload();
    let withdrawals = Subtree::list(
        element_roots(&payload.withdrawals[..])?,
        MAX_WITHDRAWALS_PER_PAYLOAD as u64,
    )?;
    let payload = container_with(payload, vec![("withdrawals", withdrawals)])?;
    let tree = per_fork!(block, BeaconBlock, block => {
        let body = container_with(&block.body, vec![("execution_payload", payload.into())])?;
        container_with(&**block, vec![("body", body.into())])?
    });
    Ok(MerkleTree::new(tree))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beacon_state::{
        BeaconBlockDeneb, BeaconBlockElectra, BeaconStateDeneb, BeaconStateElectra,
        HistoricalSummary, PendingDeposit, Withdrawal,
    };
    use crate::sparse_proof::ProofSource;
    use crate::verify::verify_proof;

    fn make_validator(index: u8) -> Validator {
        let mut v = Validator::default();
        v.withdrawal_credentials[0] = 0x01;
        v.withdrawal_credentials[12..32].copy_from_slice(&[index; 20]);
        v.withdrawable_epoch = 1000 + u64::from(index);
        v.effective_balance = 32_000_000_000;
        v
    }

    #[test]
    fn test_state_root_matches_ssz_rs() {
        let mut state = BeaconStateDeneb {
            slot: 1000,
            genesis_time: 1_234_567_890,
            ..Default::default()
        };
        for i in 0..5u8 {
            state.validators.push(make_validator(i));
            state.balances.push(32_000_000_000);
        }
        state.block_roots[7] = [0x77; 32];
        state.historical_summaries.push(HistoricalSummary {
            block_summary_root: [1; 32],
            state_summary_root: [2; 32],
        });

        let expected: Hash32 = state.hash_tree_root().unwrap().into();
        let (tree, validator_roots) = state_tree(&state.into()).unwrap();
        assert_eq!(tree.hash_tree_root(), expected, "Sparse state root doesn't match ssz_rs");
        assert_eq!(validator_roots.len(), 5);
    }

    #[test]
    fn test_block_root_matches_ssz_rs() {
        let mut block = BeaconBlockDeneb {
            slot: 99,
            ..Default::default()
        };
        for i in 0..3u64 {
            block.body.execution_payload.withdrawals.push(Withdrawal {
                index: i,
                validator_index: 10 + i,
                address: [0xab; 20],
                amount: 1_000 * i,
            });
        }

        let expected: Hash32 = block.hash_tree_root().unwrap().into();
        let tree = block_tree(&block.clone().into()).unwrap();
        assert_eq!(tree.hash_tree_root(), expected);

        // withdrawals[2] sits at 206272 + 2
        let proof = tree.prove(206_274).unwrap();
        let leaf: Hash32 = block.body.execution_payload.withdrawals[2]
            .hash_tree_root()
            .unwrap()
            .into();
        assert_eq!(proof.leaf, leaf);
        verify_proof(&leaf, &proof.branch, 206_274, &expected).unwrap();
    }

    #[test]
    fn test_electra_state_root_matches_ssz_rs() {
        let mut state = BeaconStateElectra {
            slot: 3_000_000,
            deposit_balance_to_consume: 64_000_000_000,
            ..Default::default()
        };
        for i in 0..3u8 {
            state.validators.push(make_validator(i));
        }
        state.block_roots[9] = [0x99; 32];
        state.pending_deposits.push(PendingDeposit {
            amount: 32_000_000_000,
            slot: 2_999_999,
            ..Default::default()
        });

        let expected: Hash32 = state.hash_tree_root().unwrap().into();
        let (tree, _) = state_tree(&state.clone().into()).unwrap();
        assert_eq!(tree.hash_tree_root(), expected);

        // validators[2] sits under the 64-chunk state ceiling: (64 + 11) * 2 << 40
        let proof = tree.prove((150 << 40) + 2).unwrap();
        let leaf: Hash32 = state.validators[2].hash_tree_root().unwrap().into();
        assert_eq!(proof.leaf, leaf);
        assert_eq!(proof.branch.len(), 6 + 1 + 40);
    }

    #[test]
    fn test_electra_block_root_matches_ssz_rs() {
        let mut block = BeaconBlockElectra {
            slot: 4_000_000,
            ..Default::default()
        };
        block.body.execution_payload.withdrawals.push(Withdrawal {
            index: 1,
            validator_index: 2,
            address: [0x0c; 20],
            amount: 3,
        });

        let expected: Hash32 = block.hash_tree_root().unwrap().into();
        let tree = block_tree(&block.clone().into()).unwrap();
        assert_eq!(tree.hash_tree_root(), expected);

        // Same withdrawal path as Deneb: the body still fits 16 chunks.
        let proof = tree.prove(206_272).unwrap();
        let leaf: Hash32 = block.body.execution_payload.withdrawals[0]
            .hash_tree_root()
            .unwrap()
            .into();
        verify_proof(&leaf, &proof.branch, 206_272, &expected).unwrap();
    }

    #[test]
    fn test_summary_lists_tree_root() {
        let mut lists = HistoricalSummaryLists::default();
        lists.block_roots[100] = [0x42; 32];
        let expected: Hash32 = lists.hash_tree_root().unwrap().into();
        let tree = summary_lists_tree(&lists).unwrap();
        assert_eq!(tree.hash_tree_root(), expected);

        let proof = tree.prove(2 * 8192 + 100).unwrap();
        assert_eq!(proof.leaf, [0x42; 32]);
        assert_eq!(proof.branch.len(), 14);
    }

    #[test]
    fn test_container_with_unknown_field() {
        let err = container_with(&Validator::default(), vec![("balance", Subtree::Leaf([0; 32]))])
            .unwrap_err();
        assert!(matches!(
            err,
            ProofError::UnknownField { container: "Validator", field: "balance" }
        ));
    }

    #[test]
    fn test_header_tree_state_root_leaf() {
        let header = BeaconBlockHeader {
            slot: 1,
            proposer_index: 2,
            parent_root: [3; 32],
            state_root: [4; 32],
            body_root: [5; 32],
        };
        let tree = header_tree(&header).unwrap();
        let proof = tree.prove(11).unwrap();
        assert_eq!(proof.leaf, [4; 32]);
        assert_eq!(proof.branch.len(), 3);
        let expected: Hash32 = header.hash_tree_root().unwrap().into();
        assert_eq!(tree.hash_tree_root(), expected);
    }
}
