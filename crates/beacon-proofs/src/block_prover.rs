//! Block-level Proof Extractors

use ssz_rs::HashTreeRoot;
use tracing::{debug, instrument};

use crate::codec::BeaconBlock;
use crate::gindex::{frame, GindexCalculator};
use crate::proof::{Proof, ProofError};
use crate::schema::Fork;
use crate::sparse_proof::{MerkleTree, ProofSource};
use crate::tree::block_tree;
use crate::types::Hash32;

/// Proof generator for one decoded block.
#[derive(Debug)]
pub struct BlockProver {
    calculator: GindexCalculator,
    block: BeaconBlock,
    tree: MerkleTree,
    block_root: Hash32,
}

impl BlockProver {
    /// Hash `block` with its withdrawals expanded.
    ///
    /// # Errors
    /// `Merkleization` if the block cannot be hashed.
    #[instrument(skip_all, fields(fork = %block.fork(), slot = block.slot()))]
    pub fn new(block: BeaconBlock) -> Result<Self, ProofError> {
        let calculator = GindexCalculator::new(block.fork());
        let tree = block_tree(&block)?;
        let block_root = tree.hash_tree_root();
        debug!(block_root = %hex::encode(block_root), "Block prover ready");
        Ok(Self {
            calculator,
            block,
            tree,
            block_root,
        })
    }

    #[must_use]
    pub fn fork(&self) -> Fork {
        self.calculator.schema().fork
    }

    #[must_use]
    pub const fn calculator(&self) -> &GindexCalculator {
        &self.calculator
    }

    #[must_use]
    pub fn slot(&self) -> u64 {
        self.block.slot()
    }

    #[must_use]
    pub const fn block_root(&self) -> Hash32 {
        self.block_root
    }

    #[must_use]
    pub fn withdrawal_count(&self) -> u64 {
        self.block.execution_payload().withdrawals.len() as u64
    }

    /// `body.execution_payload.withdrawals[index]`, proven up to the block root.
    ///
    /// # Errors
    /// `IndexOutOfBounds` past the block's withdrawal count.
    pub fn withdrawal_proof(
        &self,
        index: u64,
    ) -> Result<Proof<frame::BeaconBlock, frame::Field>, ProofError> {
        let count = self.withdrawal_count();
        if index >= count {
            return Err(ProofError::IndexOutOfBounds {
                collection: "withdrawals",
                index,
                limit: count,
            });
        }
        let proof = Proof::from_source(&self.tree, self.calculator.withdrawal_in_block(index)?)?;
        debug!(index, gindex = proof.gindex(), "Withdrawal proof");
        Ok(proof)
    }

    /// Rebuild the block's header with `ssz_rs` and compare its root to the
    /// cached block root.
    ///
    /// # Errors
    /// `RootMismatch` if the two disagree.
    pub fn self_check(&self) -> Result<(), ProofError> {
        let expected: Hash32 = self.block.header()?.hash_tree_root()?.into();
        if expected != self.block_root {
            return Err(ProofError::RootMismatch {
                what: "block",
                expected,
                actual: self.block_root,
            });
        }
        Ok(())
    }
}
