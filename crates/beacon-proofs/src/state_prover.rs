//! State-level Proof Extractors
//!
//! Generates proofs of beacon state facts up to the block root, using the
//! sparse tree overlay. Works with real registry limits (2^40 validators)
//! without allocating full Merkle trees.
//!
//! Every proof is three segments, concatenated leaf to root:
//! 1. the fact inside its own object (a validator, or nothing)
//! 2. that object inside the state
//! 3. the state root inside the latest block header

use ssz_rs::HashTreeRoot;
use tracing::{debug, instrument};

use crate::beacon_state::{HistoricalSummary, HistoricalSummaryLists};
use crate::codec::BeaconState;
use crate::gindex::{frame, Gindex, GindexCalculator};
use crate::proof::{Proof, ProofError};
use crate::schema::Fork;
use crate::sparse_proof::{MerkleTree, ProofSource};
use crate::tree::{header_tree, state_tree, summary_lists_tree, validator_tree};
use crate::types::Hash32;

/// Validator fields a proof can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidatorField {
    /// The `pubkey`/`withdrawal_credentials` pair node
    Credentials,
    WithdrawableEpoch,
}

/// Proof generator for one decoded state.
///
/// Construction hashes the whole state once; every extractor afterwards only
/// walks cached layers, so a single prover can be shared across threads.
#[derive(Debug)]
pub struct StateProver {
    calculator: GindexCalculator,
    state: BeaconState,
    state_tree: MerkleTree,
    state_root: Hash32,
    validator_roots: Vec<Hash32>,
    block_root: Hash32,
    header_segment: Proof<frame::BlockHeader, frame::BeaconState>,
    summary_offset: u64,
}

impl StateProver {
    /// Hash `state` and cache the header → state segment.
    ///
    /// # Errors
    /// `Merkleization` if the state cannot be hashed.
    #[instrument(skip_all, fields(fork = %state.fork(), slot = state.slot()))]
    pub fn new(state: BeaconState) -> Result<Self, ProofError> {
        let calculator = GindexCalculator::new(state.fork());

        let (state_tree, validator_roots) = state_tree(&state)?;
        let state_root = state_tree.hash_tree_root();

        let mut header = state.latest_block_header().clone();
        header.state_root = state_root;
        let header_tree = header_tree(&header)?;
        let block_root = header_tree.hash_tree_root();
        let header_segment =
            Proof::from_source(&header_tree, calculator.state_root_in_header()?)?;

        debug!(
            state_root = %hex::encode(state_root),
            block_root = %hex::encode(block_root),
            "State prover ready"
        );

        Ok(Self {
            calculator,
            state,
            state_tree,
            state_root,
            validator_roots,
            block_root,
            header_segment,
            summary_offset: 0,
        })
    }

    /// Set the era of the first `historical_summaries` entry (the Capella
    /// fork era on networks that did not start at Capella).
    #[must_use]
    pub const fn with_summary_offset(mut self, era: u64) -> Self {
        self.summary_offset = era;
        self
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
        self.state.slot()
    }

    #[must_use]
    pub fn validator_count(&self) -> u64 {
        self.validator_roots.len() as u64
    }

    /// `hash_tree_root(state)`
    #[must_use]
    pub const fn state_root(&self) -> Hash32 {
        self.state_root
    }

    /// Root of `latest_block_header` with the computed state root filled in.
    #[must_use]
    pub const fn block_root(&self) -> Hash32 {
        self.block_root
    }

    /// The state root inside the block header.
    #[must_use]
    pub fn state_root_proof(&self) -> Proof<frame::BlockHeader, frame::BeaconState> {
        self.header_segment.clone()
    }

    fn slots_per_historical_root(&self) -> u64 {
        self.calculator.schema().slots_per_historical_root
    }

    /// `validators[index]` inside the state.
    ///
    /// # Errors
    /// `IndexOutOfBounds` past the registry length.
    pub fn validator_segment(
        &self,
        index: u64,
    ) -> Result<Proof<frame::BeaconState, frame::Validator>, ProofError> {
        let expected = usize::try_from(index)
            .ok()
            .and_then(|i| self.validator_roots.get(i))
            .ok_or(ProofError::IndexOutOfBounds {
                collection: "validators",
                index,
                limit: self.validator_count(),
            })?;

        let segment =
            Proof::from_source(&self.state_tree, self.calculator.validator_in_state(index)?)?;
        if segment.leaf() != expected {
            return Err(ProofError::LeafMismatch {
                what: "validator registry",
                expected: *expected,
                actual: *segment.leaf(),
            });
        }
        Ok(segment)
    }

    /// A validator field, proven up to the block root.
    ///
    /// # Errors
    /// `IndexOutOfBounds` past the registry length.
    pub fn validator_proof(
        &self,
        index: u64,
        field: ValidatorField,
    ) -> Result<Proof<frame::BlockHeader, frame::Field>, ProofError> {
        let local = match field {
            ValidatorField::Credentials => self.calculator.validator_credentials()?,
            ValidatorField::WithdrawableEpoch => self.calculator.validator_withdrawable_epoch()?,
        };
        let placed = self.validator_segment(index)?;
        // Bounds were checked by `validator_segment`.
        let validator = &self.state.validators()[index as usize];

        let proof = Proof::from_source(&validator_tree(validator)?, local)?
            .then(placed)?
            .then(self.state_root_proof())?;
        debug!(
            index,
            ?field,
            gindex = proof.gindex(),
            rows = proof.branch().len(),
            "Validator proof"
        );
        Ok(proof)
    }

    /// `validators[index].withdrawal_credentials` (with the pubkey root as the
    /// first sibling), proven up to the block root.
    ///
    /// # Errors
    /// `IndexOutOfBounds` past the registry length.
    pub fn validator_credentials_proof(
        &self,
        index: u64,
    ) -> Result<Proof<frame::BlockHeader, frame::Field>, ProofError> {
        self.validator_proof(index, ValidatorField::Credentials)
    }

    /// `validators[index].withdrawable_epoch`, proven up to the block root.
    ///
    /// # Errors
    /// `IndexOutOfBounds` past the registry length.
    pub fn validator_withdrawable_epoch_proof(
        &self,
        index: u64,
    ) -> Result<Proof<frame::BlockHeader, frame::Field>, ProofError> {
        self.validator_proof(index, ValidatorField::WithdrawableEpoch)
    }

    /// `block_roots[slot % 8192]` inside the state.
    ///
    /// Slots ahead of the state are accepted: their ring-buffer entry still
    /// exists, it just holds an older root.
    ///
    /// # Errors
    /// `SlotNotRecent` once `slot` has been overwritten in the ring buffer.
    pub fn block_root_segment(
        &self,
        slot: u64,
    ) -> Result<Proof<frame::BeaconState, frame::BeaconBlock>, ProofError> {
        let state_slot = self.slot();
        if slot.saturating_add(self.slots_per_historical_root()) <= state_slot {
            return Err(ProofError::SlotNotRecent { slot, state_slot });
        }
        Proof::from_source(&self.state_tree, self.calculator.block_root_in_state(slot)?)
    }

    /// `block_roots[slot % 8192]`, proven up to the block root.
    ///
    /// # Errors
    /// As [`Self::block_root_segment`].
    pub fn block_root_proof(
        &self,
        slot: u64,
    ) -> Result<Proof<frame::BlockHeader, frame::BeaconBlock>, ProofError> {
        let proof = self.block_root_segment(slot)?.then(self.state_root_proof())?;
        debug!(slot, gindex = proof.gindex(), "Block root proof");
        Ok(proof)
    }

    /// `historical_summaries[i]` for the era containing `slot`, inside the state.
    ///
    /// # Errors
    /// `SlotNotHistorical` if the era is not summarised yet (or predates the
    /// summary offset), `IndexOutOfBounds` past the list.
    pub fn historical_summary_segment(
        &self,
        slot: u64,
    ) -> Result<Proof<frame::BeaconState, frame::HistoricalSummary>, ProofError> {
        let state_slot = self.slot();
        let per_era = self.slots_per_historical_root();
        let era = slot / per_era;
        let not_historical = ProofError::SlotNotHistorical { slot, state_slot };

        if (era + 1).saturating_mul(per_era) > state_slot {
            return Err(not_historical);
        }
        let index = era.checked_sub(self.summary_offset).ok_or(not_historical)?;
        let len = self.state.historical_summaries().len() as u64;
        if index >= len {
            return Err(ProofError::IndexOutOfBounds {
                collection: "historical_summaries",
                index,
                limit: len,
            });
        }

        Proof::from_source(
            &self.state_tree,
            self.calculator.historical_summary_in_state(index)?,
        )
    }

    /// The historical summary covering `slot`, proven up to the block root.
    ///
    /// # Errors
    /// As [`Self::historical_summary_segment`].
    pub fn historical_summary_proof(
        &self,
        slot: u64,
    ) -> Result<Proof<frame::BlockHeader, frame::HistoricalSummary>, ProofError> {
        let proof = self.historical_summary_segment(slot)?.then(self.state_root_proof())?;
        debug!(slot, gindex = proof.gindex(), "Historical summary proof");
        Ok(proof)
    }

    /// The block root at `slot` inside the era's `{block_roots, state_roots}`
    /// container, whose root is that era's `HistoricalSummary` root.
    ///
    /// Must be called on the state at the first slot of the following era,
    /// whose ring buffers are exactly what the summary committed to.
    ///
    /// # Errors
    /// `UnalignedState` if this state is not at an era boundary,
    /// `SlotOutsideEra` if `slot` is not in the era that just ended.
    pub fn historical_summary_block_root_proof(
        &self,
        slot: u64,
    ) -> Result<Proof<frame::HistoricalSummary, frame::BeaconBlock>, ProofError> {
        let state_slot = self.slot();
        let per_era = self.slots_per_historical_root();
        if state_slot < per_era || state_slot % per_era != 0 {
            return Err(ProofError::UnalignedState { state_slot });
        }
        if slot >= state_slot || slot < state_slot - per_era {
            return Err(ProofError::SlotOutsideEra { slot, state_slot });
        }

        let lists = HistoricalSummaryLists {
            block_roots: self.state.block_roots().clone(),
            state_roots: self.state.state_roots().clone(),
        };
        let proof = Proof::from_source(
            &summary_lists_tree(&lists)?,
            self.calculator.block_root_in_historical_summary(slot)?,
        )?;
        debug!(slot, gindex = proof.gindex(), "Historical block root proof");
        Ok(proof)
    }

    /// The `HistoricalSummary` root this state's ring buffers commit to,
    /// hashed with `ssz_rs`. At an era boundary it is the root every
    /// [`Self::historical_summary_block_root_proof`] folds to.
    ///
    /// # Errors
    /// `Merkleization` if either vector cannot be hashed.
    pub fn era_summary_root(&self) -> Result<Hash32, ProofError> {
        let summary = HistoricalSummary {
            block_summary_root: self.state.block_roots().hash_tree_root()?.into(),
            state_summary_root: self.state.state_roots().hash_tree_root()?.into(),
        };
        Ok(summary.hash_tree_root()?.into())
    }

    /// Recompute the state and block roots with `ssz_rs` and compare them to
    /// the cached ones.
    ///
    /// # Errors
    /// `RootMismatch` if either pair disagrees.
    pub fn self_check(&self) -> Result<(), ProofError> {
        let expected = self.state.hash_tree_root()?;
        if expected != self.state_root {
            return Err(ProofError::RootMismatch {
                what: "state",
                expected,
                actual: self.state_root,
            });
        }

        let mut header = self.state.latest_block_header().clone();
        header.state_root = expected;
        let expected: Hash32 = header.hash_tree_root()?.into();
        if expected != self.block_root {
            return Err(ProofError::RootMismatch {
                what: "block header",
                expected,
                actual: self.block_root,
            });
        }
        Ok(())
    }
}

/// The fixed gindex of a validator field relative to the block root, for
/// callers that only carry the proof bytes.
///
/// # Errors
/// `IndexOutOfBounds` past the registry limit.
pub fn validator_field_gindex(
    calculator: &GindexCalculator,
    index: u64,
    field: ValidatorField,
) -> Result<Gindex, ProofError> {
    match field {
        ValidatorField::Credentials => calculator.validator_credentials_from_block_root(index),
        ValidatorField::WithdrawableEpoch => {
            calculator.validator_withdrawable_epoch_from_block_root(index)
        }
    }
}
