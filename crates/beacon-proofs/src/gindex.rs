//! Generalized Index Computation
//!
//! Computes generalized indices (gindices) for SSZ Merkle proofs.
//! A gindex addresses a node of the virtual binary tree overlaid on an SSZ
//! object: the root is 1, the children of `g` are `2g` and `2g + 1`.
//!
//! Gindices are relative to whichever subtree root they were measured from.
//! [`RelativeIndex`] carries that frame in its type so that nesting one
//! subtree's index beneath another is checked by the compiler.
//!
//! A single tree never needs more than 64 levels, so per-tree arithmetic is
//! `u64`. Composed indices are [`Gindex`] (`u128`): a withdrawal proven
//! through a historical summary up to a block header is 64 levels deep.

use std::fmt;
use std::marker::PhantomData;

use crate::proof::ProofError;

/// A generalized index composed across nested trees.
pub type Gindex = u128;
use crate::schema::{ContainerSchema, Fork, ForkSchema};

/// Smallest power of two `>= x`, with `power_of_two_ceil(0) == 1`.
///
/// `x` must not exceed `2^63`.
#[must_use]
pub const fn power_of_two_ceil(x: u64) -> u64 {
    if x <= 1 {
        return 1;
    }
    debug_assert!(x <= 1 << 63);
    1 << (64 - (x - 1).leading_zeros())
}

/// Gindex of the field at `position` in a container of `field_count` fields
/// whose root sits at `parent`.
#[must_use]
pub const fn field_index(parent: u64, field_count: u64, position: u64) -> u64 {
    debug_assert!(position < field_count);
    parent * power_of_two_ceil(field_count) + position
}

/// Gindex of element `position` of a `List` rooted at `list_root`.
///
/// Descends into the data subtree (gindex 2 under the list root) before
/// selecting the element chunk.
///
/// # Errors
/// `IndexOutOfBounds` if `position >= max_length`.
pub fn list_element_index(
    list_root: u64,
    max_length: u64,
    position: u64,
) -> Result<u64, ProofError> {
    if position >= max_length {
        return Err(ProofError::IndexOutOfBounds {
            collection: "list",
            index: position,
            limit: max_length,
        });
    }
    Ok(list_root * 2 * power_of_two_ceil(max_length) + position)
}

/// Gindex of element `position` of a fixed-size `Vector` rooted at
/// `vector_root`. Vectors carry no length mix-in.
///
/// # Errors
/// `IndexOutOfBounds` if `position >= capacity`.
pub fn vector_element_index(
    vector_root: u64,
    capacity: u64,
    position: u64,
) -> Result<u64, ProofError> {
    if position >= capacity {
        return Err(ProofError::IndexOutOfBounds {
            collection: "vector",
            index: position,
            limit: capacity,
        });
    }
    Ok(vector_root * power_of_two_ceil(capacity) + position)
}

/// Re-express `gid`, measured from a root of 1, relative to `new_root`.
///
/// The combined depth must stay below 128 levels.
#[must_use]
pub const fn offset_gid_root(gid: Gindex, new_root: Gindex) -> Gindex {
    debug_assert!(gid > 0 && new_root > 0);
    debug_assert!(gid.leading_zeros() + new_root.leading_zeros() >= Gindex::BITS - 1);
    if gid.is_power_of_two() {
        return gid * new_root;
    }
    let mulp = 1 << (Gindex::BITS - 1 - gid.leading_zeros());
    let add = gid - mulp;
    mulp * new_root + add
}

/// Compute the depth (number of proof elements) for a given gindex
#[must_use]
pub const fn gindex_depth(gindex: u64) -> u32 {
    63 - gindex.leading_zeros()
}

/// Concatenate generalized indices along a path
///
/// Given a sequence of per-tree gindices representing a path through nested
/// structures, compute the final gindex from the outermost root.
#[must_use]
pub fn concat_gindices(gindices: &[u64]) -> Gindex {
    let mut result: Gindex = 1;

    for &gindex in gindices {
        let depth = gindex_depth(gindex);
        result = (result << depth) | Gindex::from(gindex ^ (1_u64 << depth));
    }

    result
}

/// Frames (subtree roots) a [`RelativeIndex`] can be measured from or point at.
pub mod frame {
    /// A named subtree root.
    pub trait Frame {
        /// Human readable name used in debug output.
        const NAME: &'static str;
    }

    macro_rules! frames {
        ($($(#[$meta:meta])* $name:ident => $label:literal),+ $(,)?) => {
            $(
                $(#[$meta])*
                #[derive(Debug)]
                pub enum $name {}

                impl Frame for $name {
                    const NAME: &'static str = $label;
                }
            )+
        };
    }

    frames! {
        /// Root of a `BeaconBlockHeader`; numerically the block root.
        BlockHeader => "BeaconBlockHeader",
        /// Root of a `BeaconState`.
        BeaconState => "BeaconState",
        /// Root of a single `Validator` record.
        Validator => "Validator",
        /// Root of a `BeaconBlock`; numerically the block root.
        BeaconBlock => "BeaconBlock",
        /// Root of a `HistoricalSummary` (equivalently the era's
        /// `{block_roots, state_roots}` container).
        HistoricalSummary => "HistoricalSummary",
        /// A terminal chunk: a field value or an internal node proven as a leaf.
        Field => "Field",
    }
}

use frame::Frame;

/// A gindex measured from the root of `F` that addresses the root of `T`.
pub struct RelativeIndex<F, T> {
    value: Gindex,
    _frames: PhantomData<fn() -> (F, T)>,
}

impl<F, T> RelativeIndex<F, T> {
    /// Wrap a gindex inside a single tree. `value` must be non-zero.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self::from_gindex(value as Gindex)
    }

    /// Wrap a composed gindex. `value` must be non-zero.
    #[must_use]
    pub const fn from_gindex(value: Gindex) -> Self {
        debug_assert!(value > 0);
        Self {
            value,
            _frames: PhantomData,
        }
    }

    /// The raw gindex.
    #[must_use]
    pub const fn value(self) -> Gindex {
        self.value
    }

    /// Number of proof rows between `T` and the root of `F`.
    #[must_use]
    pub const fn depth(self) -> u32 {
        Gindex::BITS - 1 - self.value.leading_zeros()
    }

    /// Nest this index beneath `outer`, which locates the root of `F` inside `G`.
    #[must_use]
    pub const fn within<G>(self, outer: RelativeIndex<G, F>) -> RelativeIndex<G, T> {
        RelativeIndex::from_gindex(offset_gid_root(self.value, outer.value))
    }
}

impl<F> RelativeIndex<F, F> {
    /// The frame's own root.
    pub const ROOT: Self = Self::new(1);
}

impl<F, T> Clone for RelativeIndex<F, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<F, T> Copy for RelativeIndex<F, T> {}

impl<F, T> PartialEq for RelativeIndex<F, T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<F, T> Eq for RelativeIndex<F, T> {}

impl<F: Frame, T: Frame> fmt::Debug for RelativeIndex<F, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RelativeIndex<{} -> {}>({})", F::NAME, T::NAME, self.value)
    }
}

/// Calculator for generalized indices in beacon state and block trees.
///
/// These must match the on-chain verifier's hardcoded gindex functions, so
/// every formula is driven by the fork's schema table.
#[derive(Debug, Clone, Copy)]
pub struct GindexCalculator {
    schema: &'static ForkSchema,
}

impl GindexCalculator {
    #[must_use]
    pub fn new(fork: Fork) -> Self {
        Self {
            schema: fork.schema(),
        }
    }

    #[must_use]
    pub const fn schema(&self) -> &'static ForkSchema {
        self.schema
    }

    fn field(
        container: &ContainerSchema,
        parent: u64,
        name: &'static str,
    ) -> Result<u64, ProofError> {
        let position = container.position(name).ok_or(ProofError::UnknownField {
            container: container.name,
            field: name,
        })?;
        Ok(field_index(parent, container.field_count(), position))
    }

    /// `state_root` inside `BeaconBlockHeader` (gindex 11).
    ///
    /// # Errors
    /// `UnknownField` if the schema table lacks `state_root`.
    pub fn state_root_in_header(
        &self,
    ) -> Result<RelativeIndex<frame::BlockHeader, frame::BeaconState>, ProofError> {
        Self::field(&self.schema.block_header, 1, "state_root").map(RelativeIndex::new)
    }

    /// The `validators` list root inside the state (gindex 43 for Deneb).
    ///
    /// # Errors
    /// `UnknownField` if the schema table lacks `validators`.
    pub fn validators_in_state(&self) -> Result<u64, ProofError> {
        Self::field(&self.schema.state, 1, "validators")
    }

    /// `validators[index]` inside the state.
    ///
    /// # Errors
    /// `IndexOutOfBounds` past the registry limit.
    pub fn validator_in_state(
        &self,
        index: u64,
    ) -> Result<RelativeIndex<frame::BeaconState, frame::Validator>, ProofError> {
        let list = self.validators_in_state()?;
        list_element_index(list, self.schema.validator_registry_limit, index)
            .map(RelativeIndex::new)
    }

    /// The node joining `pubkey` and `withdrawal_credentials` inside a
    /// validator: the parent of field 0 (gindex 4).
    ///
    /// # Errors
    /// `UnknownField` if the schema table lacks `withdrawal_credentials`.
    pub fn validator_credentials(
        &self,
    ) -> Result<RelativeIndex<frame::Validator, frame::Field>, ProofError> {
        let credentials = Self::field(&self.schema.validator, 1, "withdrawal_credentials")?;
        Ok(RelativeIndex::new(credentials / 2))
    }

    /// `withdrawable_epoch` inside a validator (gindex 15).
    ///
    /// # Errors
    /// `UnknownField` if the schema table lacks `withdrawable_epoch`.
    pub fn validator_withdrawable_epoch(
        &self,
    ) -> Result<RelativeIndex<frame::Validator, frame::Field>, ProofError> {
        Self::field(&self.schema.validator, 1, "withdrawable_epoch").map(RelativeIndex::new)
    }

    /// `body.execution_payload.withdrawals[index]` inside a block.
    ///
    /// # Errors
    /// `IndexOutOfBounds` past the per-payload withdrawal limit.
    pub fn withdrawal_in_block(
        &self,
        index: u64,
    ) -> Result<RelativeIndex<frame::BeaconBlock, frame::Field>, ProofError> {
        let body = Self::field(&self.schema.block, 1, "body")?;
        let payload = Self::field(&self.schema.block_body, body, "execution_payload")?;
        let withdrawals = Self::field(&self.schema.execution_payload, payload, "withdrawals")?;
        list_element_index(
            withdrawals,
            self.schema.max_withdrawals_per_payload,
            index,
        )
        .map(RelativeIndex::new)
    }

    /// `block_roots[slot % SLOTS_PER_HISTORICAL_ROOT]` inside the state.
    ///
    /// # Errors
    /// `UnknownField` if the schema table lacks `block_roots`.
    pub fn block_root_in_state(
        &self,
        slot: u64,
    ) -> Result<RelativeIndex<frame::BeaconState, frame::BeaconBlock>, ProofError> {
        let roots = Self::field(&self.schema.state, 1, "block_roots")?;
        let capacity = self.schema.slots_per_historical_root;
        vector_element_index(roots, capacity, slot % capacity).map(RelativeIndex::new)
    }

    /// `historical_summaries[summary_index]` inside the state.
    ///
    /// # Errors
    /// `IndexOutOfBounds` past the historical roots limit.
    pub fn historical_summary_in_state(
        &self,
        summary_index: u64,
    ) -> Result<RelativeIndex<frame::BeaconState, frame::HistoricalSummary>, ProofError> {
        let summaries = Self::field(&self.schema.state, 1, "historical_summaries")?;
        list_element_index(summaries, self.schema.historical_roots_limit, summary_index)
            .map(RelativeIndex::new)
    }

    /// `block_roots[slot % SLOTS_PER_HISTORICAL_ROOT]` inside an era's
    /// `{block_roots, state_roots}` container.
    ///
    /// # Errors
    /// `UnknownField` if the schema table lacks `block_summary_root`.
    pub fn block_root_in_historical_summary(
        &self,
        slot: u64,
    ) -> Result<RelativeIndex<frame::HistoricalSummary, frame::BeaconBlock>, ProofError> {
        let roots = Self::field(&self.schema.historical_summary, 1, "block_summary_root")?;
        let capacity = self.schema.slots_per_historical_root;
        vector_element_index(roots, capacity, slot % capacity).map(RelativeIndex::new)
    }

    /// Composed gindex for `validators[index].withdrawal_credentials` from the block root.
    ///
    /// # Errors
    /// As [`Self::validator_in_state`].
    pub fn validator_credentials_from_block_root(&self, index: u64) -> Result<Gindex, ProofError> {
        Ok(self
            .validator_credentials()?
            .within(self.validator_in_state(index)?)
            .within(self.state_root_in_header()?)
            .value())
    }

    /// Composed gindex for `validators[index].withdrawable_epoch` from the block root.
    ///
    /// # Errors
    /// As [`Self::validator_in_state`].
    pub fn validator_withdrawable_epoch_from_block_root(
        &self,
        index: u64,
    ) -> Result<Gindex, ProofError> {
        Ok(self
            .validator_withdrawable_epoch()?
            .within(self.validator_in_state(index)?)
            .within(self.state_root_in_header()?)
            .value())
    }

    /// Composed gindex for `block_roots[slot % 8192]` from the block root.
    ///
    /// # Errors
    /// `UnknownField` on an incomplete schema table.
    pub fn block_root_from_block_root(&self, slot: u64) -> Result<Gindex, ProofError> {
        Ok(self
            .block_root_in_state(slot)?
            .within(self.state_root_in_header()?)
            .value())
    }
}
