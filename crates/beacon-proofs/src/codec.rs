//! Fork-tagged snapshot decoding.
//!
//! Callers hand over raw SSZ bytes plus the fork they were produced under; the
//! result is a value whose layout matches that fork's schema table.

use ssz_rs::prelude::{HashTreeRoot, SimpleSerialize, Vector};
use tracing::debug;

use crate::beacon_state::{
    BeaconBlockDeneb, BeaconBlockElectra, BeaconBlockHeader, BeaconStateDeneb,
    BeaconStateElectra, ExecutionPayloadDeneb, HistoricalSummary, SignedBeaconBlockDeneb,
    SignedBeaconBlockElectra, Validator, SLOTS_PER_HISTORICAL_ROOT,
};
use crate::proof::ProofError;
use crate::schema::Fork;
use crate::types::Hash32;

/// Evaluates `$body` with `$inner` bound to the fork-specific value.
macro_rules! per_fork {
    ($value:expr, $wrapper:ident, $inner:ident => $body:expr) => {
        match $value {
            $wrapper::Deneb($inner) => $body,
            $wrapper::Electra($inner) => $body,
        }
    };
}

pub(crate) use per_fork;

/// A decoded beacon state of some fork.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BeaconState {
    Deneb(Box<BeaconStateDeneb>),
    Electra(Box<BeaconStateElectra>),
}

impl BeaconState {
    #[must_use]
    pub const fn fork(&self) -> Fork {
        match self {
            Self::Deneb(_) => Fork::Deneb,
            Self::Electra(_) => Fork::Electra,
        }
    }

    #[must_use]
    pub fn slot(&self) -> u64 {
        per_fork!(self, BeaconState, state => state.slot)
    }

    #[must_use]
    pub fn latest_block_header(&self) -> &BeaconBlockHeader {
        per_fork!(self, BeaconState, state => &state.latest_block_header)
    }

    #[must_use]
    pub fn validators(&self) -> &[Validator] {
        per_fork!(self, BeaconState, state => &state.validators[..])
    }

    #[must_use]
    pub fn block_roots(&self) -> &Vector<Hash32, SLOTS_PER_HISTORICAL_ROOT> {
        per_fork!(self, BeaconState, state => &state.block_roots)
    }

    #[must_use]
    pub fn state_roots(&self) -> &Vector<Hash32, SLOTS_PER_HISTORICAL_ROOT> {
        per_fork!(self, BeaconState, state => &state.state_roots)
    }

    #[must_use]
    pub fn historical_summaries(&self) -> &[HistoricalSummary] {
        per_fork!(self, BeaconState, state => &state.historical_summaries[..])
    }

    /// `hash_tree_root(state)` computed by `ssz_rs`.
    ///
    /// # Errors
    /// `Merkleization` if a field cannot be hashed.
    pub fn hash_tree_root(&self) -> Result<Hash32, ProofError> {
        per_fork!(self, BeaconState, state => Ok((**state).hash_tree_root()?.into()))
    }
}

impl From<BeaconStateDeneb> for BeaconState {
    fn from(state: BeaconStateDeneb) -> Self {
        Self::Deneb(Box::new(state))
    }
}

impl From<BeaconStateElectra> for BeaconState {
    fn from(state: BeaconStateElectra) -> Self {
        Self::Electra(Box::new(state))
    }
}

/// A decoded (unsigned) beacon block of some fork.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BeaconBlock {
    Deneb(Box<BeaconBlockDeneb>),
    Electra(Box<BeaconBlockElectra>),
}

impl BeaconBlock {
    #[must_use]
    pub const fn fork(&self) -> Fork {
        match self {
            Self::Deneb(_) => Fork::Deneb,
            Self::Electra(_) => Fork::Electra,
        }
    }

    #[must_use]
    pub fn slot(&self) -> u64 {
        per_fork!(self, BeaconBlock, block => block.slot)
    }

    #[must_use]
    pub fn execution_payload(&self) -> &ExecutionPayloadDeneb {
        per_fork!(self, BeaconBlock, block => &block.body.execution_payload)
    }

    /// The block's header, with `body_root` hashed by `ssz_rs`.
    ///
    /// # Errors
    /// `Merkleization` if the body cannot be hashed.
    pub fn header(&self) -> Result<BeaconBlockHeader, ProofError> {
        per_fork!(self, BeaconBlock, block => block.header())
    }
}

impl From<BeaconBlockDeneb> for BeaconBlock {
    fn from(block: BeaconBlockDeneb) -> Self {
        Self::Deneb(Box::new(block))
    }
}

impl From<BeaconBlockElectra> for BeaconBlock {
    fn from(block: BeaconBlockElectra) -> Self {
        Self::Electra(Box::new(block))
    }
}

fn decode<T, U>(object: &'static str, bytes: &[u8]) -> Result<U, ProofError>
where
    T: SimpleSerialize,
    U: From<T>,
{
    ssz_rs::deserialize::<T>(bytes)
        .map(U::from)
        .map_err(|source| ProofError::Codec { object, source })
}

/// Decode an SSZ-encoded `BeaconState`.
///
/// # Errors
/// `Codec` on truncated or malformed bytes.
pub fn decode_state(fork: Fork, bytes: &[u8]) -> Result<BeaconState, ProofError> {
    debug!(%fork, len = bytes.len(), "Decoding beacon state");
    match fork {
        Fork::Deneb => decode::<BeaconStateDeneb, _>("BeaconState", bytes),
        Fork::Electra => decode::<BeaconStateElectra, _>("BeaconState", bytes),
    }
}

/// Decode an SSZ-encoded `BeaconBlock`.
///
/// # Errors
/// `Codec` on truncated or malformed bytes.
pub fn decode_block(fork: Fork, bytes: &[u8]) -> Result<BeaconBlock, ProofError> {
    debug!(%fork, len = bytes.len(), "Decoding beacon block");
    match fork {
        Fork::Deneb => decode::<BeaconBlockDeneb, _>("BeaconBlock", bytes),
        Fork::Electra => decode::<BeaconBlockElectra, _>("BeaconBlock", bytes),
    }
}

/// Decode an SSZ-encoded `SignedBeaconBlock`, dropping the signature.
///
/// # Errors
/// `Codec` on truncated or malformed bytes.
pub fn decode_signed_block(fork: Fork, bytes: &[u8]) -> Result<BeaconBlock, ProofError> {
    debug!(%fork, len = bytes.len(), "Decoding signed beacon block");
    match fork {
        Fork::Deneb => decode::<SignedBeaconBlockDeneb, SignedBeaconBlockDeneb>(
            "SignedBeaconBlock",
            bytes,
        )
        .map(|signed| signed.message.into()),
        Fork::Electra => decode::<SignedBeaconBlockElectra, SignedBeaconBlockElectra>(
            "SignedBeaconBlock",
            bytes,
        )
        .map(|signed| signed.message.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beacon_state::{PendingConsolidation, Withdrawal};

    #[test]
    fn test_block_roundtrip() {
        let mut block = BeaconBlockDeneb {
            slot: 11_544_444,
            proposer_index: 3,
            ..Default::default()
        };
        block.body.execution_payload.withdrawals.push(Withdrawal {
            index: 9,
            validator_index: 10,
            address: [0x11; 20],
            amount: 12,
        });

        let bytes = ssz_rs::serialize(&block).expect("serialize");
        let decoded = decode_block(Fork::Deneb, &bytes).unwrap();
        assert_eq!(decoded.slot(), 11_544_444);
        assert_eq!(decoded.fork(), Fork::Deneb);
        assert_eq!(decoded.execution_payload().withdrawals.len(), 1);
        assert_eq!(decoded, BeaconBlock::from(block));
    }

    #[test]
    fn test_signed_block_drops_signature() {
        let signed = SignedBeaconBlockDeneb {
            message: BeaconBlockDeneb {
                slot: 5,
                ..Default::default()
            },
            ..Default::default()
        };
        let bytes = ssz_rs::serialize(&signed).expect("serialize");
        let decoded = decode_signed_block(Fork::Deneb, &bytes).unwrap();
        assert_eq!(decoded, BeaconBlock::from(signed.message));
    }

    #[test]
    fn test_electra_state_roundtrip() {
        let mut state = BeaconStateElectra {
            slot: 4_000_000,
            earliest_exit_epoch: 125_000,
            ..Default::default()
        };
        state.pending_consolidations.push(PendingConsolidation {
            source_index: 1,
            target_index: 2,
        });
        state.validators.push(Validator::default());

        let bytes = ssz_rs::serialize(&state).expect("serialize");
        let decoded = decode_state(Fork::Electra, &bytes).unwrap();
        assert_eq!(decoded.fork(), Fork::Electra);
        assert_eq!(decoded.slot(), 4_000_000);
        assert_eq!(decoded.validators().len(), 1);
        let expected: Hash32 = state.hash_tree_root().unwrap().into();
        assert_eq!(decoded.hash_tree_root().unwrap(), expected);
    }

    #[test]
    fn test_electra_signed_block_drops_signature() {
        let signed = SignedBeaconBlockElectra {
            message: BeaconBlockElectra {
                slot: 6,
                ..Default::default()
            },
            ..Default::default()
        };
        let bytes = ssz_rs::serialize(&signed).expect("serialize");
        let decoded = decode_signed_block(Fork::Electra, &bytes).unwrap();
        assert_eq!(decoded.fork(), Fork::Electra);
        assert_eq!(decoded, BeaconBlock::from(signed.message));
    }

    #[test]
    fn test_deneb_state_is_not_electra() {
        let bytes = ssz_rs::serialize(&BeaconStateDeneb::default()).expect("serialize");
        assert!(matches!(
            decode_state(Fork::Electra, &bytes),
            Err(ProofError::Codec { object: "BeaconState", .. })
        ));
    }

    #[test]
    fn test_truncated_state_is_codec_error() {
        let err = decode_state(Fork::Deneb, &[0u8; 16]).unwrap_err();
        assert!(matches!(err, ProofError::Codec { object: "BeaconState", .. }));
    }

    #[test]
    fn test_truncated_block_is_codec_error() {
        let err = decode_block(Fork::Deneb, &[]).unwrap_err();
        assert!(matches!(err, ProofError::Codec { object: "BeaconBlock", .. }));
    }
}
