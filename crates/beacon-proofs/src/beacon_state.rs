//! Deneb and Electra BeaconState / BeaconBlock SSZ Types
//!
//! Full mainnet-preset layouts, deriving `ssz_rs` traits for decoding and
//! hashing. Every container goes through `ssz_container!`, which also records
//! the field order as `FieldRoots::FIELD_NAMES` so the schema tables in
//! [`crate::schema`] can be checked against the real types.

use ssz_rs::prelude::*;

use crate::types::Hash32;

/// Declares an SSZ container and its [`crate::types::FieldRoots`] impl.
macro_rules! ssz_container {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $( $(#[$fmeta:meta])* pub $field:ident : $ty:ty ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        pub struct $name {
            $( $(#[$fmeta])* pub $field: $ty ),*
        }

        impl $crate::types::FieldRoots for $name {
            const NAME: &'static str = stringify!($name);
            const FIELD_NAMES: &'static [&'static str] = &[$(stringify!($field)),*];

            fn field_root(
                &self,
                position: usize,
            ) -> Result<$crate::types::Hash32, $crate::proof::ProofError> {
                let name = Self::FIELD_NAMES.get(position).copied().ok_or(
                    $crate::proof::ProofError::IndexOutOfBounds {
                        collection: Self::NAME,
                        index: position as u64,
                        limit: Self::FIELD_NAMES.len() as u64,
                    },
                )?;
                $(
                    if name == stringify!($field) {
                        return Ok(ssz_rs::HashTreeRoot::hash_tree_root(&self.$field)?.into());
                    }
                )*
                unreachable!("FIELD_NAMES lists every field")
            }
        }
    };
}

pub type BlsPubkey = Vector<u8, 48>;
pub type BlsSignature = Vector<u8, 96>;
pub type KzgCommitment = Vector<u8, 48>;
pub type ExecutionAddress = [u8; 20];
pub type Transaction = List<u8, MAX_BYTES_PER_TRANSACTION>;

/// `VALIDATOR_REGISTRY_LIMIT`
pub const VALIDATOR_REGISTRY_LIMIT: usize = 1_099_511_627_776;
/// `SLOTS_PER_HISTORICAL_ROOT`
pub const SLOTS_PER_HISTORICAL_ROOT: usize = 8192;
/// `HISTORICAL_ROOTS_LIMIT`
pub const HISTORICAL_ROOTS_LIMIT: usize = 16_777_216;
/// `MAX_WITHDRAWALS_PER_PAYLOAD`
pub const MAX_WITHDRAWALS_PER_PAYLOAD: usize = 16;

const EPOCHS_PER_HISTORICAL_VECTOR: usize = 65_536;
const EPOCHS_PER_SLASHINGS_VECTOR: usize = 8192;
const ETH1_DATA_VOTES_LIMIT: usize = 2048;
const MAX_VALIDATORS_PER_COMMITTEE: usize = 2048;
const SYNC_COMMITTEE_SIZE: usize = 512;
const DEPOSIT_PROOF_LENGTH: usize = 33;
const MAX_BYTES_PER_TRANSACTION: usize = 1_073_741_824;
const MAX_TRANSACTIONS_PER_PAYLOAD: usize = 1_048_576;
const MAX_EXTRA_DATA_BYTES: usize = 32;
const BYTES_PER_LOGS_BLOOM: usize = 256;
const MAX_PROPOSER_SLASHINGS: usize = 16;
const MAX_ATTESTER_SLASHINGS: usize = 2;
const MAX_ATTESTATIONS: usize = 128;
const MAX_DEPOSITS: usize = 16;
const MAX_VOLUNTARY_EXITS: usize = 16;
const MAX_BLS_TO_EXECUTION_CHANGES: usize = 16;
const MAX_BLOB_COMMITMENTS_PER_BLOCK: usize = 4096;
const MAX_COMMITTEES_PER_SLOT: usize = 64;
const MAX_VALIDATORS_PER_SLOT: usize = MAX_VALIDATORS_PER_COMMITTEE * MAX_COMMITTEES_PER_SLOT;
const MAX_ATTESTER_SLASHINGS_ELECTRA: usize = 1;
const MAX_ATTESTATIONS_ELECTRA: usize = 8;
const MAX_DEPOSIT_REQUESTS_PER_PAYLOAD: usize = 8192;
const MAX_WITHDRAWAL_REQUESTS_PER_PAYLOAD: usize = 16;
const MAX_CONSOLIDATION_REQUESTS_PER_PAYLOAD: usize = 2;
const PENDING_DEPOSITS_LIMIT: usize = 134_217_728;
const PENDING_PARTIAL_WITHDRAWALS_LIMIT: usize = 134_217_728;
const PENDING_CONSOLIDATIONS_LIMIT: usize = 262_144;

// ============================================================================
// Shared containers
// ============================================================================

ssz_container! {
    /// Fork data
    #[derive(Debug, Clone, Default, PartialEq, Eq, SimpleSerialize)]
    pub struct Fork {
        pub previous_version: [u8; 4],
        pub current_version: [u8; 4],
        pub epoch: u64,
    }
}

ssz_container! {
    /// Checkpoint for fork choice
    #[derive(Debug, Clone, Default, PartialEq, Eq, SimpleSerialize)]
    pub struct Checkpoint {
        pub epoch: u64,
        pub root: Hash32,
    }
}

ssz_container! {
    /// Eth1 deposit data
    #[derive(Debug, Clone, Default, PartialEq, Eq, SimpleSerialize)]
    pub struct Eth1Data {
        pub deposit_root: Hash32,
        pub deposit_count: u64,
        pub block_hash: Hash32,
    }
}

ssz_container! {
    #[derive(Debug, Clone, Default, PartialEq, Eq, SimpleSerialize)]
    pub struct BeaconBlockHeader {
        pub slot: u64,
        pub proposer_index: u64,
        pub parent_root: Hash32,
        pub state_root: Hash32,
        pub body_root: Hash32,
    }
}

ssz_container! {
    #[derive(Debug, Clone, Default, PartialEq, Eq, SimpleSerialize)]
    pub struct SignedBeaconBlockHeader {
        pub message: BeaconBlockHeader,
        pub signature: BlsSignature,
    }
}

ssz_container! {
    /// Validator record
    #[derive(Debug, Clone, Default, PartialEq, Eq, SimpleSerialize)]
    pub struct Validator {
        pub pubkey: BlsPubkey,
        pub withdrawal_credentials: Hash32,
        pub effective_balance: u64,
        pub slashed: bool,
        pub activation_eligibility_epoch: u64,
        pub activation_epoch: u64,
        pub exit_epoch: u64,
        pub withdrawable_epoch: u64,
    }
}

ssz_container! {
    #[derive(Debug, Clone, Default, PartialEq, Eq, SimpleSerialize)]
    pub struct HistoricalSummary {
        pub block_summary_root: Hash32,
        pub state_summary_root: Hash32,
    }
}

ssz_container! {
    /// The pre-image of a [`HistoricalSummary`]: one era's `block_roots` and
    /// `state_roots` vectors. Its root equals the summary's root, so proofs
    /// into it verify against `historical_summaries[era]`.
    #[derive(Debug, Clone, Default, PartialEq, Eq, SimpleSerialize)]
    pub struct HistoricalSummaryLists {
        pub block_roots: Vector<Hash32, SLOTS_PER_HISTORICAL_ROOT>,
        pub state_roots: Vector<Hash32, SLOTS_PER_HISTORICAL_ROOT>,
    }
}

ssz_container! {
    /// Sync committee (Altair+)
    #[derive(Debug, Clone, Default, PartialEq, Eq, SimpleSerialize)]
    pub struct SyncCommittee {
        pub pubkeys: Vector<BlsPubkey, SYNC_COMMITTEE_SIZE>,
        pub aggregate_pubkey: BlsPubkey,
    }
}

// ============================================================================
// Block operations
// ============================================================================

ssz_container! {
    /// Attestation data
    #[derive(Debug, Clone, Default, PartialEq, Eq, SimpleSerialize)]
    pub struct AttestationData {
        pub slot: u64,
        pub index: u64,
        pub beacon_block_root: Hash32,
        pub source: Checkpoint,
        pub target: Checkpoint,
    }
}

ssz_container! {
    #[derive(Debug, Clone, Default, PartialEq, Eq, SimpleSerialize)]
    pub struct Attestation {
        pub aggregation_bits: Bitlist<MAX_VALIDATORS_PER_COMMITTEE>,
        pub data: AttestationData,
        pub signature: BlsSignature,
    }
}

ssz_container! {
    #[derive(Debug, Clone, Default, PartialEq, Eq, SimpleSerialize)]
    pub struct IndexedAttestation {
        pub attesting_indices: List<u64, MAX_VALIDATORS_PER_COMMITTEE>,
        pub data: AttestationData,
        pub signature: BlsSignature,
    }
}

ssz_container! {
    #[derive(Debug, Clone, Default, PartialEq, Eq, SimpleSerialize)]
    pub struct ProposerSlashing {
        pub signed_header_1: SignedBeaconBlockHeader,
        pub signed_header_2: SignedBeaconBlockHeader,
    }
}

ssz_container! {
    #[derive(Debug, Clone, Default, PartialEq, Eq, SimpleSerialize)]
    pub struct AttesterSlashing {
        pub attestation_1: IndexedAttestation,
        pub attestation_2: IndexedAttestation,
    }
}

ssz_container! {
    #[derive(Debug, Clone, Default, PartialEq, Eq, SimpleSerialize)]
    pub struct DepositData {
        pub pubkey: BlsPubkey,
        pub withdrawal_credentials: Hash32,
        pub amount: u64,
        pub signature: BlsSignature,
    }
}

ssz_container! {
    #[derive(Debug, Clone, Default, PartialEq, Eq, SimpleSerialize)]
    pub struct Deposit {
        pub proof: Vector<Hash32, DEPOSIT_PROOF_LENGTH>,
        pub data: DepositData,
    }
}

ssz_container! {
    #[derive(Debug, Clone, Default, PartialEq, Eq, SimpleSerialize)]
    pub struct VoluntaryExit {
        pub epoch: u64,
        pub validator_index: u64,
    }
}

ssz_container! {
    #[derive(Debug, Clone, Default, PartialEq, Eq, SimpleSerialize)]
    pub struct SignedVoluntaryExit {
        pub message: VoluntaryExit,
        pub signature: BlsSignature,
    }
}

ssz_container! {
    #[derive(Debug, Clone, Default, PartialEq, Eq, SimpleSerialize)]
    pub struct SyncAggregate {
        pub sync_committee_bits: Bitvector<SYNC_COMMITTEE_SIZE>,
        pub sync_committee_signature: BlsSignature,
    }
}

ssz_container! {
    /// Execution-layer withdrawal processed in a block
    #[derive(Debug, Clone, Default, PartialEq, Eq, SimpleSerialize)]
    pub struct Withdrawal {
        pub index: u64,
        pub validator_index: u64,
        pub address: ExecutionAddress,
        pub amount: u64,
    }
}

ssz_container! {
    #[derive(Debug, Clone, Default, PartialEq, Eq, SimpleSerialize)]
    pub struct BlsToExecutionChange {
        pub validator_index: u64,
        pub from_bls_pubkey: BlsPubkey,
        pub to_execution_address: ExecutionAddress,
    }
}

ssz_container! {
    #[derive(Debug, Clone, Default, PartialEq, Eq, SimpleSerialize)]
    pub struct SignedBlsToExecutionChange {
        pub message: BlsToExecutionChange,
        pub signature: BlsSignature,
    }
}

ssz_container! {
    /// Electra attestation, aggregated across committees
    #[derive(Debug, Clone, Default, PartialEq, Eq, SimpleSerialize)]
    pub struct AttestationElectra {
        pub aggregation_bits: Bitlist<MAX_VALIDATORS_PER_SLOT>,
        pub data: AttestationData,
        pub signature: BlsSignature,
        pub committee_bits: Bitvector<MAX_COMMITTEES_PER_SLOT>,
    }
}

ssz_container! {
    #[derive(Debug, Clone, Default, PartialEq, Eq, SimpleSerialize)]
    pub struct IndexedAttestationElectra {
        pub attesting_indices: List<u64, MAX_VALIDATORS_PER_SLOT>,
        pub data: AttestationData,
        pub signature: BlsSignature,
    }
}

ssz_container! {
    #[derive(Debug, Clone, Default, PartialEq, Eq, SimpleSerialize)]
    pub struct AttesterSlashingElectra {
        pub attestation_1: IndexedAttestationElectra,
        pub attestation_2: IndexedAttestationElectra,
    }
}

ssz_container! {
    #[derive(Debug, Clone, Default, PartialEq, Eq, SimpleSerialize)]
    pub struct DepositRequest {
        pub pubkey: BlsPubkey,
        pub withdrawal_credentials: Hash32,
        pub amount: u64,
        pub signature: BlsSignature,
        pub index: u64,
    }
}

ssz_container! {
    #[derive(Debug, Clone, Default, PartialEq, Eq, SimpleSerialize)]
    pub struct WithdrawalRequest {
        pub source_address: ExecutionAddress,
        pub validator_pubkey: BlsPubkey,
        pub amount: u64,
    }
}

ssz_container! {
    #[derive(Debug, Clone, Default, PartialEq, Eq, SimpleSerialize)]
    pub struct ConsolidationRequest {
        pub source_address: ExecutionAddress,
        pub source_pubkey: BlsPubkey,
        pub target_pubkey: BlsPubkey,
    }
}

ssz_container! {
    /// Execution-layer requests carried by an Electra block body
    #[derive(Debug, Clone, Default, PartialEq, Eq, SimpleSerialize)]
    pub struct ExecutionRequests {
        pub deposits: List<DepositRequest, MAX_DEPOSIT_REQUESTS_PER_PAYLOAD>,
        pub withdrawals: List<WithdrawalRequest, MAX_WITHDRAWAL_REQUESTS_PER_PAYLOAD>,
        pub consolidations: List<ConsolidationRequest, MAX_CONSOLIDATION_REQUESTS_PER_PAYLOAD>,
    }
}

// ============================================================================
// Execution payload
// ============================================================================

ssz_container! {
    #[derive(Debug, Clone, Default, PartialEq, Eq, SimpleSerialize)]
    pub struct ExecutionPayloadDeneb {
        pub parent_hash: Hash32,
        pub fee_recipient: ExecutionAddress,
        pub state_root: Hash32,
        pub receipts_root: Hash32,
        pub logs_bloom: Vector<u8, BYTES_PER_LOGS_BLOOM>,
        pub prev_randao: Hash32,
        pub block_number: u64,
        pub gas_limit: u64,
        pub gas_used: u64,
        pub timestamp: u64,
        pub extra_data: List<u8, MAX_EXTRA_DATA_BYTES>,
        pub base_fee_per_gas: U256,
        pub block_hash: Hash32,
        pub transactions: List<Transaction, MAX_TRANSACTIONS_PER_PAYLOAD>,
        pub withdrawals: List<Withdrawal, MAX_WITHDRAWALS_PER_PAYLOAD>,
        pub blob_gas_used: u64,
        pub excess_blob_gas: u64,
    }
}

ssz_container! {
    #[derive(Debug, Clone, Default, PartialEq, Eq, SimpleSerialize)]
    pub struct ExecutionPayloadHeaderDeneb {
        pub parent_hash: Hash32,
        pub fee_recipient: ExecutionAddress,
        pub state_root: Hash32,
        pub receipts_root: Hash32,
        pub logs_bloom: Vector<u8, BYTES_PER_LOGS_BLOOM>,
        pub prev_randao: Hash32,
        pub block_number: u64,
        pub gas_limit: u64,
        pub gas_used: u64,
        pub timestamp: u64,
        pub extra_data: List<u8, MAX_EXTRA_DATA_BYTES>,
        pub base_fee_per_gas: U256,
        pub block_hash: Hash32,
        pub transactions_root: Hash32,
        pub withdrawals_root: Hash32,
        pub blob_gas_used: u64,
        pub excess_blob_gas: u64,
    }
}

// ============================================================================
// Block
// ============================================================================

ssz_container! {
    #[derive(Debug, Clone, Default, PartialEq, Eq, SimpleSerialize)]
    pub struct BeaconBlockBodyDeneb {
        pub randao_reveal: BlsSignature,
        pub eth1_data: Eth1Data,
        pub graffiti: Hash32,
        pub proposer_slashings: List<ProposerSlashing, MAX_PROPOSER_SLASHINGS>,
        pub attester_slashings: List<AttesterSlashing, MAX_ATTESTER_SLASHINGS>,
        pub attestations: List<Attestation, MAX_ATTESTATIONS>,
        pub deposits: List<Deposit, MAX_DEPOSITS>,
        pub voluntary_exits: List<SignedVoluntaryExit, MAX_VOLUNTARY_EXITS>,
        pub sync_aggregate: SyncAggregate,
        pub execution_payload: ExecutionPayloadDeneb,
        pub bls_to_execution_changes:
            List<SignedBlsToExecutionChange, MAX_BLS_TO_EXECUTION_CHANGES>,
        pub blob_kzg_commitments: List<KzgCommitment, MAX_BLOB_COMMITMENTS_PER_BLOCK>,
    }
}

ssz_container! {
    #[derive(Debug, Clone, Default, PartialEq, Eq, SimpleSerialize)]
    pub struct BeaconBlockDeneb {
        pub slot: u64,
        pub proposer_index: u64,
        pub parent_root: Hash32,
        pub state_root: Hash32,
        pub body: BeaconBlockBodyDeneb,
    }
}

ssz_container! {
    #[derive(Debug, Clone, Default, PartialEq, Eq, SimpleSerialize)]
    pub struct SignedBeaconBlockDeneb {
        pub message: BeaconBlockDeneb,
        pub signature: BlsSignature,
    }
}

ssz_container! {
    /// Electra body: Deneb's layout with Electra attestations and a trailing
    /// `execution_requests` field. The payload is unchanged.
    #[derive(Debug, Clone, Default, PartialEq, Eq, SimpleSerialize)]
    pub struct BeaconBlockBodyElectra {
        pub randao_reveal: BlsSignature,
        pub eth1_data: Eth1Data,
        pub graffiti: Hash32,
        pub proposer_slashings: List<ProposerSlashing, MAX_PROPOSER_SLASHINGS>,
        pub attester_slashings: List<AttesterSlashingElectra, MAX_ATTESTER_SLASHINGS_ELECTRA>,
        pub attestations: List<AttestationElectra, MAX_ATTESTATIONS_ELECTRA>,
        pub deposits: List<Deposit, MAX_DEPOSITS>,
        pub voluntary_exits: List<SignedVoluntaryExit, MAX_VOLUNTARY_EXITS>,
        pub sync_aggregate: SyncAggregate,
        pub execution_payload: ExecutionPayloadDeneb,
        pub bls_to_execution_changes:
            List<SignedBlsToExecutionChange, MAX_BLS_TO_EXECUTION_CHANGES>,
        pub blob_kzg_commitments: List<KzgCommitment, MAX_BLOB_COMMITMENTS_PER_BLOCK>,
        pub execution_requests: ExecutionRequests,
    }
}

ssz_container! {
    #[derive(Debug, Clone, Default, PartialEq, Eq, SimpleSerialize)]
    pub struct BeaconBlockElectra {
        pub slot: u64,
        pub proposer_index: u64,
        pub parent_root: Hash32,
        pub state_root: Hash32,
        pub body: BeaconBlockBodyElectra,
    }
}

ssz_container! {
    #[derive(Debug, Clone, Default, PartialEq, Eq, SimpleSerialize)]
    pub struct SignedBeaconBlockElectra {
        pub message: BeaconBlockElectra,
        pub signature: BlsSignature,
    }
}

// ============================================================================
// State
// ============================================================================

ssz_container! {
    #[derive(Debug, Clone, Default, PartialEq, Eq, SimpleSerialize)]
    pub struct PendingDeposit {
        pub pubkey: BlsPubkey,
        pub withdrawal_credentials: Hash32,
        pub amount: u64,
        pub signature: BlsSignature,
        pub slot: u64,
    }
}

ssz_container! {
    #[derive(Debug, Clone, Default, PartialEq, Eq, SimpleSerialize)]
    pub struct PendingPartialWithdrawal {
        pub validator_index: u64,
        pub amount: u64,
        pub withdrawable_epoch: u64,
    }
}

ssz_container! {
    #[derive(Debug, Clone, Default, PartialEq, Eq, SimpleSerialize)]
    pub struct PendingConsolidation {
        pub source_index: u64,
        pub target_index: u64,
    }
}

ssz_container! {
    /// Deneb BeaconState, 28 fields.
    #[derive(Debug, Clone, Default, PartialEq, Eq, SimpleSerialize)]
    pub struct BeaconStateDeneb {
        pub genesis_time: u64,
        pub genesis_validators_root: Hash32,
        pub slot: u64,
        pub fork: Fork,
        pub latest_block_header: BeaconBlockHeader,
        pub block_roots: Vector<Hash32, SLOTS_PER_HISTORICAL_ROOT>,
        pub state_roots: Vector<Hash32, SLOTS_PER_HISTORICAL_ROOT>,
        pub historical_roots: List<Hash32, HISTORICAL_ROOTS_LIMIT>,
        pub eth1_data: Eth1Data,
        pub eth1_data_votes: List<Eth1Data, ETH1_DATA_VOTES_LIMIT>,
        pub eth1_deposit_index: u64,
        pub validators: List<Validator, VALIDATOR_REGISTRY_LIMIT>,
        pub balances: List<u64, VALIDATOR_REGISTRY_LIMIT>,
        pub randao_mixes: Vector<Hash32, EPOCHS_PER_HISTORICAL_VECTOR>,
        pub slashings: Vector<u64, EPOCHS_PER_SLASHINGS_VECTOR>,
        pub previous_epoch_participation: List<u8, VALIDATOR_REGISTRY_LIMIT>,
        pub current_epoch_participation: List<u8, VALIDATOR_REGISTRY_LIMIT>,
        pub justification_bits: Bitvector<4>,
        pub previous_justified_checkpoint: Checkpoint,
        pub current_justified_checkpoint: Checkpoint,
        pub finalized_checkpoint: Checkpoint,
        pub inactivity_scores: List<u64, VALIDATOR_REGISTRY_LIMIT>,
        pub current_sync_committee: SyncCommittee,
        pub next_sync_committee: SyncCommittee,
        pub latest_execution_payload_header: ExecutionPayloadHeaderDeneb,
        pub next_withdrawal_index: u64,
        pub next_withdrawal_validator_index: u64,
        pub historical_summaries: List<HistoricalSummary, HISTORICAL_ROOTS_LIMIT>,
    }
}

ssz_container! {
    /// Electra BeaconState, 37 fields: Deneb's 28 plus the deposit, exit and
    /// consolidation queues.
    #[derive(Debug, Clone, Default, PartialEq, Eq, SimpleSerialize)]
    pub struct BeaconStateElectra {
        pub genesis_time: u64,
        pub genesis_validators_root: Hash32,
        pub slot: u64,
        pub fork: Fork,
        pub latest_block_header: BeaconBlockHeader,
        pub block_roots: Vector<Hash32, SLOTS_PER_HISTORICAL_ROOT>,
        pub state_roots: Vector<Hash32, SLOTS_PER_HISTORICAL_ROOT>,
        pub historical_roots: List<Hash32, HISTORICAL_ROOTS_LIMIT>,
        pub eth1_data: Eth1Data,
        pub eth1_data_votes: List<Eth1Data, ETH1_DATA_VOTES_LIMIT>,
        pub eth1_deposit_index: u64,
        pub validators: List<Validator, VALIDATOR_REGISTRY_LIMIT>,
        pub balances: List<u64, VALIDATOR_REGISTRY_LIMIT>,
        pub randao_mixes: Vector<Hash32, EPOCHS_PER_HISTORICAL_VECTOR>,
        pub slashings: Vector<u64, EPOCHS_PER_SLASHINGS_VECTOR>,
        pub previous_epoch_participation: List<u8, VALIDATOR_REGISTRY_LIMIT>,
        pub current_epoch_participation: List<u8, VALIDATOR_REGISTRY_LIMIT>,
        pub justification_bits: Bitvector<4>,
        pub previous_justified_checkpoint: Checkpoint,
        pub current_justified_checkpoint: Checkpoint,
        pub finalized_checkpoint: Checkpoint,
        pub inactivity_scores: List<u64, VALIDATOR_REGISTRY_LIMIT>,
        pub current_sync_committee: SyncCommittee,
        pub next_sync_committee: SyncCommittee,
        pub latest_execution_payload_header: ExecutionPayloadHeaderDeneb,
        pub next_withdrawal_index: u64,
        pub next_withdrawal_validator_index: u64,
        pub historical_summaries: List<HistoricalSummary, HISTORICAL_ROOTS_LIMIT>,
        pub deposit_requests_start_index: u64,
        pub deposit_balance_to_consume: u64,
        pub exit_balance_to_consume: u64,
        pub earliest_exit_epoch: u64,
        pub consolidation_balance_to_consume: u64,
        pub earliest_consolidation_epoch: u64,
        pub pending_deposits: List<PendingDeposit, PENDING_DEPOSITS_LIMIT>,
        pub pending_partial_withdrawals:
            List<PendingPartialWithdrawal, PENDING_PARTIAL_WITHDRAWALS_LIMIT>,
        pub pending_consolidations: List<PendingConsolidation, PENDING_CONSOLIDATIONS_LIMIT>,
    }
}

macro_rules! block_header {
    ($($block:ty),*) => {
        $(
            impl $block {
                /// Header of this block, with `body_root` hashed from the body.
                ///
                /// # Errors
                /// `Merkleization` if the body cannot be hashed.
                pub fn header(&self) -> Result<BeaconBlockHeader, crate::proof::ProofError> {
                    Ok(BeaconBlockHeader {
                        slot: self.slot,
                        proposer_index: self.proposer_index,
                        parent_root: self.parent_root,
                        state_root: self.state_root,
                        body_root: self.body.hash_tree_root()?.into(),
                    })
                }
            }
        )*
    };
}

block_header!(BeaconBlockDeneb, BeaconBlockElectra);
