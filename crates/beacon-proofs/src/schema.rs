//! Fork-indexed SSZ schema tables.
//!
//! Field positions and list capacities are part of the contract with every
//! downstream verifier. They live here, one table per fork, so that a new
//! fork means a new table rather than a hunt for numeric literals.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::gindex::power_of_two_ceil;
use crate::proof::ProofError;

/// A named, versioned revision of the beacon state/block layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fork {
    Deneb,
    Electra,
}

impl Fork {
    /// Schema table for this fork.
    #[must_use]
    pub fn schema(self) -> &'static ForkSchema {
        match self {
            Self::Deneb => &DENEB,
            Self::Electra => &ELECTRA,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Deneb => "deneb",
            Self::Electra => "electra",
        }
    }
}

impl fmt::Display for Fork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Fork {
    type Err = ProofError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "deneb" => Ok(Self::Deneb),
            "electra" => Ok(Self::Electra),
            _ => Err(ProofError::UnsupportedFork(s.to_string())),
        }
    }
}

/// Ordered field list of an SSZ container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerSchema {
    pub name: &'static str,
    pub fields: &'static [&'static str],
}

impl ContainerSchema {
    #[must_use]
    pub const fn field_count(&self) -> u64 {
        self.fields.len() as u64
    }

    /// Leaf slots occupied by the container's fields.
    #[must_use]
    pub const fn chunk_ceil(&self) -> u64 {
        power_of_two_ceil(self.field_count())
    }

    /// 0-based position of `field`.
    #[must_use]
    pub fn position(&self, field: &str) -> Option<u64> {
        self.fields
            .iter()
            .position(|name| *name == field)
            .map(|p| p as u64)
    }
}

/// Everything the index formulas need to know about one fork.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForkSchema {
    pub fork: Fork,
    pub state: ContainerSchema,
    pub block_header: ContainerSchema,
    pub validator: ContainerSchema,
    pub block: ContainerSchema,
    pub block_body: ContainerSchema,
    pub execution_payload: ContainerSchema,
    pub historical_summary: ContainerSchema,
    /// `VALIDATOR_REGISTRY_LIMIT`
    pub validator_registry_limit: u64,
    /// `SLOTS_PER_HISTORICAL_ROOT`, the `block_roots` capacity.
    pub slots_per_historical_root: u64,
    /// `HISTORICAL_ROOTS_LIMIT`, also bounds `historical_summaries`.
    pub historical_roots_limit: u64,
    /// `MAX_WITHDRAWALS_PER_PAYLOAD`
    pub max_withdrawals_per_payload: u64,
}

const BEACON_BLOCK_HEADER: ContainerSchema = ContainerSchema {
    name: "BeaconBlockHeader",
    fields: &["slot", "proposer_index", "parent_root", "state_root", "body_root"],
};

const VALIDATOR: ContainerSchema = ContainerSchema {
    name: "Validator",
    fields: &[
        "pubkey",
        "withdrawal_credentials",
        "effective_balance",
        "slashed",
        "activation_eligibility_epoch",
        "activation_epoch",
        "exit_epoch",
        "withdrawable_epoch",
    ],
};

const HISTORICAL_SUMMARY: ContainerSchema = ContainerSchema {
    name: "HistoricalSummary",
    fields: &["block_summary_root", "state_summary_root"],
};

const DENEB_STATE_FIELDS: [&str; 28] = [
    "genesis_time",
    "genesis_validators_root",
    "slot",
    "fork",
    "latest_block_header",
    "block_roots",
    "state_roots",
    "historical_roots",
    "eth1_data",
    "eth1_data_votes",
    "eth1_deposit_index",
    "validators",
    "balances",
    "randao_mixes",
    "slashings",
    "previous_epoch_participation",
    "current_epoch_participation",
    "justification_bits",
    "previous_justified_checkpoint",
    "current_justified_checkpoint",
    "finalized_checkpoint",
    "inactivity_scores",
    "current_sync_committee",
    "next_sync_committee",
    "latest_execution_payload_header",
    "next_withdrawal_index",
    "next_withdrawal_validator_index",
    "historical_summaries",
];

/// Deneb's fields followed by the nine added in Electra.
const ELECTRA_STATE_FIELDS: [&str; 37] = {
    let added = [
        "deposit_requests_start_index",
        "deposit_balance_to_consume",
        "exit_balance_to_consume",
        "earliest_exit_epoch",
        "consolidation_balance_to_consume",
        "earliest_consolidation_epoch",
        "pending_deposits",
        "pending_partial_withdrawals",
        "pending_consolidations",
    ];
    let mut fields = [""; 37];
    let mut i = 0;
    while i < fields.len() {
        fields[i] = if i < DENEB_STATE_FIELDS.len() {
            DENEB_STATE_FIELDS[i]
        } else {
            added[i - DENEB_STATE_FIELDS.len()]
        };
        i += 1;
    }
    fields
};

const DENEB_BODY_FIELDS: [&str; 12] = [
    "randao_reveal",
    "eth1_data",
    "graffiti",
    "proposer_slashings",
    "attester_slashings",
    "attestations",
    "deposits",
    "voluntary_exits",
    "sync_aggregate",
    "execution_payload",
    "bls_to_execution_changes",
    "blob_kzg_commitments",
];

const ELECTRA_BODY_FIELDS: [&str; 13] = {
    let mut fields = ["execution_requests"; 13];
    let mut i = 0;
    while i < DENEB_BODY_FIELDS.len() {
        fields[i] = DENEB_BODY_FIELDS[i];
        i += 1;
    }
    fields
};

const BEACON_BLOCK: ContainerSchema = ContainerSchema {
    name: "BeaconBlock",
    fields: &["slot", "proposer_index", "parent_root", "state_root", "body"],
};

const EXECUTION_PAYLOAD: ContainerSchema = ContainerSchema {
    name: "ExecutionPayload",
    fields: &[
        "parent_hash",
        "fee_recipient",
        "state_root",
        "receipts_root",
        "logs_bloom",
        "prev_randao",
        "block_number",
        "gas_limit",
        "gas_used",
        "timestamp",
        "extra_data",
        "base_fee_per_gas",
        "block_hash",
        "transactions",
        "withdrawals",
        "blob_gas_used",
        "excess_blob_gas",
    ],
};

const DENEB_PRESET: ForkSchema = ForkSchema {
    fork: Fork::Deneb,
    state: ContainerSchema {
        name: "BeaconState",
        fields: &DENEB_STATE_FIELDS,
    },
    block_header: BEACON_BLOCK_HEADER,
    validator: VALIDATOR,
    block: BEACON_BLOCK,
    block_body: ContainerSchema {
        name: "BeaconBlockBody",
        fields: &DENEB_BODY_FIELDS,
    },
    execution_payload: EXECUTION_PAYLOAD,
    historical_summary: HISTORICAL_SUMMARY,
    validator_registry_limit: 1 << 40,
    slots_per_historical_root: 8192,
    historical_roots_limit: 1 << 24,
    max_withdrawals_per_payload: 16,
};

/// Deneb mainnet preset.
pub static DENEB: ForkSchema = DENEB_PRESET;

/// Electra mainnet preset. The state outgrows 32 chunks, so every state
/// field gindex moves under a 64-leaf ceiling; block paths are unchanged.
pub static ELECTRA: ForkSchema = ForkSchema {
    fork: Fork::Electra,
    state: ContainerSchema {
        name: "BeaconState",
        fields: &ELECTRA_STATE_FIELDS,
    },
    block_body: ContainerSchema {
        name: "BeaconBlockBody",
        fields: &ELECTRA_BODY_FIELDS,
    },
    ..DENEB_PRESET
};
