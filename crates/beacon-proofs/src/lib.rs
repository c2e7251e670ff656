//! # Beacon Proofs
//!
//! SSZ generalized-index Merkle proofs for Beacon chain states and blocks.
//! Generates proofs for:
//! - `validators[i].withdrawal_credentials`
//! - `validators[i].withdrawable_epoch`
//! - `body.execution_payload.withdrawals[i]`
//! - `block_roots[slot % 8192]` and `historical_summaries[era]`
//!
//! Deneb and Electra layouts are supported; see [`schema`] for the per-fork
//! tables. All proofs fold to a block root, using the verifier in [`verify`].

pub mod batch;
pub mod beacon_state;
pub mod block_prover;
pub mod chain;
pub mod codec;
pub mod gindex;
pub mod proof;
pub mod schema;
pub mod sparse_proof;
pub mod state_prover;
pub mod tree;
pub mod types;
pub mod verify;

pub use block_prover::BlockProver;
pub use codec::{decode_block, decode_signed_block, decode_state, BeaconBlock, BeaconState};
pub use gindex::{Gindex, GindexCalculator, RelativeIndex};
pub use proof::{FactKind, Proof, ProofError, ProofRecord};
pub use schema::Fork;
pub use sparse_proof::{MerkleTree, ProofSource};
pub use state_prover::{StateProver, ValidatorField};
pub use types::Hash32;
pub use verify::{verify_proof, VerifyError};
