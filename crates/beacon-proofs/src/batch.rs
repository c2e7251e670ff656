//! Parallel proof extraction.
//!
//! Proofs for different validators are independent, so a batch is a parallel
//! map over the indices sharing one read-only [`StateProver`].

use rayon::prelude::*;
use tracing::{info, instrument};

use crate::gindex::frame;
use crate::proof::{FactKind, Proof, ProofError, ProofRecord};
use crate::state_prover::{StateProver, ValidatorField};

/// One proof per index, in input order.
#[instrument(skip_all, fields(count = indices.len(), ?field))]
pub fn prove_validators(
    prover: &StateProver,
    indices: &[u64],
    field: ValidatorField,
) -> Vec<Result<Proof<frame::BlockHeader, frame::Field>, ProofError>> {
    let proofs: Vec<_> = indices
        .par_iter()
        .map(|&index| prover.validator_proof(index, field))
        .collect();
    let failed = proofs.iter().filter(|p| p.is_err()).count();
    info!(generated = proofs.len() - failed, failed, "Validator batch done");
    proofs
}

/// As [`prove_validators`], flattened into JSON records checked against the
/// prover's block root.
pub fn validator_records(
    prover: &StateProver,
    indices: &[u64],
    field: ValidatorField,
) -> Vec<Result<ProofRecord, ProofError>> {
    let kind = match field {
        ValidatorField::Credentials => FactKind::ValidatorCredentials,
        ValidatorField::WithdrawableEpoch => FactKind::ValidatorWithdrawableEpoch,
    };
    let root = prover.block_root();
    prove_validators(prover, indices, field)
        .into_iter()
        .zip(indices)
        .map(|(proof, &index)| ProofRecord::new(prover.fork(), kind, index, proof?, root))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beacon_state::{BeaconStateDeneb, Validator};

    fn prover(validators: u64) -> StateProver {
        let mut state = BeaconStateDeneb {
            slot: 64,
            ..Default::default()
        };
        for i in 0..validators {
            let mut v = Validator::default();
            v.withdrawal_credentials[31] = i as u8;
            v.withdrawable_epoch = i;
            state.validators.push(v);
        }
        StateProver::new(state.into()).unwrap()
    }

    #[test]
    fn test_batch_matches_sequential_in_order() {
        let prover = prover(32);
        let indices: Vec<u64> = (0..32).rev().collect();
        let batch = prove_validators(&prover, &indices, ValidatorField::Credentials);

        assert_eq!(batch.len(), indices.len());
        for (proof, &index) in batch.into_iter().zip(&indices) {
            let sequential = prover.validator_credentials_proof(index).unwrap();
            assert_eq!(proof.unwrap(), sequential);
        }
    }

    #[test]
    fn test_batch_reports_errors_per_index() {
        let prover = prover(4);
        let batch = prove_validators(&prover, &[1, 9, 3], ValidatorField::WithdrawableEpoch);
        assert!(batch[0].is_ok());
        assert!(matches!(batch[1], Err(ProofError::IndexOutOfBounds { index: 9, .. })));
        assert!(batch[2].is_ok());
    }

    #[test]
    fn test_records_fold_to_block_root() {
        let prover = prover(8);
        for record in validator_records(&prover, &[0, 7], ValidatorField::WithdrawableEpoch) {
            let record = record.unwrap();
            assert_eq!(record.kind, FactKind::ValidatorWithdrawableEpoch);
            assert_eq!(record.root, prover.block_root());
            record.verify(&prover.block_root()).unwrap();
        }
    }
}
