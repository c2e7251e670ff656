//! Integration tests for the beacon-proofs crate
//!
//! Builds synthetic Deneb and Electra snapshots, round-trips them through the SSZ codec,
//! and checks every extractor against `ssz_rs` and the reference verifier.

use beacon_proofs::beacon_state::{
    BeaconBlockDeneb, BeaconBlockElectra, BeaconBlockHeader, BeaconStateDeneb,
    BeaconStateElectra, HistoricalSummary, PendingPartialWithdrawal, Validator, Withdrawal,
};
use beacon_proofs::chain::recent_withdrawal_proof;
use beacon_proofs::state_prover::validator_field_gindex;
use beacon_proofs::{
    batch, decode_block, decode_state, verify_proof, BlockProver, FactKind, Fork,
    GindexCalculator, Hash32, ProofError, ProofRecord, StateProver, ValidatorField, VerifyError,
};
use ssz_rs::prelude::*;

const VALIDATORS: u64 = 300;

fn make_validator(index: u64) -> Validator {
    let mut v = Validator::default();
    v.withdrawal_credentials[0] = 0x01;
    v.withdrawal_credentials[24..32].copy_from_slice(&index.to_be_bytes());
    v.effective_balance = 32_000_000_000;
    v.activation_epoch = index;
    v.exit_epoch = u64::MAX;
    v.withdrawable_epoch = u64::MAX - index;
    v
}

fn make_state(slot: u64) -> BeaconStateDeneb {
    let mut state = BeaconStateDeneb {
        genesis_time: 1_742_213_400,
        slot,
        latest_block_header: BeaconBlockHeader {
            slot,
            proposer_index: 42,
            parent_root: [0xaa; 32],
            body_root: [0xbb; 32],
            ..Default::default()
        },
        ..Default::default()
    };
    for i in 0..VALIDATORS {
        state.validators.push(make_validator(i));
        state.balances.push(32_000_000_000 + i);
    }
    let roots: Vec<Hash32> = (0..8192u64)
        .map(|i| {
            let mut root = [0x10; 32];
            root[..8].copy_from_slice(&i.to_le_bytes());
            root
        })
        .collect();
    state.block_roots = roots.try_into().unwrap();
    state
}

fn make_block(slot: u64, withdrawals: u64) -> BeaconBlockDeneb {
    let mut block = BeaconBlockDeneb {
        slot,
        proposer_index: 7,
        parent_root: [0x01; 32],
        state_root: [0x02; 32],
        ..Default::default()
    };
    for i in 0..withdrawals {
        block.body.execution_payload.withdrawals.push(Withdrawal {
            index: 90_000 + i,
            validator_index: i * 3,
            address: [0xee; 20],
            amount: 16_000_000 + i,
        });
    }
    block
}

/// Decode through the codec, as a caller holding raw bytes would.
fn state_prover(state: &BeaconStateDeneb) -> StateProver {
    let bytes = ssz_rs::serialize(state).expect("serialize");
    let decoded = decode_state(Fork::Deneb, &bytes).expect("decode");
    StateProver::new(decoded).expect("should create prover")
}

fn expected_roots(state: &BeaconStateDeneb) -> (Hash32, Hash32) {
    let state_root: Hash32 = state.hash_tree_root().unwrap().into();
    let mut header = state.latest_block_header.clone();
    header.state_root = state_root;
    (state_root, header.hash_tree_root().unwrap().into())
}

#[test]
fn test_roots_match_ssz_rs() {
    let state = make_state(20_000);
    let (state_root, block_root) = expected_roots(&state);
    let prover = state_prover(&state);
    assert_eq!(prover.state_root(), state_root);
    assert_eq!(prover.block_root(), block_root);
}

#[test]
fn test_validator_proofs_fold_to_block_root() {
    let state = make_state(20_000);
    let (_, block_root) = expected_roots(&state);
    let prover = state_prover(&state);
    let calculator = GindexCalculator::new(Fork::Deneb);

    for index in [0u64, 1, 2, 150, VALIDATORS - 1] {
        let validator = make_validator(index);

        let credentials = prover.validator_credentials_proof(index).unwrap();
        assert_eq!(credentials.branch().len(), 51);
        let gindex = calculator.validator_credentials_from_block_root(index).unwrap();
        assert_eq!(credentials.gindex(), gindex);
        // The credentials are the second child of the leaf pair.
        let pubkey: Hash32 = validator.pubkey.hash_tree_root().unwrap().into();
        verify_proof(
            &validator.withdrawal_credentials,
            &[&[pubkey][..], credentials.branch()].concat(),
            gindex * 2 + 1,
            &block_root,
        )
        .unwrap();

        let epoch = prover.validator_withdrawable_epoch_proof(index).unwrap();
        assert_eq!(epoch.branch().len(), 52);
        let mut leaf = [0u8; 32];
        leaf[..8].copy_from_slice(&validator.withdrawable_epoch.to_le_bytes());
        verify_proof(
            &leaf,
            epoch.branch(),
            validator_field_gindex(&calculator, index, ValidatorField::WithdrawableEpoch).unwrap(),
            &block_root,
        )
        .unwrap();
    }
}

#[test]
fn test_validator_proof_cross_checks_with_ssz_rs() {
    let state = make_state(64);
    let prover = state_prover(&state);
    let proof = prover.validator_withdrawable_epoch_proof(5).unwrap();

    let root_node = Node::try_from(prover.block_root().as_slice()).unwrap();
    let leaf_node = Node::try_from(proof.leaf().as_slice()).unwrap();
    let branch: Vec<Node> = proof
        .branch()
        .iter()
        .map(|b| Node::try_from(b.as_slice()).unwrap())
        .collect();

    ssz_rs::proofs::is_valid_merkle_branch_for_generalized_index(
        leaf_node,
        &branch,
        proof.gindex() as usize,
        root_node,
    )
    .expect("validator proof should verify with ssz_rs");
}

#[test]
fn test_validator_index_past_registry() {
    let prover = state_prover(&make_state(0));
    assert!(matches!(
        prover.validator_credentials_proof(VALIDATORS),
        Err(ProofError::IndexOutOfBounds { collection: "validators", .. })
    ));
}

#[test]
fn test_block_root_proofs_fold_to_block_root() {
    let state = make_state(10_000);
    let (_, block_root) = expected_roots(&state);
    let prover = state_prover(&state);

    for slot in [1900u64, 4000, 8191, 8192, 9999, 10_000] {
        let proof = prover.block_root_proof(slot).unwrap();
        assert_eq!(proof.branch().len(), 21);
        assert_eq!(&proof.leaf()[..8], &(slot % 8192).to_le_bytes());
        assert_eq!(
            proof.gindex(),
            GindexCalculator::new(Fork::Deneb).block_root_from_block_root(slot).unwrap()
        );
        proof.verify(&block_root).unwrap();
    }
}

#[test]
fn test_withdrawal_proofs_fold_to_block_root() {
    let block = make_block(11_544_444, 16);
    let expected: Hash32 = block.hash_tree_root().unwrap().into();
    let bytes = ssz_rs::serialize(&block).expect("serialize");
    let prover = BlockProver::new(decode_block(Fork::Deneb, &bytes).unwrap()).unwrap();
    assert_eq!(prover.block_root(), expected);

    for (i, withdrawal) in block.body.execution_payload.withdrawals.iter().enumerate() {
        let proof = prover.withdrawal_proof(i as u64).unwrap();
        let leaf: Hash32 = withdrawal.hash_tree_root().unwrap().into();
        verify_proof(&leaf, proof.branch(), proof.gindex(), &expected).unwrap();
    }
}

#[test]
fn test_withdrawal_chain_through_state() {
    let block = make_block(700, 4);
    let block_root: Hash32 = block.hash_tree_root().unwrap().into();

    let mut state = make_state(800);
    let mut roots: Vec<Hash32> = state.block_roots.iter().copied().collect();
    roots[700] = block_root;
    state.block_roots = roots.try_into().unwrap();
    let (_, trusted_root) = expected_roots(&state);

    let block = BlockProver::new(block.into()).unwrap();
    let state = state_prover(&state);
    let proof = recent_withdrawal_proof(&block, &state, 3).unwrap();
    proof.verify(&trusted_root).unwrap();
}

#[test]
fn test_historical_summary_proof_folds_to_block_root() {
    let mut state = make_state(4 * 8192);
    for era in 0..4u8 {
        state.historical_summaries.push(HistoricalSummary {
            block_summary_root: [era; 32],
            state_summary_root: [era; 32],
        });
    }
    let (_, block_root) = expected_roots(&state);
    let prover = state_prover(&state);
    let proof = prover.historical_summary_proof(3 * 8192 + 1).unwrap();
    assert_eq!(proof.branch().len(), 5 + 1 + 24 + 3);
    proof.verify(&block_root).unwrap();
}

#[test]
fn test_proofs_are_deterministic() {
    let state = make_state(123);
    let a = state_prover(&state);
    let b = state_prover(&state);
    for index in [0u64, 17, 299] {
        assert_eq!(
            a.validator_credentials_proof(index).unwrap().into_branch(),
            b.validator_credentials_proof(index).unwrap().into_branch()
        );
    }
    assert_eq!(a.block_root_proof(100).unwrap(), b.block_root_proof(100).unwrap());
}

#[test]
fn test_batch_records_round_trip_through_json() {
    let prover = state_prover(&make_state(33));
    let indices: Vec<u64> = (0..VALIDATORS).step_by(37).collect();
    let records: Vec<ProofRecord> =
        batch::validator_records(&prover, &indices, ValidatorField::Credentials)
            .into_iter()
            .collect::<Result<_, _>>()
            .unwrap();
    assert_eq!(records.len(), indices.len());

    let json = serde_json::to_string(&records).unwrap();
    let decoded: Vec<ProofRecord> = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, records);
    for (record, index) in decoded.iter().zip(&indices) {
        assert_eq!(record.kind, FactKind::ValidatorCredentials);
        assert_eq!(record.selector, *index);
        assert_eq!(record.root, prover.block_root());
        record.verify(&prover.block_root()).unwrap();
    }
}

#[test]
fn test_record_rejects_other_snapshot_root() {
    let prover = state_prover(&make_state(33));
    let other = state_prover(&make_state(34));
    let proof = prover.block_root_proof(10).unwrap();

    assert!(matches!(
        ProofRecord::new(Fork::Deneb, FactKind::BlockRoot, 10, proof.clone(), other.block_root()),
        Err(ProofError::RootMismatch { .. })
    ));

    let record =
        ProofRecord::new(Fork::Deneb, FactKind::BlockRoot, 10, proof, prover.block_root()).unwrap();
    let json = serde_json::to_string(&record).unwrap();
    let decoded: ProofRecord = serde_json::from_str(&json).unwrap();
    decoded.verify(&prover.block_root()).unwrap();
    assert!(matches!(
        decoded.verify(&other.block_root()),
        Err(ProofError::RootMismatch { .. })
    ));
}

fn make_electra_state(slot: u64) -> BeaconStateElectra {
    let deneb = make_state(slot);
    let mut state = BeaconStateElectra {
        genesis_time: deneb.genesis_time,
        slot,
        latest_block_header: deneb.latest_block_header,
        block_roots: deneb.block_roots,
        validators: deneb.validators,
        balances: deneb.balances,
        earliest_exit_epoch: 364_032,
        ..Default::default()
    };
    state.pending_partial_withdrawals.push(PendingPartialWithdrawal {
        validator_index: 3,
        amount: 1_000_000_000,
        withdrawable_epoch: 364_100,
    });
    state
}

#[test]
fn test_electra_state_proofs_fold_to_block_root() {
    let state = make_electra_state(20_000);
    let state_root: Hash32 = state.hash_tree_root().unwrap().into();
    let mut header = state.latest_block_header.clone();
    header.state_root = state_root;
    let block_root: Hash32 = header.hash_tree_root().unwrap().into();

    let bytes = ssz_rs::serialize(&state).expect("serialize");
    let prover = StateProver::new(decode_state(Fork::Electra, &bytes).unwrap()).unwrap();
    assert_eq!(prover.fork(), Fork::Electra);
    assert_eq!(prover.state_root(), state_root);
    assert_eq!(prover.block_root(), block_root);

    let calculator = GindexCalculator::new(Fork::Electra);
    let deneb = GindexCalculator::new(Fork::Deneb);
    for index in [0u64, 150, VALIDATORS - 1] {
        let proof = prover.validator_withdrawable_epoch_proof(index).unwrap();
        assert_eq!(proof.branch().len(), 53);
        let gindex =
            validator_field_gindex(&calculator, index, ValidatorField::WithdrawableEpoch).unwrap();
        assert_eq!(proof.gindex(), gindex);
        assert_ne!(
            gindex,
            validator_field_gindex(&deneb, index, ValidatorField::WithdrawableEpoch).unwrap()
        );
        verify_proof(proof.leaf(), proof.branch(), gindex, &block_root).unwrap();
    }

    let proof = prover.block_root_proof(19_000).unwrap();
    assert_eq!(proof.gindex(), calculator.block_root_from_block_root(19_000).unwrap());
    proof.verify(&block_root).unwrap();
}

#[test]
fn test_electra_withdrawals_through_codec() {
    let deneb = make_block(11_544_444, 16);
    let mut block = BeaconBlockElectra {
        slot: deneb.slot,
        proposer_index: deneb.proposer_index,
        ..Default::default()
    };
    block.body.execution_payload = deneb.body.execution_payload;
    let expected: Hash32 = block.hash_tree_root().unwrap().into();

    let bytes = ssz_rs::serialize(&block).expect("serialize");
    let prover = BlockProver::new(decode_block(Fork::Electra, &bytes).unwrap()).unwrap();
    assert_eq!(prover.block_root(), expected);
    prover.self_check().unwrap();
    for index in [0u64, 15] {
        let proof = prover.withdrawal_proof(index).unwrap();
        assert_eq!(proof.gindex(), 206_272 + u128::from(index));
        proof.verify(&expected).unwrap();
    }
}

#[test]
fn test_tampered_proof_is_rejected() {
    let prover = state_prover(&make_state(50));
    let proof = prover.validator_credentials_proof(9).unwrap();
    let mut branch = proof.branch().to_vec();
    branch[10][0] ^= 1;
    assert!(matches!(
        verify_proof(proof.leaf(), &branch, proof.gindex(), &prover.block_root()),
        Err(VerifyError::ProofMismatch { .. })
    ));
    // Dropping a row breaks the gindex/length agreement.
    assert!(matches!(
        verify_proof(proof.leaf(), &branch[1..], proof.gindex(), &prover.block_root()),
        Err(VerifyError::MalformedProof { .. })
    ));
}

#[test]
fn test_unsupported_fork() {
    assert!(matches!(
        "fulu".parse::<Fork>(),
        Err(ProofError::UnsupportedFork(_))
    ));
}
