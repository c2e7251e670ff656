//! Proof Generator
//!
//! Reads SSZ-encoded beacon states/blocks from disk and writes JSON proof
//! records for validator fields, block roots, historical summaries, and withdrawals.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use beacon_proofs::{
    batch, decode_block, decode_signed_block, decode_state, BlockProver, FactKind, Fork, Hash32,
    ProofRecord, StateProver, ValidatorField,
};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "generate-proofs")]
#[command(about = "Generate SSZ Merkle proofs against beacon state and block snapshots")]
struct Args {
    /// Fork the snapshots were produced under
    #[arg(long, env = "PROOF_FORK", default_value = "deneb")]
    fork: String,

    /// SSZ-encoded BeaconState
    #[arg(long, env = "PROOF_STATE")]
    state: Option<PathBuf>,

    /// SSZ-encoded BeaconBlock (or SignedBeaconBlock with --signed)
    #[arg(long, env = "PROOF_BLOCK")]
    block: Option<PathBuf>,

    /// The block file holds a SignedBeaconBlock
    #[arg(long)]
    signed: bool,

    /// Output file for JSON records (stdout if omitted)
    #[arg(short, long, env = "PROOF_OUTPUT")]
    output: Option<PathBuf>,

    /// Era of the first historical summary
    #[arg(long, default_value = "0")]
    summary_offset: u64,

    /// Recompute roots with ssz_rs, then re-fold every written record against them
    #[arg(long)]
    self_check: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validator field proofs up to the state's block root
    Validators {
        /// Validator indices
        #[arg(required = true, value_delimiter = ',')]
        indices: Vec<u64>,

        #[arg(long, value_enum, default_value = "credentials")]
        field: FieldArg,
    },
    /// `block_roots` proofs up to the state's block root
    BlockRoots {
        #[arg(required = true, value_delimiter = ',')]
        slots: Vec<u64>,
    },
    /// `historical_summaries` proofs for the eras containing the given slots
    HistoricalSummaries {
        #[arg(required = true, value_delimiter = ',')]
        slots: Vec<u64>,
    },
    /// Block roots inside their era's summary container (state must sit on
    /// the first slot of the following era)
    EraBlockRoots {
        #[arg(required = true, value_delimiter = ',')]
        slots: Vec<u64>,
    },
    /// Withdrawal proofs up to the block's root (all withdrawals if none given)
    Withdrawals {
        #[arg(value_delimiter = ',')]
        indices: Vec<u64>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum FieldArg {
    Credentials,
    WithdrawableEpoch,
}

impl From<FieldArg> for ValidatorField {
    fn from(field: FieldArg) -> Self {
        match field {
            FieldArg::Credentials => Self::Credentials,
            FieldArg::WithdrawableEpoch => Self::WithdrawableEpoch,
        }
    }
}

fn read(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("reading {}", path.display()))
}

fn load_state(args: &Args, fork: Fork) -> Result<StateProver> {
    let Some(path) = &args.state else {
        bail!("--state (or PROOF_STATE) is required for this command");
    };
    let state = decode_state(fork, &read(path)?).context("decoding state")?;
    let prover = StateProver::new(state)?.with_summary_offset(args.summary_offset);
    if args.self_check {
        prover.self_check().context("state root self-check")?;
    }
    tracing::info!(
        slot = prover.slot(),
        validators = prover.validator_count(),
        block_root = %hex::encode(prover.block_root()),
        "Loaded state"
    );
    Ok(prover)
}

fn load_block(args: &Args, fork: Fork) -> Result<BlockProver> {
    let Some(path) = &args.block else {
        bail!("--block (or PROOF_BLOCK) is required for this command");
    };
    let bytes = read(path)?;
    let block = if args.signed {
        decode_signed_block(fork, &bytes)
    } else {
        decode_block(fork, &bytes)
    }
    .context("decoding block")?;
    let prover = BlockProver::new(block)?;
    if args.self_check {
        prover.self_check().context("block root self-check")?;
    }
    tracing::info!(
        slot = prover.slot(),
        withdrawals = prover.withdrawal_count(),
        block_root = %hex::encode(prover.block_root()),
        "Loaded block"
    );
    Ok(prover)
}

/// The records for `args.command`, plus the root they all fold to.
fn generate(args: &Args, fork: Fork) -> Result<(Hash32, Vec<ProofRecord>)> {
    match &args.command {
        Command::Validators { indices, field } => {
            let prover = load_state(args, fork)?;
            let records = batch::validator_records(&prover, indices, (*field).into())
                .into_iter()
                .zip(indices)
                .map(|(record, index)| record.with_context(|| format!("validator {index}")))
                .collect::<Result<_>>()?;
            Ok((prover.block_root(), records))
        }
        Command::BlockRoots { slots } => {
            let prover = load_state(args, fork)?;
            let root = prover.block_root();
            let records = slots
                .iter()
                .map(|&slot| -> Result<ProofRecord> {
                    let proof = prover
                        .block_root_proof(slot)
                        .with_context(|| format!("block root at slot {slot}"))?;
                    Ok(ProofRecord::new(fork, FactKind::BlockRoot, slot, proof, root)?)
                })
                .collect::<Result<_>>()?;
            Ok((root, records))
        }
        Command::HistoricalSummaries { slots } => {
            let prover = load_state(args, fork)?;
            let root = prover.block_root();
            let records = slots
                .iter()
                .map(|&slot| -> Result<ProofRecord> {
                    let proof = prover
                        .historical_summary_proof(slot)
                        .with_context(|| format!("historical summary for slot {slot}"))?;
                    Ok(ProofRecord::new(fork, FactKind::HistoricalSummary, slot, proof, root)?)
                })
                .collect::<Result<_>>()?;
            Ok((root, records))
        }
        Command::EraBlockRoots { slots } => {
            let prover = load_state(args, fork)?;
            let root = prover.era_summary_root().context("hashing era summary")?;
            let records = slots
                .iter()
                .map(|&slot| -> Result<ProofRecord> {
                    let proof = prover
                        .historical_summary_block_root_proof(slot)
                        .with_context(|| format!("era block root at slot {slot}"))?;
                    Ok(ProofRecord::new(fork, FactKind::HistoricalBlockRoot, slot, proof, root)?)
                })
                .collect::<Result<_>>()?;
            Ok((root, records))
        }
        Command::Withdrawals { indices } => {
            let prover = load_block(args, fork)?;
            let root = prover.block_root();
            let indices = if indices.is_empty() {
                (0..prover.withdrawal_count()).collect()
            } else {
                indices.clone()
            };
            let records = indices
                .into_iter()
                .map(|index| -> Result<ProofRecord> {
                    let proof = prover
                        .withdrawal_proof(index)
                        .with_context(|| format!("withdrawal {index}"))?;
                    Ok(ProofRecord::new(fork, FactKind::Withdrawal, index, proof, root)?)
                })
                .collect::<Result<_>>()?;
            Ok((root, records))
        }
    }
}

fn main() -> Result<()> {
    // Load environment from .env if present
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let fork: Fork = args.fork.parse()?;

    tracing::info!(%fork, command = ?args.command, "Generating proofs");

    let (root, records) = generate(&args, fork)?;
    let json = serde_json::to_string_pretty(&records)?;

    if args.self_check {
        // Check what will be written, not the in-memory records.
        let written: Vec<ProofRecord> = serde_json::from_str(&json)?;
        for record in &written {
            record
                .verify(&root)
                .with_context(|| format!("self-check of {} {}", record.kind, record.selector))?;
        }
        tracing::info!(count = written.len(), root = %hex::encode(root), "All proofs verified");
    }

    match &args.output {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
            tracing::info!(path = %path.display(), count = records.len(), "Wrote proofs");
        }
        None => println!("{json}"),
    }

    Ok(())
}
