// Runner - Simulation driver
// Principle: Drive the engine exactly as a host chain would, one epoch at a time

use crate::cli::SimulateCmd;
use casper_ffg::{
    Address, Balance, BalanceTransfer, BlockClock, CasperConfig, CasperEngine, CasperError,
    ChainClock, CheckpointOracle, Ed25519Verifier, EpochNumber, Hash, LogoutRequest,
    SignatureVerifier, ValidationKey, ValidatorIndex, ValidatorStatus, Vote, ETHER,
};
use casper_ffg::types::Signature64;
use casper_ffg::TransferError;
use ed25519_dalek::SigningKey;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Runner errors
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("Engine error: {0}")]
    Engine(#[from] CasperError),

    #[error("Invalid arguments: {0}")]
    Args(String),
}

/// Linear in-memory chain: every checkpoint descends from every earlier one
pub struct LocalChain {
    pub clock: BlockClock,
    pub balances: HashMap<Address, Balance>,
}

impl LocalChain {
    pub fn new(epoch_length: u64) -> Self {
        Self {
            clock: BlockClock::new(epoch_length),
            balances: HashMap::new(),
        }
    }
}

impl SignatureVerifier for LocalChain {
    fn verify(&self, key: &ValidationKey, message: &[u8], signature: &Signature64) -> bool {
        Ed25519Verifier.verify(key, message, signature)
    }
}

impl CheckpointOracle for LocalChain {
    fn checkpoint_hash(&self, epoch: EpochNumber) -> Hash {
        let mut data = b"checkpoint:".to_vec();
        data.extend_from_slice(&epoch.to_le_bytes());
        Hash::hash(&data)
    }

    fn descends_from(&self, _target: &Hash, _source: &Hash) -> bool {
        true
    }
}

impl BalanceTransfer for LocalChain {
    fn transfer(&mut self, to: &Address, amount: Balance) -> Result<(), TransferError> {
        let balance = self.balances.entry(*to).or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or_else(|| TransferError(format!("balance overflow for {}", to)))?;
        Ok(())
    }
}

impl ChainClock for LocalChain {
    fn current_chain_epoch(&self) -> EpochNumber {
        self.clock.current_chain_epoch()
    }
}

/// Per-validator outcome
#[derive(Debug, Clone, Serialize)]
pub struct ValidatorReport {
    pub index: ValidatorIndex,
    pub status: ValidatorStatus,
    pub deposit_size: Balance,
    pub slashed: bool,
    pub online: bool,
    pub payout: Option<Balance>,
}

/// Summary of a simulation run
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub epoch: EpochNumber,
    pub dynasty: u64,
    pub last_justified_epoch: EpochNumber,
    pub last_finalized_epoch: EpochNumber,
    pub deposit_scale_factor: f64,
    pub reward_factor: f64,
    pub total_slashed: Balance,
    pub bounties: Balance,
    pub votes_accepted: usize,
    pub votes_rejected: usize,
    pub validators: Vec<ValidatorReport>,
}

struct SimValidator {
    index: ValidatorIndex,
    key: SigningKey,
    online: bool,
    payout: Option<Balance>,
}

/// Run a simulation as described by `cmd`
pub fn run_simulation(cmd: &SimulateCmd) -> Result<SimulationReport, RunnerError> {
    check_args(cmd)?;

    let config = match &cmd.config {
        Some(path) => CasperConfig::from_file(path)?,
        None => CasperConfig::default(),
    };
    let host = LocalChain::new(config.epoch_length);
    let mut engine = CasperEngine::new(config, host)?;

    info!(
        "🚀 Simulating {} validators ({} offline) for {} epochs",
        cmd.validators, cmd.offline, cmd.epochs
    );

    let mut rng = StdRng::seed_from_u64(cmd.seed);
    let amount = Balance::from(cmd.deposit) * ETHER;
    let online_count = cmd.validators - cmd.offline;

    let mut validators = Vec::with_capacity(cmd.validators);
    for i in 0..cmd.validators {
        let key = SigningKey::generate(&mut rng);
        let validation_key = ValidationKey::from_public_key(&key.verifying_key());
        let index = engine.induct(validation_key, withdrawal_address(&validation_key), amount)?;
        validators.push(SimValidator {
            index,
            key,
            online: i < online_count,
            payout: None,
        });
    }

    let reporter = Address::from_bytes([0xEE; 20]);
    let mut pending_slash = cmd.slash;
    let mut pending_logout = cmd.logout;
    let mut bounties: Balance = 0;
    let mut votes_accepted = 0;
    let mut votes_rejected = 0;

    for _ in 0..cmd.epochs {
        let epoch = engine.current_epoch() + 1;
        engine.host_mut().clock.advance_to_epoch(epoch);
        engine.initialize_epoch(epoch)?;
        let dynasty = engine.dynasty();

        if let Some(i) = pending_slash {
            let validator = &validators[i];
            if engine.validator(validator.index)?.in_dynasty(dynasty) {
                let target_epoch = engine.current_epoch();
                let source_epoch = engine.recommended_source_epoch();
                let honest = Vote::signed(
                    validator.index,
                    engine.recommended_target_hash(),
                    target_epoch,
                    source_epoch,
                    &validator.key,
                );
                let conflicting = Vote::signed(
                    validator.index,
                    Hash::hash(b"conflicting checkpoint"),
                    target_epoch,
                    source_epoch,
                    &validator.key,
                );
                let record = engine.slash(&honest, &conflicting, &reporter)?;
                bounties += record.bounty;
                pending_slash = None;
            }
        }

        if let Some(i) = pending_logout {
            let validator = &validators[i];
            if engine.validator(validator.index)?.in_dynasty(dynasty) {
                let request = LogoutRequest::signed(validator.index, epoch, &validator.key);
                match engine.logout(&request) {
                    Ok(()) => {}
                    // Slashing already forced the logout
                    Err(CasperError::AlreadyLoggedOut { .. }) => {
                        warn!("Validator {} already logged out", validator.index)
                    }
                    Err(e) => return Err(e.into()),
                }
                pending_logout = None;
            }
        }

        for validator in validators.iter().filter(|v| v.online) {
            let record = engine.validator(validator.index)?;
            if !record.in_dynasty(dynasty) && !record.in_dynasty(dynasty.saturating_sub(1)) {
                continue;
            }
            let vote = Vote::signed(
                validator.index,
                engine.recommended_target_hash(),
                engine.current_epoch(),
                engine.recommended_source_epoch(),
                &validator.key,
            );
            match engine.vote(&vote) {
                Ok(_) => votes_accepted += 1,
                Err(CasperError::InvalidVote(reason)) => {
                    debug!("Vote from validator {} rejected: {}", validator.index, reason);
                    votes_rejected += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }

        for validator in validators.iter_mut().filter(|v| v.payout.is_none()) {
            if engine.withdrawable(validator.index).is_ok() {
                validator.payout = Some(engine.withdraw(validator.index)?);
            }
        }
    }

    let dynasty = engine.dynasty();
    let mut reports = Vec::with_capacity(validators.len());
    for validator in &validators {
        let record = engine.validator(validator.index)?;
        reports.push(ValidatorReport {
            index: validator.index,
            status: record.status(dynasty),
            deposit_size: engine.deposit_size(validator.index)?,
            slashed: record.is_slashed,
            online: validator.online,
            payout: validator.payout,
        });
    }

    info!(
        "✅ Simulation finished at epoch {} (dynasty {}, last finalized {})",
        engine.current_epoch(),
        dynasty,
        engine.last_finalized_epoch()
    );

    Ok(SimulationReport {
        epoch: engine.current_epoch(),
        dynasty,
        last_justified_epoch: engine.last_justified_epoch(),
        last_finalized_epoch: engine.last_finalized_epoch(),
        deposit_scale_factor: engine.deposit_scale_factor(),
        reward_factor: engine.reward_factor(),
        total_slashed: engine.total_slashed(engine.current_epoch()),
        bounties,
        votes_accepted,
        votes_rejected,
        validators: reports,
    })
}

fn check_args(cmd: &SimulateCmd) -> Result<(), RunnerError> {
    if cmd.validators == 0 {
        return Err(RunnerError::Args("at least one validator is required".into()));
    }
    if cmd.offline > cmd.validators {
        return Err(RunnerError::Args(format!(
            "{} offline validators but only {} validators",
            cmd.offline, cmd.validators
        )));
    }
    for (flag, target) in [("--slash", cmd.slash), ("--logout", cmd.logout)] {
        if let Some(i) = target {
            if i >= cmd.validators {
                return Err(RunnerError::Args(format!("{} {} out of range", flag, i)));
            }
        }
    }
    Ok(())
}

/// Payout address derived from the validation key
fn withdrawal_address(key: &ValidationKey) -> Address {
    let digest = Hash::hash(key.as_bytes());
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&digest.as_bytes()[..20]);
    Address::from_bytes(bytes)
}

/// Human-readable report
pub fn print_report(report: &SimulationReport) {
    println!("Epoch {} / dynasty {}", report.epoch, report.dynasty);
    println!(
        "Last justified {} / last finalized {}",
        report.last_justified_epoch, report.last_finalized_epoch
    );
    println!(
        "Scale factor {:.6} / reward factor {:.6}",
        report.deposit_scale_factor, report.reward_factor
    );
    println!(
        "Votes {} accepted, {} rejected / slashed {} wei, bounties {} wei",
        report.votes_accepted, report.votes_rejected, report.total_slashed, report.bounties
    );
    for v in &report.validators {
        let payout = v.payout.map(|p| p.to_string()).unwrap_or_else(|| "-".into());
        println!(
            "  #{:<3} {:<10} deposit {:>28} wei  payout {:>28}{}{}",
            v.index,
            format!("{:?}", v.status),
            v.deposit_size,
            payout,
            if v.slashed { "  slashed" } else { "" },
            if v.online { "" } else { "  offline" },
        );
    }
}
