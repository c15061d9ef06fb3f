// Engine - the Casper FFG accounting context
//
// All ledger state lives in `CasperState`, an explicit context object that can
// be cloned to duplicate the whole ledger. `CasperEngine` pairs it with the
// configuration and the host capabilities and exposes the operations:
//
// - induct / logout            (registry.rs)
// - vote                       (voting.rs)
// - slash                      (slash.rs)
// - initialize_epoch           (transition.rs)
// - withdraw                   (withdraw.rs)
//
// Every operation checks everything first, then performs any external
// transfer, then mutates state. A rejected call leaves the state untouched.

pub mod host;
mod registry;
mod slash;
mod transition;
mod voting;
mod withdraw;

pub use transition::EpochTransition;
pub use voting::VoteOutcome;

use crate::consensus::checkpoint::Checkpoint;
use crate::consensus::dynasty::DynastyLedger;
use crate::consensus::scale::DepositScaleLedger;
use crate::consensus::slashing::SlashRecord;
use crate::consensus::validator::{Validator, ValidatorRegistry};
use crate::error::{CasperError, CasperResult};
use crate::genesis::CasperConfig;
use crate::types::{
    Balance, DynastyNumber, EpochNumber, Hash, ScaledDeposit, ValidatorIndex,
};
use host::Host;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

/// Complete ledger state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CasperState {
    pub validators: ValidatorRegistry,
    pub dynasties: DynastyLedger,
    pub scale: DepositScaleLedger,
    pub checkpoints: BTreeMap<EpochNumber, Checkpoint>,

    pub current_epoch: EpochNumber,
    pub expected_source_epoch: EpochNumber,
    pub last_justified_epoch: EpochNumber,
    pub last_finalized_epoch: EpochNumber,

    /// Whether the current epoch's checkpoint was justified by a vote
    pub main_hash_justified: bool,

    /// Reward paid per unit of scaled deposit for a vote with the expected source
    pub reward_factor: f64,

    /// Cumulative slashed deposits (currency) as of each epoch
    pub total_slashed: BTreeMap<EpochNumber, Balance>,

    /// Audit trail of slashes
    pub slashes: Vec<SlashRecord>,
}

impl CasperState {
    /// Genesis state: the genesis checkpoint is justified and finalized
    pub fn genesis(config: &CasperConfig, genesis_hash: Hash) -> Self {
        let epoch = config.genesis_epoch;

        let mut genesis = Checkpoint::new(genesis_hash);
        genesis.is_justified = true;
        genesis.is_finalized = true;

        let mut checkpoints = BTreeMap::new();
        checkpoints.insert(epoch, genesis);

        let mut total_slashed = BTreeMap::new();
        total_slashed.insert(epoch, 0);

        Self {
            validators: ValidatorRegistry::new(),
            dynasties: DynastyLedger::new(epoch),
            scale: DepositScaleLedger::new(epoch, config.initial_scale_factor),
            checkpoints,
            current_epoch: epoch,
            expected_source_epoch: epoch,
            last_justified_epoch: epoch,
            last_finalized_epoch: epoch,
            main_hash_justified: false,
            reward_factor: 0.0,
            total_slashed,
            slashes: Vec::new(),
        }
    }
}

/// Casper FFG engine
pub struct CasperEngine<H: Host> {
    config: CasperConfig,
    state: CasperState,
    host: H,
}

impl<H: Host> CasperEngine<H> {
    /// Start a new engine at the configured genesis epoch
    pub fn new(config: CasperConfig, host: H) -> CasperResult<Self> {
        config.validate()?;
        let state = CasperState::genesis(&config, host.checkpoint_hash(config.genesis_epoch));
        info!("Casper FFG engine started at epoch {}", config.genesis_epoch);
        Ok(Self { config, state, host })
    }

    /// Resume from an existing state
    pub fn from_state(config: CasperConfig, state: CasperState, host: H) -> CasperResult<Self> {
        config.validate()?;
        Ok(Self { config, state, host })
    }

    pub fn config(&self) -> &CasperConfig {
        &self.config
    }

    pub fn state(&self) -> &CasperState {
        &self.state
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_parts(self) -> (CasperConfig, CasperState, H) {
        (self.config, self.state, self.host)
    }

    // ===== COUNTERS =====

    pub fn current_epoch(&self) -> EpochNumber {
        self.state.current_epoch
    }

    pub fn dynasty(&self) -> DynastyNumber {
        self.state.dynasties.dynasty()
    }

    pub fn deposit_scale_factor(&self) -> f64 {
        self.state.scale.factor_at(self.state.current_epoch)
    }

    pub fn deposit_scale_factor_at(&self, epoch: EpochNumber) -> f64 {
        self.state.scale.factor_at(epoch)
    }

    pub fn reward_factor(&self) -> f64 {
        self.state.reward_factor
    }

    /// DYNASTY_LOGOUT_DELAY in effect
    pub fn dynasty_logout_delay(&self) -> u64 {
        self.config.dynasty_logout_delay
    }

    /// WITHDRAWAL_DELAY in effect
    pub fn withdrawal_delay(&self) -> u64 {
        self.config.withdrawal_delay
    }

    // ===== DEPOSIT TOTALS =====

    /// Scaled deposits of the current dynasty
    pub fn total_curdyn_deposits_scaled(&self) -> ScaledDeposit {
        self.state.dynasties.total_curdyn_deposits()
    }

    /// Scaled deposits of the previous dynasty
    pub fn total_prevdyn_deposits_scaled(&self) -> ScaledDeposit {
        self.state.dynasties.total_prevdyn_deposits()
    }

    /// Current-dynasty deposits in currency
    pub fn total_curdyn_deposits(&self) -> Balance {
        self.state
            .scale
            .to_real(self.total_curdyn_deposits_scaled(), self.state.current_epoch)
    }

    /// Previous-dynasty deposits in currency
    pub fn total_prevdyn_deposits(&self) -> Balance {
        self.state
            .scale
            .to_real(self.total_prevdyn_deposits_scaled(), self.state.current_epoch)
    }

    pub fn dynasty_wei_delta(&self, dynasty: DynastyNumber) -> ScaledDeposit {
        self.state.dynasties.delta(dynasty)
    }

    pub fn dynasty_start_epoch(&self, dynasty: DynastyNumber) -> Option<EpochNumber> {
        self.state.dynasties.dynasty_start_epoch(dynasty)
    }

    /// Cumulative slashed deposits as of `epoch` (zero for epochs not reached)
    pub fn total_slashed(&self, epoch: EpochNumber) -> Balance {
        self.state.total_slashed.get(&epoch).copied().unwrap_or(0)
    }

    // ===== VALIDATORS =====

    pub fn validator(&self, index: ValidatorIndex) -> CasperResult<&Validator> {
        self.state
            .validators
            .get(index)
            .ok_or(CasperError::ValidatorNotFound(index))
    }

    pub fn validator_count(&self) -> usize {
        self.state.validators.len()
    }

    /// Deposit in currency at the current scale factor
    pub fn deposit_size(&self, index: ValidatorIndex) -> CasperResult<Balance> {
        let validator = self.validator(index)?;
        Ok(self.state.scale.to_real(validator.deposit, self.state.current_epoch))
    }

    /// Scaled deposit
    pub fn deposit(&self, index: ValidatorIndex) -> CasperResult<ScaledDeposit> {
        Ok(self.validator(index)?.deposit)
    }

    pub fn is_slashed(&self, index: ValidatorIndex) -> CasperResult<bool> {
        Ok(self.validator(index)?.is_slashed)
    }

    pub fn end_dynasty(&self, index: ValidatorIndex) -> CasperResult<DynastyNumber> {
        Ok(self.validator(index)?.end_dynasty)
    }

    pub fn start_dynasty(&self, index: ValidatorIndex) -> CasperResult<DynastyNumber> {
        Ok(self.validator(index)?.start_dynasty)
    }

    pub fn total_deposits_at_logout(&self, index: ValidatorIndex) -> CasperResult<Balance> {
        Ok(self.validator(index)?.total_deposits_at_logout)
    }

    // ===== CHECKPOINTS =====

    pub fn is_justified(&self, epoch: EpochNumber) -> bool {
        self.state
            .checkpoints
            .get(&epoch)
            .map(|c| c.is_justified)
            .unwrap_or(false)
    }

    pub fn is_finalized(&self, epoch: EpochNumber) -> bool {
        self.state
            .checkpoints
            .get(&epoch)
            .map(|c| c.is_finalized)
            .unwrap_or(false)
    }

    pub fn last_justified_epoch(&self) -> EpochNumber {
        self.state.last_justified_epoch
    }

    pub fn last_finalized_epoch(&self) -> EpochNumber {
        self.state.last_finalized_epoch
    }

    /// Source epoch a vote should use to be rewarded
    pub fn recommended_source_epoch(&self) -> EpochNumber {
        self.state.expected_source_epoch
    }

    /// Target hash of the current epoch's checkpoint
    pub fn recommended_target_hash(&self) -> Hash {
        self.checkpoint_hash(self.state.current_epoch)
    }

    pub fn checkpoint_hash(&self, epoch: EpochNumber) -> Hash {
        self.state
            .checkpoints
            .get(&epoch)
            .map(|c| c.hash)
            .unwrap_or(Hash::ZERO)
    }

    /// Tallied (current, previous) dynasty vote weight for a link
    pub fn votes(&self, target_epoch: EpochNumber, source_epoch: EpochNumber) -> (ScaledDeposit, ScaledDeposit) {
        self.state
            .checkpoints
            .get(&target_epoch)
            .map(|c| (c.cur_dyn_votes(source_epoch), c.prev_dyn_votes(source_epoch)))
            .unwrap_or((0, 0))
    }

    /// Epochs since finality
    pub fn esf(&self) -> u64 {
        crate::consensus::economics::esf(self.state.current_epoch, self.state.last_finalized_epoch)
    }

    pub fn slash_records(&self) -> &[SlashRecord] {
        &self.state.slashes
    }

    // ===== INTERNAL =====

    /// Operations that depend on the chain clock require the current epoch to
    /// have been initialized
    fn ensure_epoch_initialized(&self) -> CasperResult<()> {
        let chain = self.host.current_chain_epoch();
        if chain != self.state.current_epoch {
            return Err(CasperError::EpochNotInitialized {
                current: self.state.current_epoch,
                chain,
            });
        }
        Ok(())
    }

    /// Credit a reward (scaled units) to a validator and keep the dynasty
    /// ledger consistent with it
    fn proc_reward(&mut self, index: ValidatorIndex, reward: ScaledDeposit) {
        let dynasty = self.state.dynasties.dynasty();
        let Some(validator) = self.state.validators.get_mut(index) else {
            return;
        };
        validator.deposit += reward;

        let in_current = validator.in_dynasty(dynasty);
        let in_previous = dynasty > 0 && validator.in_dynasty(dynasty - 1);
        let scheduled_exit = validator.has_logged_out() && validator.end_dynasty > dynasty;
        let end_dynasty = validator.end_dynasty;

        self.state.dynasties.credit(reward, in_current, in_previous);
        if in_current {
            self.state.dynasties.schedule(dynasty, reward);
        }
        // The pending exit must remove the reward too. Dynasties already
        // consumed are never rewritten.
        if scheduled_exit {
            self.state.dynasties.schedule(end_dynasty, -reward);
        }
    }
}
