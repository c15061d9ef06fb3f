// Casper FFG - Validator stake accounting and slashing engine
// Principle: Stake is conserved, equivocation is provable

pub mod consensus;
pub mod engine;
pub mod error;
pub mod genesis;
pub mod types;

#[cfg(test)]
mod tests;

pub use consensus::epoch::BlockClock;
pub use consensus::slashing::{RemovalSchedule, SlashRecord, SlashingCondition};
pub use consensus::validator::{Validator, ValidatorStatus};
pub use engine::host::{
    BalanceTransfer, ChainClock, CheckpointOracle, Ed25519Verifier, Host, SignatureVerifier,
};
pub use engine::{CasperEngine, CasperState, EpochTransition, VoteOutcome};
pub use error::{CasperError, CasperResult, SlashRejection, TransferError, VoteRejection};
pub use genesis::{CasperConfig, InactivityDecay};
pub use types::{
    Address, Balance, EpochNumber, Hash, LogoutRequest, ScaledDeposit, ValidationKey,
    ValidatorIndex, Vote, ETHER,
};
