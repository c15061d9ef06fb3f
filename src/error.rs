// Errors - Every rejection is a rejection of the whole call
use crate::types::{DynastyNumber, EpochNumber, ValidatorIndex};

/// Why a vote was not tallied
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum VoteRejection {
    #[error("signature does not verify")]
    BadSignature,

    #[error("validator already voted for this target epoch")]
    AlreadyVoted,

    #[error("target hash is not the recommended checkpoint hash")]
    WrongTargetHash,

    #[error("target epoch {got} is not the current epoch {expected}")]
    WrongTargetEpoch { expected: EpochNumber, got: EpochNumber },

    #[error("source epoch {0} is not justified")]
    SourceNotJustified(EpochNumber),

    #[error("target does not descend from the source checkpoint")]
    NotDescendant,

    #[error("validator is not in the current or previous dynasty")]
    NotInActiveDynasty,
}

/// Why a pair of votes cannot be slashed
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SlashRejection {
    #[error("signature does not verify")]
    BadSignature,

    #[error("votes are signed by different validators")]
    ValidatorMismatch,

    #[error("votes are identical")]
    IdenticalVotes,

    #[error("validator is already slashed")]
    AlreadySlashed,

    #[error("validator already withdrew")]
    AlreadyWithdrawn,

    #[error("votes are neither a double vote nor a surround vote")]
    NoConditionMet,
}

/// Engine errors
#[derive(Debug, thiserror::Error)]
pub enum CasperError {
    #[error("Invalid deposit: {0}")]
    InvalidDeposit(String),

    #[error("Invalid vote: {0}")]
    InvalidVote(VoteRejection),

    #[error("Validator {0} is not currently active")]
    NotCurrentlyActive(ValidatorIndex),

    #[error("Validator {index} already logged out (end dynasty {end_dynasty})")]
    AlreadyLoggedOut {
        index: ValidatorIndex,
        end_dynasty: DynastyNumber,
    },

    #[error("Not slashable: {0}")]
    NotSlashable(SlashRejection),

    #[error("Too early: {0}")]
    TooEarly(String),

    #[error("Validator {0} already withdrew")]
    AlreadyWithdrawn(ValidatorIndex),

    #[error("Validator {0} not found")]
    ValidatorNotFound(ValidatorIndex),

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Invalid epoch: expected {expected}, got {got}")]
    InvalidEpoch { expected: EpochNumber, got: EpochNumber },

    #[error("Epoch {chain} not initialized (engine at {current})")]
    EpochNotInitialized { current: EpochNumber, chain: EpochNumber },

    #[error("Balance transfer failed: {0}")]
    TransferFailed(#[from] TransferError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Failure reported by the host balance-transfer capability
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct TransferError(pub String);

pub type CasperResult<T> = Result<T, CasperError>;
