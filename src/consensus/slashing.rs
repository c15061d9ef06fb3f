// Slashing - detection of contradictory vote pairs
// Principle: Only provable equivocation is punished
use crate::error::SlashRejection;
use crate::types::{Balance, DynastyNumber, EpochNumber, ValidatorIndex, Vote};
use serde::{Deserialize, Serialize};

/// Slashable vote pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlashingCondition {
    /// Same target epoch, different target hashes
    DoubleVote { target_epoch: EpochNumber },
    /// One [source, target] span strictly contains the other
    SurroundVote {
        outer_source: EpochNumber,
        outer_target: EpochNumber,
        inner_source: EpochNumber,
        inner_target: EpochNumber,
    },
}

/// Classify a vote pair. Validator identity and signatures are checked by the
/// caller.
pub fn detect(vote_1: &Vote, vote_2: &Vote) -> Result<SlashingCondition, SlashRejection> {
    if vote_1.validator_index != vote_2.validator_index {
        return Err(SlashRejection::ValidatorMismatch);
    }
    if vote_1.sighash() == vote_2.sighash() {
        return Err(SlashRejection::IdenticalVotes);
    }

    if vote_1.target_epoch == vote_2.target_epoch {
        if vote_1.target_hash != vote_2.target_hash {
            return Ok(SlashingCondition::DoubleVote {
                target_epoch: vote_1.target_epoch,
            });
        }
        return Err(SlashRejection::NoConditionMet);
    }

    if surrounds(vote_1, vote_2) {
        return Ok(surround(vote_1, vote_2));
    }
    if surrounds(vote_2, vote_1) {
        return Ok(surround(vote_2, vote_1));
    }

    Err(SlashRejection::NoConditionMet)
}

/// Whether `outer`'s span strictly contains `inner`'s
fn surrounds(outer: &Vote, inner: &Vote) -> bool {
    outer.source_epoch < inner.source_epoch && inner.target_epoch < outer.target_epoch
}

fn surround(outer: &Vote, inner: &Vote) -> SlashingCondition {
    SlashingCondition::SurroundVote {
        outer_source: outer.source_epoch,
        outer_target: outer.target_epoch,
        inner_source: inner.source_epoch,
        inner_target: inner.target_epoch,
    }
}

/// How the removal of a slashed validator's stake was scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemovalSchedule {
    /// Not logged out: forced logout at the next dynasty
    ForcedLogout { end_dynasty: DynastyNumber },
    /// Logged out but still active: removal moved from the old end dynasty
    Rescheduled {
        from_dynasty: DynastyNumber,
        to_dynasty: DynastyNumber,
    },
    /// Exit already at or before the next dynasty: deltas left alone
    ExitUnchanged { end_dynasty: DynastyNumber },
}

/// Result of a successful slash
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlashRecord {
    pub validator_index: ValidatorIndex,
    pub condition: SlashingCondition,
    pub epoch: EpochNumber,
    pub dynasty: DynastyNumber,
    /// Deposit in currency at the slashing epoch
    pub slashed_deposit: Balance,
    /// Finder's fee paid to the reporter
    pub bounty: Balance,
    pub removal: RemovalSchedule,
}
