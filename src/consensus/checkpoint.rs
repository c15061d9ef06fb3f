// Checkpoints - per-epoch vote tallies and justification status
use crate::types::{Balance, EpochNumber, Hash, ScaledDeposit, ValidatorIndex};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Two-thirds supermajority over scaled deposits, compared exactly
pub fn has_supermajority(votes: ScaledDeposit, total: ScaledDeposit) -> bool {
    votes.saturating_mul(3) >= total.saturating_mul(2)
}

/// Checkpoint of one epoch
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Recommended target hash recorded when the epoch was initialized
    pub hash: Hash,

    /// Current-dynasty vote weight per source epoch
    pub cur_dyn_votes: BTreeMap<EpochNumber, ScaledDeposit>,

    /// Previous-dynasty vote weight per source epoch
    pub prev_dyn_votes: BTreeMap<EpochNumber, ScaledDeposit>,

    /// Validators that already voted with this checkpoint as target
    pub voters: BTreeSet<ValidatorIndex>,

    pub is_justified: bool,
    pub is_finalized: bool,

    /// Deposit totals (currency) snapshotted when the epoch was initialized
    pub cur_dyn_deposits: Balance,
    pub prev_dyn_deposits: Balance,
}

impl Checkpoint {
    pub fn new(hash: Hash) -> Self {
        Self {
            hash,
            ..Self::default()
        }
    }

    pub fn has_voted(&self, index: ValidatorIndex) -> bool {
        self.voters.contains(&index)
    }

    pub fn cur_dyn_votes(&self, source_epoch: EpochNumber) -> ScaledDeposit {
        self.cur_dyn_votes.get(&source_epoch).copied().unwrap_or(0)
    }

    pub fn prev_dyn_votes(&self, source_epoch: EpochNumber) -> ScaledDeposit {
        self.prev_dyn_votes.get(&source_epoch).copied().unwrap_or(0)
    }

    /// Tally a vote and return the new (current, previous) dynasty totals
    /// for `source_epoch`
    pub fn record_vote(
        &mut self,
        index: ValidatorIndex,
        source_epoch: EpochNumber,
        deposit: ScaledDeposit,
        in_current: bool,
        in_previous: bool,
    ) -> (ScaledDeposit, ScaledDeposit) {
        self.voters.insert(index);
        if in_current {
            *self.cur_dyn_votes.entry(source_epoch).or_insert(0) += deposit;
        }
        if in_previous {
            *self.prev_dyn_votes.entry(source_epoch).or_insert(0) += deposit;
        }
        (self.cur_dyn_votes(source_epoch), self.prev_dyn_votes(source_epoch))
    }
}
