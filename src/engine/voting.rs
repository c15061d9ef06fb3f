// Voting - vote validation, tallying, rewards and justification
use super::host::Host;
use super::CasperEngine;
use crate::consensus::checkpoint::{has_supermajority, Checkpoint};
use crate::error::{CasperError, CasperResult, VoteRejection};
use crate::types::{floor_to_scaled, EpochNumber, ScaledDeposit, Vote};
use tracing::{debug, info};

/// Effect of an accepted vote
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteOutcome {
    /// Reward credited, in scaled units
    pub reward: ScaledDeposit,
    /// This vote justified the target checkpoint
    pub justified: bool,
    /// Source epoch finalized by this vote
    pub finalized: Option<EpochNumber>,
}

impl<H: Host> CasperEngine<H> {
    /// Validate and tally a vote.
    ///
    /// Rejected votes return `InvalidVote` and leave the tallies untouched.
    pub fn vote(&mut self, vote: &Vote) -> CasperResult<VoteOutcome> {
        let index = vote.validator_index;
        let validator = self.validator(index)?;
        let reject = |reason| Err(CasperError::InvalidVote(reason));

        let message = match vote.signing_message() {
            Some(message) => message,
            None => return reject(VoteRejection::BadSignature),
        };
        if !self.host.verify(&validator.validation_key, &message, &vote.signature) {
            return reject(VoteRejection::BadSignature);
        }

        let current_epoch = self.state.current_epoch;
        if vote.target_epoch != current_epoch {
            return reject(VoteRejection::WrongTargetEpoch {
                expected: current_epoch,
                got: vote.target_epoch,
            });
        }

        let target = self
            .state
            .checkpoints
            .get(&current_epoch)
            .cloned()
            .unwrap_or_else(|| Checkpoint::new(self.host.checkpoint_hash(current_epoch)));
        if target.has_voted(index) {
            return reject(VoteRejection::AlreadyVoted);
        }
        if vote.target_hash != target.hash {
            return reject(VoteRejection::WrongTargetHash);
        }

        let source_hash = match self.state.checkpoints.get(&vote.source_epoch) {
            Some(source) if source.is_justified => source.hash,
            _ => return reject(VoteRejection::SourceNotJustified(vote.source_epoch)),
        };
        if !self.host.descends_from(&vote.target_hash, &source_hash) {
            return reject(VoteRejection::NotDescendant);
        }

        let dynasty = self.dynasty();
        let in_current = validator.in_dynasty(dynasty);
        let in_previous = dynasty > 0 && validator.in_dynasty(dynasty - 1);
        if validator.withdrawn || !(in_current || in_previous) {
            return reject(VoteRejection::NotInActiveDynasty);
        }
        let deposit = validator.deposit;

        // All checks passed
        let (cur_votes, prev_votes) = self
            .state
            .checkpoints
            .entry(current_epoch)
            .or_insert(target)
            .record_vote(index, vote.source_epoch, deposit, in_current, in_previous);

        let reward = if vote.source_epoch == self.state.expected_source_epoch {
            let reward = floor_to_scaled(deposit as f64 * self.state.reward_factor);
            self.proc_reward(index, reward);
            reward
        } else {
            0
        };

        debug!(
            "Vote from validator {}: {} -> {} (cur {}, prev {})",
            index, vote.source_epoch, vote.target_epoch, cur_votes, prev_votes
        );

        let mut outcome = VoteOutcome {
            reward,
            justified: false,
            finalized: None,
        };

        let supermajority = has_supermajority(cur_votes, self.total_curdyn_deposits_scaled())
            && has_supermajority(prev_votes, self.total_prevdyn_deposits_scaled());
        if supermajority && !self.is_justified(vote.target_epoch) {
            self.justify(vote.target_epoch);
            outcome.justified = true;

            if vote.target_epoch == vote.source_epoch + 1 {
                self.finalize(vote.source_epoch);
                outcome.finalized = Some(vote.source_epoch);
            }
        }

        Ok(outcome)
    }

    pub(super) fn justify(&mut self, epoch: EpochNumber) {
        if let Some(checkpoint) = self.state.checkpoints.get_mut(&epoch) {
            checkpoint.is_justified = true;
        }
        self.state.last_justified_epoch = epoch;
        self.state.main_hash_justified = true;
        info!("Epoch {} justified", epoch);
    }

    pub(super) fn finalize(&mut self, epoch: EpochNumber) {
        if let Some(checkpoint) = self.state.checkpoints.get_mut(&epoch) {
            checkpoint.is_finalized = true;
        }
        self.state.last_finalized_epoch = epoch;
        info!("Epoch {} finalized", epoch);
    }
}

#[cfg(test)]
mod tests {
    use crate::error::{CasperError, VoteRejection};
    use crate::tests::harness::{TestChain, DEPOSIT};
    use crate::types::{Hash, Vote};

    fn rejection(result: crate::error::CasperResult<super::VoteOutcome>) -> VoteRejection {
        match result {
            Err(CasperError::InvalidVote(reason)) => reason,
            other => panic!("expected InvalidVote, got {:?}", other),
        }
    }

    #[test]
    fn test_suggested_vote_justifies_and_finalizes() {
        let mut chain = TestChain::new();
        let index = chain.induct_validator(1, DEPOSIT);
        let epoch = chain.engine.current_epoch();
        let source = chain.engine.recommended_source_epoch();
        assert_eq!(source + 1, epoch);

        let outcome = chain.vote(index, 1).unwrap();
        assert!(outcome.justified);
        assert_eq!(outcome.finalized, Some(source));
        assert!(chain.engine.is_justified(epoch));
        assert!(chain.engine.is_finalized(source));
        assert_eq!(chain.engine.votes(epoch, source).0, chain.engine.deposit(index).unwrap());
    }

    #[test]
    fn test_second_vote_same_target_rejected() {
        let mut chain = TestChain::new();
        let index = chain.induct_validator(1, DEPOSIT);
        chain.vote(index, 1).unwrap();
        assert_eq!(rejection(chain.vote(index, 1)), VoteRejection::AlreadyVoted);
    }

    #[test]
    fn test_wrong_target_epoch_rejected() {
        let mut chain = TestChain::new();
        let index = chain.induct_validator(1, DEPOSIT);
        let epoch = chain.engine.current_epoch();
        let vote = Vote::signed(
            index,
            chain.engine.recommended_target_hash(),
            epoch + 1,
            chain.engine.recommended_source_epoch(),
            &chain.signing_key(1),
        );
        assert!(matches!(
            rejection(chain.engine.vote(&vote)),
            VoteRejection::WrongTargetEpoch { .. }
        ));
    }

    #[test]
    fn test_wrong_target_hash_rejected() {
        let mut chain = TestChain::new();
        let index = chain.induct_validator(1, DEPOSIT);
        let vote = Vote::signed(
            index,
            Hash::hash(b"fake"),
            chain.engine.current_epoch(),
            chain.engine.recommended_source_epoch(),
            &chain.signing_key(1),
        );
        assert_eq!(rejection(chain.engine.vote(&vote)), VoteRejection::WrongTargetHash);
    }

    #[test]
    fn test_unjustified_source_rejected() {
        let mut chain = TestChain::new();
        let index = chain.induct_validator(1, DEPOSIT);
        let epoch = chain.engine.current_epoch();
        // the current epoch is not justified yet
        let vote = Vote::signed(
            index,
            chain.engine.recommended_target_hash(),
            epoch,
            epoch,
            &chain.signing_key(1),
        );
        assert_eq!(
            rejection(chain.engine.vote(&vote)),
            VoteRejection::SourceNotJustified(epoch)
        );
    }

    #[test]
    fn test_bad_signature_rejected() {
        let mut chain = TestChain::new();
        let index = chain.induct_validator(1, DEPOSIT);
        let vote = Vote::signed(
            index,
            chain.engine.recommended_target_hash(),
            chain.engine.current_epoch(),
            chain.engine.recommended_source_epoch(),
            &chain.signing_key(2),
        );
        assert_eq!(rejection(chain.engine.vote(&vote)), VoteRejection::BadSignature);
    }

    #[test]
    fn test_orphaned_target_rejected() {
        let mut chain = TestChain::new();
        let index = chain.induct_validator(1, DEPOSIT);
        let target = chain.engine.recommended_target_hash();
        chain.engine.host_mut().orphaned.insert(target);

        assert_eq!(rejection(chain.vote(index, 1)), VoteRejection::NotDescendant);
    }

    #[test]
    fn test_pending_validator_cannot_vote() {
        let mut chain = TestChain::new();
        let index = chain.deposit(1, DEPOSIT);
        assert_eq!(rejection(chain.vote(index, 1)), VoteRejection::NotInActiveDynasty);
    }

    #[test]
    fn test_voting_rewards_grow_scaled_deposit() {
        let mut chain = TestChain::new();
        let index = chain.induct_validator(1, DEPOSIT);
        let before = chain.engine.deposit(index).unwrap();

        for _ in 0..3 {
            chain.vote(index, 1).unwrap();
            chain.new_epoch();
        }

        assert!(chain.engine.reward_factor() > 0.0);
        assert!(chain.engine.deposit(index).unwrap() > before);
    }
}
