// Slash - punish provable equivocation
use super::host::Host;
use super::CasperEngine;
use crate::consensus::slashing::{detect, RemovalSchedule, SlashRecord, SlashingCondition};
use crate::error::{CasperError, CasperResult, SlashRejection};
use crate::types::{Address, Vote};
use tracing::warn;

impl<H: Host> CasperEngine<H> {
    /// Check a vote pair without changing any state
    pub fn slashable(&self, vote_1: &Vote, vote_2: &Vote) -> CasperResult<SlashingCondition> {
        let not_slashable = |reason| Err(CasperError::NotSlashable(reason));

        if vote_1.validator_index != vote_2.validator_index {
            return not_slashable(SlashRejection::ValidatorMismatch);
        }
        let validator = self.validator(vote_1.validator_index)?;

        for vote in [vote_1, vote_2] {
            let verified = vote
                .signing_message()
                .map(|message| self.host.verify(&validator.validation_key, &message, &vote.signature))
                .unwrap_or(false);
            if !verified {
                return not_slashable(SlashRejection::BadSignature);
            }
        }

        if validator.withdrawn {
            return not_slashable(SlashRejection::AlreadyWithdrawn);
        }
        if validator.is_slashed {
            return not_slashable(SlashRejection::AlreadySlashed);
        }

        detect(vote_1, vote_2).map_err(CasperError::NotSlashable)
    }

    /// Slash the validator behind a double or surround vote pair.
    ///
    /// The reporter is paid the finder's fee before any state changes, so a
    /// failed transfer leaves the validator untouched.
    pub fn slash(&mut self, vote_1: &Vote, vote_2: &Vote, reporter: &Address) -> CasperResult<SlashRecord> {
        let condition = self.slashable(vote_1, vote_2)?;
        let index = vote_1.validator_index;

        let epoch = self.state.current_epoch;
        let dynasty = self.dynasty();
        let slashed_deposit = self.deposit_size(index)?;
        let bounty = slashed_deposit / self.config.slashing_bounty_divisor;
        let total_deposits = self.total_curdyn_deposits();

        if bounty > 0 {
            self.host.transfer(reporter, bounty)?;
        }

        let total = self.total_slashed(epoch).saturating_add(slashed_deposit);
        self.state.total_slashed.insert(epoch, total);

        let Some(validator) = self.state.validators.get_mut(index) else {
            return Err(CasperError::ValidatorNotFound(index));
        };
        validator.is_slashed = true;
        let deposit = validator.deposit;

        // A pending validator leaves at its start dynasty and never joins
        let removal_dynasty = (dynasty + 1).max(validator.start_dynasty);
        let removal = if !validator.has_logged_out() {
            validator.end_dynasty = removal_dynasty;
            validator.logout_dynasty = Some(dynasty);
            validator.total_deposits_at_logout = total_deposits;
            RemovalSchedule::ForcedLogout {
                end_dynasty: removal_dynasty,
            }
        } else if validator.end_dynasty > removal_dynasty {
            let from_dynasty = validator.end_dynasty;
            validator.end_dynasty = removal_dynasty;
            RemovalSchedule::Rescheduled {
                from_dynasty,
                to_dynasty: removal_dynasty,
            }
        } else {
            RemovalSchedule::ExitUnchanged {
                end_dynasty: validator.end_dynasty,
            }
        };

        match removal {
            RemovalSchedule::ForcedLogout { end_dynasty } => {
                self.state.dynasties.schedule(end_dynasty, -deposit);
            }
            RemovalSchedule::Rescheduled {
                from_dynasty,
                to_dynasty,
            } => {
                self.state.dynasties.schedule(from_dynasty, deposit);
                self.state.dynasties.schedule(to_dynasty, -deposit);
            }
            RemovalSchedule::ExitUnchanged { .. } => {}
        }

        let record = SlashRecord {
            validator_index: index,
            condition,
            epoch,
            dynasty,
            slashed_deposit,
            bounty,
            removal,
        };
        self.state.slashes.push(record.clone());

        warn!(
            "Validator {} slashed for {:?} at epoch {}: {} wei, bounty {} wei, removal {:?}",
            index, condition, epoch, slashed_deposit, bounty, removal
        );
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use crate::consensus::slashing::{RemovalSchedule, SlashingCondition};
    use crate::error::{CasperError, SlashRejection};
    use crate::tests::harness::{TestChain, DEPOSIT};
    use crate::types::{Address, Hash, Vote};

    fn reporter() -> Address {
        Address::from_bytes([0xAA; 20])
    }

    #[test]
    fn test_double_vote_slash_pays_bounty() {
        let mut chain = TestChain::new();
        let index = chain.induct_validator(1, DEPOSIT);
        let (vote_1, vote_2) = chain.mk_slash_votes(index, 1);

        let record = chain.engine.slash(&vote_1, &vote_2, &reporter()).unwrap();

        assert!(matches!(record.condition, SlashingCondition::DoubleVote { .. }));
        assert_eq!(record.bounty, DEPOSIT / 25);
        assert_eq!(chain.engine.host().balance(&reporter()), DEPOSIT / 25);
        assert_eq!(chain.engine.slash_records().len(), 1);
    }

    #[test]
    fn test_slashable_is_read_only() {
        let mut chain = TestChain::new();
        let index = chain.induct_validator(1, DEPOSIT);
        let (vote_1, vote_2) = chain.mk_slash_votes(index, 1);

        assert!(chain.engine.slashable(&vote_1, &vote_2).is_ok());
        assert!(!chain.engine.is_slashed(index).unwrap());
        assert_eq!(chain.engine.total_slashed(chain.engine.current_epoch()), 0);
    }

    #[test]
    fn test_forged_votes_not_slashable() {
        let mut chain = TestChain::new();
        let index = chain.induct_validator(1, DEPOSIT);
        let epoch = chain.engine.current_epoch();
        let source = chain.engine.recommended_source_epoch();
        let forger = chain.signing_key(7);

        let vote_1 = Vote::signed(index, chain.engine.recommended_target_hash(), epoch, source, &forger);
        let vote_2 = Vote::signed(index, Hash::hash(b"fake"), epoch, source, &forger);

        let err = chain.engine.slash(&vote_1, &vote_2, &reporter()).unwrap_err();
        assert!(matches!(err, CasperError::NotSlashable(SlashRejection::BadSignature)));
        assert!(!chain.engine.is_slashed(index).unwrap());
    }

    #[test]
    fn test_failed_bounty_transfer_leaves_state() {
        let mut chain = TestChain::new();
        let index = chain.induct_validator(1, DEPOSIT);
        let (vote_1, vote_2) = chain.mk_slash_votes(index, 1);
        chain.engine.host_mut().fail_transfers = true;

        let err = chain.engine.slash(&vote_1, &vote_2, &reporter()).unwrap_err();
        assert!(matches!(err, CasperError::TransferFailed(_)));
        assert!(!chain.engine.is_slashed(index).unwrap());
        assert_eq!(chain.engine.dynasty_wei_delta(chain.engine.dynasty() + 1), 0);
    }

    #[test]
    fn test_slash_pending_validator() {
        let mut chain = TestChain::new();
        let index = chain.deposit(1, DEPOSIT);
        let start = chain.engine.start_dynasty(index).unwrap();
        let (vote_1, vote_2) = chain.mk_slash_votes(index, 1);

        let record = chain.engine.slash(&vote_1, &vote_2, &reporter()).unwrap();

        assert_eq!(record.removal, RemovalSchedule::ForcedLogout { end_dynasty: start });
        // Activation and removal cancel out
        assert_eq!(chain.engine.dynasty_wei_delta(start), 0);
        for _ in 0..4 {
            chain.new_epoch();
        }
        assert_eq!(chain.engine.total_curdyn_deposits_scaled(), 0);
    }
}
