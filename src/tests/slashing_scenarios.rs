// Slashing Scenarios
//
// Slashing at every point of a validator's lifecycle:
// 1. Active, never logged out (forced logout at the next dynasty)
// 2. Logged out, exit still ahead (exit moved to the next dynasty)
// 3. Logged out, exit already passed (deltas untouched)

use super::harness::{TestChain, DEPOSIT};
use crate::consensus::slashing::{RemovalSchedule, SlashingCondition};
use crate::error::{CasperError, SlashRejection};
use crate::genesis::CasperConfig;
use crate::types::{Address, Hash, ScaledDeposit, Vote};

fn reporter() -> Address {
    Address::from_bytes([0xEE; 20])
}

// =============================================================================
// Active validators
// =============================================================================

#[cfg(test)]
mod active_validator {
    use super::*;

    #[test]
    fn test_slash_double_vote() {
        let mut chain = TestChain::new();
        let index = chain.induct_validator(1, DEPOSIT);
        assert_eq!(chain.engine.total_curdyn_deposits_scaled(), DEPOSIT as ScaledDeposit);

        let (vote_1, vote_2) = chain.mk_slash_votes(index, 1);
        let next_dynasty = chain.engine.dynasty() + 1;
        assert_eq!(chain.engine.dynasty_wei_delta(next_dynasty), 0);

        chain.engine.slash(&vote_1, &vote_2, &reporter()).unwrap();

        assert_eq!(chain.engine.total_slashed(chain.engine.current_epoch()), DEPOSIT);
        assert_eq!(
            chain.engine.dynasty_wei_delta(next_dynasty),
            -chain.engine.deposit(index).unwrap()
        );
        assert!(chain.engine.is_slashed(index).unwrap());
        assert_eq!(chain.engine.end_dynasty(index).unwrap(), next_dynasty);
        assert_eq!(chain.engine.total_deposits_at_logout(index).unwrap(), DEPOSIT);
    }

    #[test]
    fn test_slash_surround_vote() {
        let mut chain = TestChain::new();
        let index = chain.induct_validator(1, DEPOSIT);
        let key = chain.signing_key(1);
        let epoch = chain.engine.current_epoch();
        let source = chain.engine.recommended_source_epoch();

        let vote_1 = Vote::signed(index, chain.engine.recommended_target_hash(), epoch, source - 1, &key);
        let vote_2 = Vote::signed(index, Hash::hash(b"fake"), epoch - 1, source, &key);

        let next_dynasty = chain.engine.dynasty() + 1;
        let record = chain.engine.slash(&vote_1, &vote_2, &reporter()).unwrap();

        assert!(matches!(record.condition, SlashingCondition::SurroundVote { .. }));
        assert_eq!(chain.engine.total_slashed(chain.engine.current_epoch()), DEPOSIT);
        assert_eq!(
            chain.engine.dynasty_wei_delta(next_dynasty),
            -chain.engine.deposit(index).unwrap()
        );
        assert!(chain.engine.is_slashed(index).unwrap());
        assert_eq!(chain.engine.end_dynasty(index).unwrap(), next_dynasty);
        assert_eq!(chain.engine.total_deposits_at_logout(index).unwrap(), DEPOSIT);
    }

    #[test]
    fn test_consecutive_votes_not_slashable() {
        let mut chain = TestChain::new();
        let index = chain.induct_validator(1, DEPOSIT);
        let key = chain.signing_key(1);
        let epoch = chain.engine.current_epoch();

        let vote_1 = Vote::signed(index, Hash::hash(b"a"), epoch, epoch - 1, &key);
        let vote_2 = Vote::signed(index, Hash::hash(b"b"), epoch + 1, epoch, &key);

        let before = serde_json::to_string(chain.engine.state()).unwrap();
        let err = chain.engine.slash(&vote_1, &vote_2, &reporter()).unwrap_err();
        assert!(matches!(err, CasperError::NotSlashable(SlashRejection::NoConditionMet)));
        assert_eq!(serde_json::to_string(chain.engine.state()).unwrap(), before);
    }

    #[test]
    fn test_double_slash_fails() {
        let mut chain = TestChain::new();
        let index = chain.induct_validator(1, DEPOSIT);

        let (vote_1, vote_2) = chain.mk_slash_votes(index, 1);
        chain.engine.slash(&vote_1, &vote_2, &reporter()).unwrap();

        let err = chain.engine.slash(&vote_1, &vote_2, &reporter()).unwrap_err();
        assert!(matches!(err, CasperError::NotSlashable(SlashRejection::AlreadySlashed)));
        assert_eq!(chain.engine.total_slashed(chain.engine.current_epoch()), DEPOSIT);
    }

    #[test]
    fn test_total_slashed_is_cumulative() {
        let mut chain = TestChain::new();
        let index = chain.induct_validator(1, DEPOSIT);

        let (vote_1, vote_2) = chain.mk_slash_votes(index, 1);
        chain.engine.slash(&vote_1, &vote_2, &reporter()).unwrap();

        let epoch = chain.engine.current_epoch();
        assert_eq!(chain.engine.total_slashed(epoch), DEPOSIT);
        assert_eq!(chain.engine.total_slashed(epoch + 1), 0);

        chain.vote(index, 1).unwrap();
        chain.new_epoch();

        let epoch = chain.engine.current_epoch();
        assert_eq!(chain.engine.total_slashed(epoch - 1), DEPOSIT);
        assert_eq!(chain.engine.total_slashed(epoch), DEPOSIT);
    }
}

// =============================================================================
// Logged-out validators
// =============================================================================

#[cfg(test)]
mod logged_out_validator {
    use super::*;

    #[test]
    fn test_slash_after_exit_leaves_deltas() {
        let mut chain = TestChain::new();
        let index = chain.induct_validator(1, DEPOSIT);
        let scaled_deposit = chain.engine.deposit(index).unwrap();

        chain.logout(index, 1).unwrap();
        let end_dynasty = chain.engine.end_dynasty(index).unwrap();
        assert_eq!(chain.engine.total_deposits_at_logout(index).unwrap(), DEPOSIT);
        assert_eq!(chain.engine.dynasty_wei_delta(end_dynasty), -scaled_deposit);

        // Step past the end dynasty
        for _ in 0..chain.engine.dynasty_logout_delay() + 1 {
            chain.vote(index, 1).unwrap();
            chain.new_epoch();
        }

        let new_deposit_size = chain.engine.deposit_size(index).unwrap();
        let new_scaled_deposit = chain.engine.deposit(index).unwrap();
        assert!(new_scaled_deposit > scaled_deposit);
        assert_eq!(chain.engine.dynasty(), end_dynasty + 1);
        assert_eq!(chain.engine.dynasty_wei_delta(chain.engine.dynasty() + 1), 0);
        let end_delta = chain.engine.dynasty_wei_delta(end_dynasty);

        let (vote_1, vote_2) = chain.mk_slash_votes(index, 1);
        let record = chain.engine.slash(&vote_1, &vote_2, &reporter()).unwrap();

        assert_eq!(record.removal, RemovalSchedule::ExitUnchanged { end_dynasty });
        assert_eq!(chain.engine.total_slashed(chain.engine.current_epoch()), new_deposit_size);
        assert!(chain.engine.is_slashed(index).unwrap());
        assert_eq!(chain.engine.end_dynasty(index).unwrap(), end_dynasty);
        assert_eq!(chain.engine.total_deposits_at_logout(index).unwrap(), DEPOSIT);

        // Already out of the current deposits: no second removal
        assert_eq!(chain.engine.dynasty_wei_delta(end_dynasty), end_delta);
        assert_eq!(chain.engine.dynasty_wei_delta(chain.engine.dynasty() + 1), 0);
    }

    #[test]
    fn test_slash_before_exit_moves_removal() {
        let mut chain = TestChain::with_config(CasperConfig {
            dynasty_logout_delay: 5,
            ..CasperConfig::default()
        });
        let index = chain.induct_validator(1, DEPOSIT);
        let scaled_deposit = chain.engine.deposit(index).unwrap();

        chain.logout(index, 1).unwrap();
        let end_dynasty = chain.engine.end_dynasty(index).unwrap();
        assert_eq!(chain.engine.dynasty_wei_delta(end_dynasty), -scaled_deposit);

        // Step forward but not up to the end dynasty
        chain.vote(index, 1).unwrap();
        chain.new_epoch();

        let new_deposit_size = chain.engine.deposit_size(index).unwrap();
        let new_scaled_deposit = chain.engine.deposit(index).unwrap();
        assert!(chain.engine.dynasty() < end_dynasty - 1);
        assert_eq!(chain.engine.dynasty_wei_delta(chain.engine.dynasty() + 1), 0);
        assert_eq!(chain.engine.dynasty_wei_delta(end_dynasty), -new_scaled_deposit);

        let (vote_1, vote_2) = chain.mk_slash_votes(index, 1);
        let record = chain.engine.slash(&vote_1, &vote_2, &reporter()).unwrap();

        let next_dynasty = chain.engine.dynasty() + 1;
        assert_eq!(
            record.removal,
            RemovalSchedule::Rescheduled {
                from_dynasty: end_dynasty,
                to_dynasty: next_dynasty,
            }
        );
        assert_eq!(chain.engine.total_slashed(chain.engine.current_epoch()), new_deposit_size);
        assert!(chain.engine.is_slashed(index).unwrap());
        assert_eq!(chain.engine.end_dynasty(index).unwrap(), next_dynasty);

        // Removed from the next dynasty instead of the old end dynasty
        assert_eq!(chain.engine.dynasty_wei_delta(end_dynasty), 0);
        assert_eq!(chain.engine.dynasty_wei_delta(next_dynasty), -new_scaled_deposit);
        assert_eq!(chain.engine.total_deposits_at_logout(index).unwrap(), DEPOSIT);
    }

    #[test]
    fn test_slashed_validator_leaves_next_dynasty() {
        let mut chain = TestChain::new();
        let indexes = chain.induct_validators(&[1, 2, 3], DEPOSIT);

        let (vote_1, vote_2) = chain.mk_slash_votes(indexes[0], 1);
        chain.engine.slash(&vote_1, &vote_2, &reporter()).unwrap();

        for (index, seed) in indexes.iter().zip([1u8, 2, 3]).skip(1) {
            chain.vote(*index, seed).unwrap();
        }
        chain.new_epoch();

        let members = chain.engine.state().validators.members_of(chain.engine.dynasty());
        assert_eq!(members, vec![indexes[1], indexes[2]]);
    }
}
