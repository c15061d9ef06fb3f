// Economics - reward factor and collective reward for epoch transitions
//
// Voters are paid `deposit * reward_factor` in scaled units. Every deposit is
// then rescaled by `(1 + collective_reward) / (1 + reward_factor)`, so a
// validator that voted ends up with `1 + collective_reward` and one that did not
// loses value. The collective reward shrinks when participation drops.

use crate::types::{Balance, EpochNumber, ScaledDeposit, ETHER};

/// Finality is considered live while the last finalized epoch is at most this
/// many epochs behind
pub const LIVENESS_ESF: u64 = 2;

/// Epochs since finality
pub fn esf(current_epoch: EpochNumber, last_finalized_epoch: EpochNumber) -> u64 {
    current_epoch.saturating_sub(last_finalized_epoch)
}

/// Square root of the ether deposited by the larger validator set (plus one)
pub fn sqrt_of_total_deposits(
    total_curdyn: ScaledDeposit,
    total_prevdyn: ScaledDeposit,
    scale_factor: f64,
) -> f64 {
    let deposited = total_curdyn.max(total_prevdyn) as f64 * scale_factor;
    let ether = (deposited / ETHER as f64).max(0.0).floor() + 1.0;
    ether.sqrt()
}

/// Reward factor for the next epoch
pub fn reward_factor(
    base_interest_factor: f64,
    base_penalty_factor: f64,
    sqrt_of_total_deposits: f64,
    esf: u64,
) -> f64 {
    base_interest_factor / sqrt_of_total_deposits + base_penalty_factor * esf as f64
}

/// Fraction of stake (the smaller of both dynasties) that voted for the
/// expected source in the previous epoch
pub fn vote_fraction(
    cur_dyn_votes: ScaledDeposit,
    total_curdyn: ScaledDeposit,
    prev_dyn_votes: ScaledDeposit,
    total_prevdyn: ScaledDeposit,
) -> f64 {
    if total_curdyn <= 0 || total_prevdyn <= 0 {
        return 0.0;
    }
    let cur = cur_dyn_votes as f64 / total_curdyn as f64;
    let prev = prev_dyn_votes as f64 / total_prevdyn as f64;
    cur.min(prev).clamp(0.0, 1.0)
}

/// Reward shared by all voters of the previous epoch
pub fn collective_reward(vote_fraction: f64, reward_factor: f64, esf: u64, deposit_exists: bool) -> f64 {
    if !deposit_exists || esf > LIVENESS_ESF {
        return 0.0;
    }
    vote_fraction * reward_factor / 2.0
}

/// `(voter_rescale, nonvoter_rescale)` for an epoch transition
pub fn rescales(collective_reward: f64, reward_factor: f64) -> (f64, f64) {
    let voter = 1.0 + collective_reward;
    (voter, voter / (1.0 + reward_factor))
}

/// Loss fraction for a slashed validator's withdrawal
pub fn slashed_fraction(recently_slashed: Balance, multiplier: f64, total_deposits_at_logout: Balance) -> f64 {
    if total_deposits_at_logout == 0 {
        return if recently_slashed > 0 { 1.0 } else { 0.0 };
    }
    recently_slashed as f64 * multiplier / total_deposits_at_logout as f64
}
