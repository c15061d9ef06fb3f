// Deposit Scale Ledger - converts scaled deposits to real currency
//
// real_deposit = scaled_deposit * factor(epoch)
//
// One factor is recorded per epoch and never changes once recorded, so any
// amount computed during an epoch is consistent with every other amount
// computed in that epoch. Scaled amounts are whole units; the factor is only
// applied when converting to or from currency.

use crate::types::{floor_to_balance, floor_to_scaled, Balance, EpochNumber, ScaledDeposit};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepositScaleLedger {
    /// Scale factor per epoch
    factors: BTreeMap<EpochNumber, f64>,

    /// Most recently recorded epoch
    latest_epoch: EpochNumber,

    /// Rescale applied to validators who voted last epoch (1 + collective reward)
    last_voter_rescale: f64,

    /// Rescale applied to everyone's deposit for the last epoch
    last_nonvoter_rescale: f64,
}

impl DepositScaleLedger {
    pub fn new(genesis_epoch: EpochNumber, initial_factor: f64) -> Self {
        let mut factors = BTreeMap::new();
        factors.insert(genesis_epoch, initial_factor);
        Self {
            factors,
            latest_epoch: genesis_epoch,
            last_voter_rescale: 1.0,
            last_nonvoter_rescale: 1.0,
        }
    }

    /// Record the factor of `epoch` as the previous factor times
    /// `(1 + rescale)`.
    ///
    /// `rescale` is negative when non-voters are penalized. The new factor is
    /// kept strictly positive.
    pub fn recompute(&mut self, epoch: EpochNumber, rescale: f64) -> f64 {
        let previous = self.current();
        let multiplier = if rescale.is_finite() { (1.0 + rescale).max(f64::MIN_POSITIVE) } else { 1.0 };
        let factor = previous * multiplier;

        self.factors.insert(epoch, factor);
        self.latest_epoch = self.latest_epoch.max(epoch);

        debug!("Deposit scale factor for epoch {}: {} (x{})", epoch, factor, multiplier);
        factor
    }

    /// Record the rescale pair computed for the epoch transition
    pub fn set_rescales(&mut self, voter_rescale: f64, nonvoter_rescale: f64) {
        self.last_voter_rescale = voter_rescale;
        self.last_nonvoter_rescale = nonvoter_rescale;
    }

    /// Factor of the most recent epoch
    pub fn current(&self) -> f64 {
        self.factor_at(self.latest_epoch)
    }

    /// Factor recorded for `epoch`; epochs without a record use the closest
    /// earlier one
    pub fn factor_at(&self, epoch: EpochNumber) -> f64 {
        self.factors
            .range(..=epoch)
            .next_back()
            .map(|(_, f)| *f)
            .or_else(|| self.factors.values().next().copied())
            .unwrap_or(1.0)
    }

    pub fn last_voter_rescale(&self) -> f64 {
        self.last_voter_rescale
    }

    pub fn last_nonvoter_rescale(&self) -> f64 {
        self.last_nonvoter_rescale
    }

    /// Real-currency value of a scaled deposit at `epoch`
    pub fn to_real(&self, scaled: ScaledDeposit, epoch: EpochNumber) -> Balance {
        floor_to_balance(scaled as f64 * self.factor_at(epoch))
    }

    /// Scaled units of a real-currency amount at the current factor
    pub fn to_scaled(&self, amount: Balance) -> ScaledDeposit {
        floor_to_scaled(amount as f64 / self.current())
    }
}
