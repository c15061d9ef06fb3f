// Withdraw - pay out an exited validator's deposit
use super::host::Host;
use super::CasperEngine;
use crate::consensus::economics::slashed_fraction;
use crate::error::{CasperError, CasperResult};
use crate::genesis::InactivityDecay;
use crate::types::{floor_to_balance, Balance, EpochNumber, ValidatorIndex};
use tracing::info;

/// Withdrawal schedule of an exited validator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct WithdrawalWindow {
    /// First epoch of the first dynasty without the validator
    end_epoch: EpochNumber,
    withdrawal_epoch: EpochNumber,
}

impl<H: Host> CasperEngine<H> {
    /// Pay out the deposit once the withdrawal delay has passed.
    ///
    /// Slashed validators lose `slash_fraction_multiplier` times the share of
    /// stake slashed around their withdrawal epoch.
    pub fn withdraw(&mut self, index: ValidatorIndex) -> CasperResult<Balance> {
        let window = self.withdrawal_window(index)?;
        let validator = self.validator(index)?;

        let payout = if !validator.is_slashed {
            self.state.scale.to_real(validator.deposit, window.end_epoch)
        } else {
            let base_epoch = window
                .withdrawal_epoch
                .saturating_sub(2 * self.config.withdrawal_delay)
                .max(self.config.genesis_epoch);
            let recently_slashed = self
                .total_slashed(window.withdrawal_epoch)
                .saturating_sub(self.total_slashed(base_epoch));
            let fraction = slashed_fraction(
                recently_slashed,
                self.config.slash_fraction_multiplier,
                validator.total_deposits_at_logout,
            );

            let valued_at = match self.config.inactivity_decay {
                InactivityDecay::ScaleFactorDrift => window.withdrawal_epoch,
                InactivityDecay::None => window.end_epoch,
            };
            let deposit_size = self.state.scale.to_real(validator.deposit, valued_at);
            floor_to_balance(deposit_size as f64 * (1.0 - fraction).max(0.0))
        };
        let address = validator.withdrawal_address;

        self.host.transfer(&address, payout)?;

        if let Some(validator) = self.state.validators.get_mut(index) {
            validator.deposit = 0;
            validator.withdrawn = true;
        }

        info!("Validator {} withdrew {} wei to {}", index, payout, address);
        Ok(payout)
    }

    /// Whether `withdraw` would currently be accepted (transfer aside)
    pub fn withdrawable(&self, index: ValidatorIndex) -> CasperResult<()> {
        self.withdrawal_window(index).map(|_| ())
    }

    fn withdrawal_window(&self, index: ValidatorIndex) -> CasperResult<WithdrawalWindow> {
        let validator = self.validator(index)?;
        if validator.withdrawn {
            return Err(CasperError::AlreadyWithdrawn(index));
        }
        if !validator.has_logged_out() {
            return Err(CasperError::TooEarly(format!(
                "validator {} has not logged out",
                index
            )));
        }

        let dynasty = self.dynasty();
        let end_dynasty = validator.end_dynasty;
        let delay = self.config.withdrawal_delay;
        if dynasty <= end_dynasty || dynasty < end_dynasty.saturating_add(delay) {
            return Err(CasperError::TooEarly(format!(
                "dynasty {} but validator {} ends at dynasty {} with delay {}",
                dynasty, index, end_dynasty, delay
            )));
        }

        let end_epoch = self
            .dynasty_start_epoch(end_dynasty + 1)
            .ok_or_else(|| CasperError::TooEarly(format!("dynasty {} not started", end_dynasty + 1)))?;
        let withdrawal_epoch = end_epoch + delay;
        if self.state.current_epoch < withdrawal_epoch {
            return Err(CasperError::TooEarly(format!(
                "withdrawal opens at epoch {}, current epoch {}",
                withdrawal_epoch, self.state.current_epoch
            )));
        }

        Ok(WithdrawalWindow {
            end_epoch,
            withdrawal_epoch,
        })
    }
}
