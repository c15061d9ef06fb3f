// Registry operations - induction and logout
use super::host::Host;
use super::CasperEngine;
use crate::consensus::validator::Validator;
use crate::error::{CasperError, CasperResult};
use crate::types::{Address, Balance, LogoutRequest, ValidationKey, ValidatorIndex};
use tracing::info;

impl<H: Host> CasperEngine<H> {
    /// Deposit `amount` and join the validator set after the activation delay
    pub fn induct(
        &mut self,
        validation_key: ValidationKey,
        withdrawal_address: Address,
        amount: Balance,
    ) -> CasperResult<ValidatorIndex> {
        self.ensure_epoch_initialized()?;

        if amount == 0 {
            return Err(CasperError::InvalidDeposit("deposit must be positive".into()));
        }
        if amount < self.config.min_deposit_size {
            return Err(CasperError::InvalidDeposit(format!(
                "deposit {} below minimum {}",
                amount, self.config.min_deposit_size
            )));
        }

        let start_dynasty = self.dynasty() + self.config.dynasty_activation_delay;
        let scaled_deposit = self.state.scale.to_scaled(amount);

        let index = self.state.validators.register(Validator::new(
            validation_key,
            withdrawal_address,
            scaled_deposit,
            start_dynasty,
        ));
        self.state.dynasties.schedule(start_dynasty, scaled_deposit);

        info!(
            "Validator {} inducted: {} wei ({} scaled), active from dynasty {}",
            index, amount, scaled_deposit, start_dynasty
        );
        Ok(index)
    }

    /// Request to leave the validator set after DYNASTY_LOGOUT_DELAY dynasties
    pub fn logout(&mut self, request: &LogoutRequest) -> CasperResult<()> {
        self.ensure_epoch_initialized()?;

        let index = request.validator_index;
        let validator = self.validator(index)?;

        if request.epoch > self.state.current_epoch {
            return Err(CasperError::TooEarly(format!(
                "logout dated epoch {} but current epoch is {}",
                request.epoch, self.state.current_epoch
            )));
        }

        let message = request
            .signing_message()
            .ok_or(CasperError::InvalidSignature)?;
        if !self
            .host
            .verify(&validator.validation_key, &message, &request.signature)
        {
            return Err(CasperError::InvalidSignature);
        }

        if validator.has_logged_out() {
            return Err(CasperError::AlreadyLoggedOut {
                index,
                end_dynasty: validator.end_dynasty,
            });
        }

        let dynasty = self.dynasty();
        if dynasty < validator.start_dynasty {
            return Err(CasperError::NotCurrentlyActive(index));
        }

        let end_dynasty = dynasty + self.config.dynasty_logout_delay;
        let total_deposits = self.total_curdyn_deposits();

        let Some(validator) = self.state.validators.get_mut(index) else {
            return Err(CasperError::ValidatorNotFound(index));
        };
        validator.end_dynasty = end_dynasty;
        validator.logout_dynasty = Some(dynasty);
        validator.total_deposits_at_logout = total_deposits;
        let deposit = validator.deposit;

        self.state.dynasties.schedule(end_dynasty, -deposit);

        info!(
            "Validator {} logged out at dynasty {}, leaves at dynasty {}",
            index, dynasty, end_dynasty
        );
        Ok(())
    }
}
