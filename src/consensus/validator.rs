// Validator Registry - flat, index-addressed validator records
use crate::types::{
    Address, Balance, DynastyNumber, ScaledDeposit, ValidationKey, ValidatorIndex,
    DEFAULT_END_DYNASTY,
};
use serde::{Deserialize, Serialize};

/// Lifecycle stage of a validator relative to a dynasty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidatorStatus {
    /// Deposited, waiting for start_dynasty
    Pending,
    /// In the active set, no logout requested
    Active,
    /// Logout requested (or forced by slashing), end_dynasty not reached yet
    LoggingOut,
    /// Left the active set, funds still locked
    Exited,
    /// Deposit paid out
    Withdrawn,
}

/// Validator record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Validator {
    /// Key used to verify votes and logout requests
    pub validation_key: ValidationKey,

    /// Payout address
    pub withdrawal_address: Address,

    /// Deposit in scaled units
    pub deposit: ScaledDeposit,

    pub start_dynasty: DynastyNumber,

    /// DEFAULT_END_DYNASTY until logout (or forced logout by slashing)
    pub end_dynasty: DynastyNumber,

    /// One-way flag
    pub is_slashed: bool,

    /// Total current-dynasty deposits (currency) when the validator logged out
    pub total_deposits_at_logout: Balance,

    /// Dynasty in which the logout was requested or forced
    pub logout_dynasty: Option<DynastyNumber>,

    pub withdrawn: bool,
}

impl Validator {
    pub fn new(
        validation_key: ValidationKey,
        withdrawal_address: Address,
        deposit: ScaledDeposit,
        start_dynasty: DynastyNumber,
    ) -> Self {
        Self {
            validation_key,
            withdrawal_address,
            deposit,
            start_dynasty,
            end_dynasty: DEFAULT_END_DYNASTY,
            is_slashed: false,
            total_deposits_at_logout: 0,
            logout_dynasty: None,
            withdrawn: false,
        }
    }

    /// Whether the validator belongs to the validator set of `dynasty`
    pub fn in_dynasty(&self, dynasty: DynastyNumber) -> bool {
        self.start_dynasty <= dynasty && dynasty < self.end_dynasty
    }

    /// Whether an end dynasty has been scheduled
    pub fn has_logged_out(&self) -> bool {
        self.end_dynasty != DEFAULT_END_DYNASTY
    }

    pub fn status(&self, dynasty: DynastyNumber) -> ValidatorStatus {
        if self.withdrawn {
            ValidatorStatus::Withdrawn
        } else if dynasty < self.start_dynasty {
            ValidatorStatus::Pending
        } else if dynasty >= self.end_dynasty {
            ValidatorStatus::Exited
        } else if self.has_logged_out() {
            ValidatorStatus::LoggingOut
        } else {
            ValidatorStatus::Active
        }
    }
}

/// Validator records addressed by their stable index
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidatorRegistry {
    validators: Vec<Validator>,
}

impl ValidatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record and return its index
    pub fn register(&mut self, validator: Validator) -> ValidatorIndex {
        self.validators.push(validator);
        self.validators.len() - 1
    }

    pub fn get(&self, index: ValidatorIndex) -> Option<&Validator> {
        self.validators.get(index)
    }

    pub fn get_mut(&mut self, index: ValidatorIndex) -> Option<&mut Validator> {
        self.validators.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ValidatorIndex, &Validator)> {
        self.validators.iter().enumerate()
    }

    /// Indexes of validators in the set of `dynasty`
    pub fn members_of(&self, dynasty: DynastyNumber) -> Vec<ValidatorIndex> {
        self.iter()
            .filter(|(_, v)| !v.withdrawn && v.in_dynasty(dynasty))
            .map(|(i, _)| i)
            .collect()
    }

    /// Sum of scaled deposits of the set of `dynasty`
    pub fn scaled_deposits_of(&self, dynasty: DynastyNumber) -> ScaledDeposit {
        self.iter()
            .filter(|(_, v)| !v.withdrawn && v.in_dynasty(dynasty))
            .map(|(_, v)| v.deposit)
            .sum()
    }
}
