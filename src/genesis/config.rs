// Configuration - Casper FFG economic and timing parameters
use crate::error::{CasperError, CasperResult};
use crate::types::{Balance, EpochNumber, ETHER};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Blocks per epoch
pub const EPOCH_LENGTH: u64 = 50;

/// Dynasties between a deposit and the validator joining the active set
pub const DYNASTY_ACTIVATION_DELAY: u64 = 2;

/// Dynasties between a logout request and the validator leaving the active set
pub const DYNASTY_LOGOUT_DELAY: u64 = 2;

/// Epochs (and dynasties) between leaving the active set and withdrawal
pub const WITHDRAWAL_DELAY: u64 = 5;

pub const BASE_INTEREST_FACTOR: f64 = 0.02;
pub const BASE_PENALTY_FACTOR: f64 = 0.002;

/// Minimum deposit accepted by `induct`
pub const MIN_DEPOSIT_SIZE: Balance = ETHER;

/// Slashed withdrawals lose `multiplier * recently_slashed / total_deposits_at_logout`
pub const SLASH_FRACTION_MULTIPLIER: f64 = 3.0;

/// Reporter receives deposit / 25 (4% finder's fee)
pub const SLASHING_BOUNTY_DIVISOR: u128 = 25;

/// How the inactivity loss accrued between exit and withdrawal is charged to
/// slashed validators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InactivityDecay {
    /// Value the deposit at the withdrawal epoch's scale factor, so the
    /// non-voter rescaling applied since the exit epoch is lost
    ScaleFactorDrift,
    /// Value the deposit at the exit epoch's scale factor
    None,
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CasperConfig {
    /// Blocks per epoch (block-height chain clock)
    pub epoch_length: u64,

    /// Activation delay after induction, in dynasties
    pub dynasty_activation_delay: u64,

    /// Exit delay after logout, in dynasties
    pub dynasty_logout_delay: u64,

    /// Delay between exit and withdrawal, in epochs and dynasties
    pub withdrawal_delay: u64,

    pub base_interest_factor: f64,
    pub base_penalty_factor: f64,

    pub min_deposit_size: Balance,

    pub slash_fraction_multiplier: f64,
    pub slashing_bounty_divisor: u128,

    /// Deposit scale factor at genesis
    pub initial_scale_factor: f64,

    /// First epoch of the engine
    pub genesis_epoch: EpochNumber,

    #[serde(default = "default_inactivity_decay")]
    pub inactivity_decay: InactivityDecay,
}

fn default_inactivity_decay() -> InactivityDecay {
    InactivityDecay::ScaleFactorDrift
}

impl CasperConfig {
    /// Reject parameter sets the engine cannot run with
    pub fn validate(&self) -> CasperResult<()> {
        if self.epoch_length == 0 {
            return Err(CasperError::Config("epoch_length must be positive".into()));
        }
        if self.dynasty_activation_delay == 0 || self.dynasty_logout_delay == 0 {
            return Err(CasperError::Config("dynasty delays must be positive".into()));
        }
        if self.withdrawal_delay == 0 {
            return Err(CasperError::Config("withdrawal_delay must be positive".into()));
        }
        if !positive(self.base_interest_factor) || !non_negative(self.base_penalty_factor) {
            return Err(CasperError::Config("invalid reward economics".into()));
        }
        if !non_negative(self.slash_fraction_multiplier) {
            return Err(CasperError::Config(
                "slash_fraction_multiplier must be non-negative".into(),
            ));
        }
        if self.slashing_bounty_divisor == 0 {
            return Err(CasperError::Config("slashing_bounty_divisor must be positive".into()));
        }
        if !positive(self.initial_scale_factor) {
            return Err(CasperError::Config("initial_scale_factor must be positive".into()));
        }
        if self.min_deposit_size == 0 {
            return Err(CasperError::Config("min_deposit_size must be positive".into()));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> CasperResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| CasperError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> CasperResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| CasperError::Config(format!("{}: {}", path.as_ref().display(), e)))?;
        Self::from_json_str(&content)
    }

    /// Save to a JSON file
    pub fn to_file(&self, path: impl AsRef<Path>) -> CasperResult<()> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| CasperError::Config(e.to_string()))?;
        std::fs::write(path.as_ref(), content)
            .map_err(|e| CasperError::Config(format!("{}: {}", path.as_ref().display(), e)))
    }
}

fn positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

impl Default for CasperConfig {
    fn default() -> Self {
        Self {
            epoch_length: EPOCH_LENGTH,
            dynasty_activation_delay: DYNASTY_ACTIVATION_DELAY,
            dynasty_logout_delay: DYNASTY_LOGOUT_DELAY,
            withdrawal_delay: WITHDRAWAL_DELAY,
            base_interest_factor: BASE_INTEREST_FACTOR,
            base_penalty_factor: BASE_PENALTY_FACTOR,
            min_deposit_size: MIN_DEPOSIT_SIZE,
            slash_fraction_multiplier: SLASH_FRACTION_MULTIPLIER,
            slashing_bounty_divisor: SLASHING_BOUNTY_DIVISOR,
            initial_scale_factor: 1.0,
            genesis_epoch: 0,
            inactivity_decay: InactivityDecay::ScaleFactorDrift,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = CasperConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.dynasty_logout_delay, 2);
        assert_eq!(config.withdrawal_delay, 5);
    }

    #[test]
    fn test_invalid_configs_rejected() {
        let mut config = CasperConfig::default();
        config.withdrawal_delay = 0;
        assert!(config.validate().is_err());

        let mut config = CasperConfig::default();
        config.initial_scale_factor = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = CasperConfig::default();
        config.slashing_bounty_divisor = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_json_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("casper.json");

        let mut config = CasperConfig::default();
        config.withdrawal_delay = 7;
        config.inactivity_decay = InactivityDecay::None;
        config.to_file(&path).unwrap();

        let loaded = CasperConfig::from_file(&path).unwrap();
        assert_eq!(loaded.withdrawal_delay, 7);
        assert_eq!(loaded.inactivity_decay, InactivityDecay::None);
    }

    #[test]
    fn test_missing_inactivity_decay_defaults() {
        let mut value = serde_json::to_value(CasperConfig::default()).unwrap();
        value.as_object_mut().unwrap().remove("inactivity_decay");
        let config = CasperConfig::from_json_str(&value.to_string()).unwrap();
        assert_eq!(config.inactivity_decay, InactivityDecay::ScaleFactorDrift);
    }

    #[test]
    fn test_bad_json_is_config_error() {
        assert!(matches!(
            CasperConfig::from_json_str("{not json"),
            Err(CasperError::Config(_))
        ));
    }
}
