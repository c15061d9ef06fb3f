// Primitives - Fundamental ledger types
// Principle: Minimal, auditable, flat
use serde::{Deserialize, Serialize};
use std::fmt;

/// Universal hash (Blake3), used for checkpoint hashes and signing digests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Hash([u8; 32]);

impl Hash {
    pub const ZERO: Hash = Hash([0u8; 32]);

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Hash(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hash arbitrary data with Blake3
    pub fn hash(data: &[u8]) -> Self {
        let hash = blake3::hash(data);
        Hash(*hash.as_bytes())
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", hex::encode(&self.0[..8]))
    }
}

impl From<[u8; 32]> for Hash {
    fn from(bytes: [u8; 32]) -> Self {
        Hash(bytes)
    }
}

/// Withdrawal address: where payouts and slashing bounties are sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address([u8; 20]);

impl Address {
    pub const ZERO: Address = Address([0u8; 20]);

    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Address(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Address(bytes)
    }
}

/// Real-currency amount (wei)
pub type Balance = u128;

/// Scaled deposit units. Real amount = scaled * deposit scale factor.
///
/// Integer so that ledger additions are exact: an exit delta cancels
/// everything the validator added, to the unit. Signed for dynasty deltas.
pub type ScaledDeposit = i128;

/// 1 ether = 10^18 wei
pub const ETHER: Balance = 1_000_000_000_000_000_000;

/// Epoch number (block-height derived)
pub type EpochNumber = u64;

/// Dynasty number (generation of the active validator set)
pub type DynastyNumber = u64;

/// Block height
pub type BlockNumber = u64;

/// Stable handle into the validator registry
pub type ValidatorIndex = usize;

/// Sentinel end dynasty for validators that have not logged out
pub const DEFAULT_END_DYNASTY: DynastyNumber = u64::MAX;

/// Convert a non-negative real amount to a Balance, flooring.
///
/// NaN, infinite and negative values map to 0; values above `Balance::MAX`
/// saturate.
pub fn floor_to_balance(amount: f64) -> Balance {
    if amount.is_nan() || amount.is_infinite() || amount <= 0.0 {
        0
    } else if amount >= Balance::MAX as f64 {
        Balance::MAX
    } else {
        amount.floor() as Balance
    }
}

/// Convert a non-negative scaled amount to whole scaled units, flooring.
///
/// NaN, infinite and negative values map to 0; values above
/// `ScaledDeposit::MAX` saturate.
pub fn floor_to_scaled(amount: f64) -> ScaledDeposit {
    if amount.is_nan() || amount.is_infinite() || amount <= 0.0 {
        0
    } else if amount >= ScaledDeposit::MAX as f64 {
        ScaledDeposit::MAX
    } else {
        amount.floor() as ScaledDeposit
    }
}
