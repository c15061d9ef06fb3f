// Host capabilities - everything the engine consumes but does not own
//
// Signature checking, fork choice, balance transfers and the chain clock are
// provided by the surrounding runtime. The engine only calls them.

use crate::error::TransferError;
use crate::types::{Address, Balance, EpochNumber, Hash, Signature64, ValidationKey};

/// Signature verification primitive
pub trait SignatureVerifier {
    fn verify(&self, key: &ValidationKey, message: &[u8], signature: &Signature64) -> bool;
}

/// Fork-choice view of checkpoints
pub trait CheckpointOracle {
    /// Recommended target hash for `epoch` (hash of the epoch's checkpoint block)
    fn checkpoint_hash(&self, epoch: EpochNumber) -> Hash;

    /// Whether `target` descends from the `source` checkpoint
    fn descends_from(&self, target: &Hash, source: &Hash) -> bool;
}

/// Real-currency payouts
pub trait BalanceTransfer {
    fn transfer(&mut self, to: &Address, amount: Balance) -> Result<(), TransferError>;
}

/// Block-height derived epoch
pub trait ChainClock {
    fn current_chain_epoch(&self) -> EpochNumber;
}

/// Everything the engine needs from its host
pub trait Host: SignatureVerifier + CheckpointOracle + BalanceTransfer + ChainClock {}

impl<T> Host for T where T: SignatureVerifier + CheckpointOracle + BalanceTransfer + ChainClock {}

/// Ed25519 verification over validation keys
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Verifier;

impl SignatureVerifier for Ed25519Verifier {
    fn verify(&self, key: &ValidationKey, message: &[u8], signature: &Signature64) -> bool {
        key.verify(message, signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::sign_message;
    use ed25519_dalek::SigningKey;

    #[test]
    fn test_ed25519_verifier() {
        let key = SigningKey::from_bytes(&[5; 32]);
        let vk = ValidationKey::from_public_key(&key.verifying_key());
        let sig = sign_message(&key, b"msg");

        assert!(Ed25519Verifier.verify(&vk, b"msg", &sig));
        assert!(!Ed25519Verifier.verify(&vk, b"other", &sig));
    }
}
