// Votes and logout requests - signed validator messages
use super::primitives::{EpochNumber, Hash, ValidatorIndex};
use super::signature::{domain_separate, sign_message, Signature64, DOMAIN_LOGOUT, DOMAIN_VOTE};
use ed25519_dalek::SigningKey;
use serde::{Deserialize, Serialize};

/// A Casper FFG vote: a link from a justified source checkpoint to a target
/// checkpoint, signed with the validator's validation key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub validator_index: ValidatorIndex,
    pub target_hash: Hash,
    pub target_epoch: EpochNumber,
    pub source_epoch: EpochNumber,
    pub signature: Signature64,
}

impl Vote {
    /// Build and sign a vote
    pub fn signed(
        validator_index: ValidatorIndex,
        target_hash: Hash,
        target_epoch: EpochNumber,
        source_epoch: EpochNumber,
        key: &SigningKey,
    ) -> Self {
        let mut vote = Self {
            validator_index,
            target_hash,
            target_epoch,
            source_epoch,
            signature: Signature64::zero(),
        };
        if let Some(message) = vote.signing_message() {
            vote.signature = sign_message(key, &message);
        }
        vote
    }

    /// Message covered by the signature (domain separated, signature excluded)
    pub fn signing_message(&self) -> Option<Vec<u8>> {
        let bytes = bincode::serialize(&(
            self.validator_index as u64,
            self.target_hash,
            self.target_epoch,
            self.source_epoch,
        ))
        .ok()?;
        Some(domain_separate(DOMAIN_VOTE, &bytes))
    }

    /// Digest of the unsigned vote, used to tell two votes apart
    pub fn sighash(&self) -> Hash {
        match self.signing_message() {
            Some(message) => Hash::hash(&message),
            None => Hash::ZERO,
        }
    }
}

/// Signed request to leave the validator set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogoutRequest {
    pub validator_index: ValidatorIndex,
    /// Epoch the request was created in; must not be in the future
    pub epoch: EpochNumber,
    pub signature: Signature64,
}

impl LogoutRequest {
    pub fn signed(validator_index: ValidatorIndex, epoch: EpochNumber, key: &SigningKey) -> Self {
        let mut request = Self {
            validator_index,
            epoch,
            signature: Signature64::zero(),
        };
        if let Some(message) = request.signing_message() {
            request.signature = sign_message(key, &message);
        }
        request
    }

    pub fn signing_message(&self) -> Option<Vec<u8>> {
        let bytes = bincode::serialize(&(self.validator_index as u64, self.epoch)).ok()?;
        Some(domain_separate(DOMAIN_LOGOUT, &bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::signature::ValidationKey;

    fn key() -> SigningKey {
        SigningKey::from_bytes(&[3; 32])
    }

    #[test]
    fn test_vote_signature_roundtrip() {
        let k = key();
        let vote = Vote::signed(0, Hash::hash(b"target"), 5, 4, &k);
        let vk = ValidationKey::from_public_key(&k.verifying_key());

        let message = vote.signing_message().unwrap();
        assert!(message.starts_with(DOMAIN_VOTE));
        assert!(vk.verify(&message, &vote.signature));
    }

    #[test]
    fn test_sighash_ignores_signature() {
        let k = key();
        let vote = Vote::signed(0, Hash::hash(b"target"), 5, 4, &k);
        let mut unsigned = vote.clone();
        unsigned.signature = Signature64::zero();
        assert_eq!(vote.sighash(), unsigned.sighash());

        let other = Vote::signed(0, Hash::hash(b"target"), 5, 3, &k);
        assert_ne!(vote.sighash(), other.sighash());
    }

    #[test]
    fn test_logout_signature_not_valid_as_vote() {
        let k = key();
        let vk = ValidationKey::from_public_key(&k.verifying_key());
        let logout = LogoutRequest::signed(0, 5, &k);

        let logout_msg = logout.signing_message().unwrap();
        assert!(vk.verify(&logout_msg, &logout.signature));
        assert!(logout_msg.starts_with(DOMAIN_LOGOUT));
    }
}
