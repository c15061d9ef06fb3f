// Signatures - Validation keys and domain-separated signing messages
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

// =============================================================================
// Domain separation
// =============================================================================
//
// Each signed message type carries a unique prefix so that a vote signature can
// never be replayed as a logout request (or the other way around).

/// Domain separator for FFG votes
pub const DOMAIN_VOTE: &[u8] = b"CASPER_FFG_VOTE_V1:";

/// Domain separator for logout requests
pub const DOMAIN_LOGOUT: &[u8] = b"CASPER_FFG_LOGOUT_V1:";

/// Create a domain-separated message for signing
#[inline]
pub fn domain_separate(domain: &[u8], message: &[u8]) -> Vec<u8> {
    let mut separated = Vec::with_capacity(domain.len() + message.len());
    separated.extend_from_slice(domain);
    separated.extend_from_slice(message);
    separated
}

/// Ed25519 signature (64 bytes) with byte serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature64(pub [u8; 64]);

impl Signature64 {
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    pub fn zero() -> Self {
        Self([0; 64])
    }
}

impl From<[u8; 64]> for Signature64 {
    fn from(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }
}

impl Serialize for Signature64 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_bytes(&self.0)
    }
}

impl<'de> Deserialize<'de> for Signature64 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bytes = <Vec<u8>>::deserialize(deserializer)?;
        if bytes.len() != 64 {
            return Err(serde::de::Error::custom("Signature must be 64 bytes"));
        }
        let mut arr = [0u8; 64];
        arr.copy_from_slice(&bytes);
        Ok(Signature64(arr))
    }
}

/// Validation key registered at induction (Ed25519 public key)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValidationKey([u8; 32]);

impl ValidationKey {
    pub fn from_public_key(key: &VerifyingKey) -> Self {
        ValidationKey(key.to_bytes())
    }

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        ValidationKey(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Verify an Ed25519 signature over `message`
    pub fn verify(&self, message: &[u8], signature: &Signature64) -> bool {
        let public_key = match VerifyingKey::from_bytes(&self.0) {
            Ok(pk) => pk,
            Err(_) => return false,
        };

        let sig = Signature::from_bytes(signature.as_bytes());

        public_key.verify(message, &sig).is_ok()
    }
}

impl fmt::Display for ValidationKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "0x{}", hex::encode(&self.0[..8]))
    }
}

/// Sign a message with an Ed25519 key (used by validators and tests)
pub fn sign_message(key: &SigningKey, message: &[u8]) -> Signature64 {
    Signature64(key.sign(message).to_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signing_key(seed: u8) -> SigningKey {
        SigningKey::from_bytes(&[seed; 32])
    }

    #[test]
    fn test_domain_separation_prefix() {
        let msg = domain_separate(DOMAIN_VOTE, b"payload");
        assert!(msg.starts_with(DOMAIN_VOTE));
        assert!(msg.ends_with(b"payload"));
    }

    #[test]
    fn test_sign_and_verify() {
        let key = signing_key(7);
        let vk = ValidationKey::from_public_key(&key.verifying_key());
        let sig = sign_message(&key, b"hello");

        assert!(vk.verify(b"hello", &sig));
        assert!(!vk.verify(b"hullo", &sig));
    }

    #[test]
    fn test_wrong_key_rejected() {
        let sig = sign_message(&signing_key(1), b"hello");
        let other = ValidationKey::from_public_key(&signing_key(2).verifying_key());
        assert!(!other.verify(b"hello", &sig));
    }

    #[test]
    fn test_signature_serde_length_check() {
        let sig = Signature64::from_bytes([9; 64]);
        let encoded = bincode::serialize(&sig).unwrap();
        let decoded: Signature64 = bincode::deserialize(&encoded).unwrap();
        assert_eq!(sig, decoded);

        let short = bincode::serialize(&vec![0u8; 10]).unwrap();
        assert!(bincode::deserialize::<Signature64>(&short).is_err());
    }
}
