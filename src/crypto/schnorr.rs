//! Schnorr signatures over secp256k1
//!
//! Every state-changing call is signed by its caller; the ledger never trusts
//! an address it did not derive from a verified key.

use k256::schnorr::signature::{Signer, Verifier};
use k256::schnorr::{Signature, SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Address, Hash};

/// Signature errors
#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("Invalid signature")]
    InvalidSignature,
    #[error("Invalid public key")]
    InvalidPublicKey,
    #[error("Invalid private key")]
    InvalidPrivateKey,
}

/// 32-byte private key
#[derive(Clone)]
pub struct PrivateKey(SigningKey);

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PrivateKey([REDACTED])")
    }
}

/// 32-byte public key (x-only for Schnorr)
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKey(#[serde(with = "hex_array")] pub [u8; 32]);

/// 64-byte Schnorr signature
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchnorrSignature(#[serde(with = "hex_array")] pub [u8; 64]);

/// Fixed-size byte arrays travel as hex strings so RPC payloads stay readable.
mod hex_array {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S, const N: usize>(bytes: &[u8; N], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D, const N: usize>(deserializer: D) -> Result<[u8; N], D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(s.strip_prefix("0x").unwrap_or(&s))
            .map_err(serde::de::Error::custom)?;
        if bytes.len() != N {
            return Err(serde::de::Error::custom(format!(
                "expected {} bytes, got {}",
                N,
                bytes.len()
            )));
        }
        let mut arr = [0u8; N];
        arr.copy_from_slice(&bytes);
        Ok(arr)
    }
}

impl PrivateKey {
    pub fn generate() -> Self {
        PrivateKey(SigningKey::random(&mut OsRng))
    }

    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, SignatureError> {
        SigningKey::from_bytes(bytes)
            .map(PrivateKey)
            .map_err(|_| SignatureError::InvalidPrivateKey)
    }

    pub fn from_hex(hex_str: &str) -> Result<Self, SignatureError> {
        let bytes = hex::decode(hex_str.strip_prefix("0x").unwrap_or(hex_str))
            .map_err(|_| SignatureError::InvalidPrivateKey)?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| SignatureError::InvalidPrivateKey)?;
        Self::from_bytes(&arr)
    }

    pub fn public_key(&self) -> PublicKey {
        let bytes = self.0.verifying_key().to_bytes();
        PublicKey(bytes.into())
    }

    /// Sign a message hash
    pub fn sign(&self, message: &Hash) -> SchnorrSignature {
        let signature: Signature = self.0.sign(&message.0);
        SchnorrSignature(signature.to_bytes())
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_bytes().into()
    }
}

impl PublicKey {
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, SignatureError> {
        VerifyingKey::from_bytes(bytes).map_err(|_| SignatureError::InvalidPublicKey)?;
        Ok(PublicKey(*bytes))
    }

    /// Verify a signature over a message hash
    pub fn verify(&self, message: &Hash, signature: &SchnorrSignature) -> Result<(), SignatureError> {
        let verifying_key =
            VerifyingKey::from_bytes(&self.0).map_err(|_| SignatureError::InvalidPublicKey)?;
        let sig = Signature::try_from(signature.0.as_slice())
            .map_err(|_| SignatureError::InvalidSignature)?;
        verifying_key
            .verify(&message.0, &sig)
            .map_err(|_| SignatureError::InvalidSignature)
    }

    pub fn to_address(&self) -> Address {
        Address::from_public_key(self)
    }
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PublicKey({})", hex::encode(self.0))
    }
}

impl std::fmt::Debug for SchnorrSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Signature({})", hex::encode(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::hash_bytes;

    #[test]
    fn test_sign_verify() {
        let private = PrivateKey::generate();
        let public = private.public_key();

        let message = hash_bytes(b"transfer 100");
        let signature = private.sign(&message);

        assert!(public.verify(&message, &signature).is_ok());
    }

    #[test]
    fn test_wrong_key_fails() {
        let signer = PrivateKey::generate();
        let other = PrivateKey::generate().public_key();

        let message = hash_bytes(b"transfer 100");
        let signature = signer.sign(&message);

        assert!(other.verify(&message, &signature).is_err());
    }

    #[test]
    fn test_wrong_message_fails() {
        let private = PrivateKey::generate();
        let public = private.public_key();

        let signature = private.sign(&hash_bytes(b"message 1"));
        assert!(public.verify(&hash_bytes(b"message 2"), &signature).is_err());
    }

    #[test]
    fn test_hex_import() {
        let private = PrivateKey::generate();
        let recovered = PrivateKey::from_hex(&hex::encode(private.to_bytes())).unwrap();
        assert_eq!(private.public_key(), recovered.public_key());
    }

    #[test]
    fn test_public_key_json_is_hex() {
        let public = PrivateKey::generate().public_key();
        let json = serde_json::to_string(&public).unwrap();
        assert_eq!(json, format!("\"{}\"", hex::encode(public.0)));
        let back: PublicKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, public);
    }
}
