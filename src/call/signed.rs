//! Signed call envelope
//!
//! The signature covers the call and the sender's nonce under a fixed domain
//! tag. The sender address is derived from the key, never supplied.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::SIGNING_DOMAIN;
use crate::crypto::{hash_bytes, Address, Hash, PrivateKey, PublicKey, SchnorrSignature};
use super::Call;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CallError {
    #[error("Call encoding failed: {0}")]
    Encoding(String),
    #[error("Invalid signature from {0}")]
    BadSignature(Address),
    #[error("Invalid nonce for {sender}: expected {expected}, got {got}")]
    BadNonce { sender: Address, expected: u64, got: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedCall {
    pub call: Call,
    pub nonce: u64,
    pub public_key: PublicKey,
    pub signature: SchnorrSignature,
}

impl SignedCall {
    /// Hash that the caller signs
    pub fn signing_hash(call: &Call, nonce: u64) -> Result<Hash, CallError> {
        let bytes = bincode::serialize(&(SIGNING_DOMAIN, call, nonce))
            .map_err(|e| CallError::Encoding(e.to_string()))?;
        Ok(hash_bytes(&bytes))
    }

    pub fn sign(call: Call, nonce: u64, key: &PrivateKey) -> Result<Self, CallError> {
        let message = Self::signing_hash(&call, nonce)?;
        Ok(Self {
            signature: key.sign(&message),
            public_key: key.public_key(),
            call,
            nonce,
        })
    }

    pub fn sender(&self) -> Address {
        self.public_key.to_address()
    }

    /// Check the signature and return the authenticated sender
    pub fn verify(&self) -> Result<Address, CallError> {
        let sender = self.sender();
        let message = Self::signing_hash(&self.call, self.nonce)?;
        self.public_key
            .verify(&message, &self.signature)
            .map_err(|_| CallError::BadSignature(sender))?;
        Ok(sender)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call::LedgerCall;

    fn transfer_call(amount: u128) -> Call {
        Call::Ledger(LedgerCall::Transfer {
            to: Address::derive(b"to"),
            amount,
        })
    }

    #[test]
    fn test_signed_call_verifies() {
        let key = PrivateKey::generate();
        let signed = SignedCall::sign(transfer_call(10), 0, &key).unwrap();
        assert_eq!(signed.verify().unwrap(), key.public_key().to_address());
    }

    #[test]
    fn test_tampered_amount_rejected() {
        let key = PrivateKey::generate();
        let mut signed = SignedCall::sign(transfer_call(10), 0, &key).unwrap();
        signed.call = transfer_call(10_000);
        assert!(matches!(signed.verify(), Err(CallError::BadSignature(_))));
    }

    #[test]
    fn test_tampered_nonce_rejected() {
        let key = PrivateKey::generate();
        let mut signed = SignedCall::sign(transfer_call(10), 0, &key).unwrap();
        signed.nonce = 1;
        assert!(signed.verify().is_err());
    }

    #[test]
    fn test_swapped_key_rejected() {
        let key = PrivateKey::generate();
        let mut signed = SignedCall::sign(transfer_call(10), 0, &key).unwrap();
        signed.public_key = PrivateKey::generate().public_key();
        assert!(signed.verify().is_err());
    }

    #[test]
    fn test_json_roundtrip_keeps_signature_valid() {
        let key = PrivateKey::generate();
        let signed = SignedCall::sign(transfer_call(10), 3, &key).unwrap();
        let json = serde_json::to_string(&signed).unwrap();
        let back: SignedCall = serde_json::from_str(&json).unwrap();
        assert!(back.verify().is_ok());
    }
}
