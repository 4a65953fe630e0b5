//! Wallet implementation
//!
//! Holds Schnorr keys and signs call envelopes. The wallet never talks to the
//! node; it only produces `SignedCall`s for submission.

use crate::call::{Call, CallError, SignedCall};
use crate::crypto::{Address, PrivateKey, PublicKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Wallet errors
#[derive(Debug, Error)]
pub enum WalletError {
    #[error("Invalid private key")]
    InvalidKey,
    #[error("No key for address {0}")]
    UnknownAddress(Address),
    #[error("Signing error: {0}")]
    Signing(#[from] CallError),
    #[error("Wallet file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Wallet file format error: {0}")]
    Format(#[from] serde_json::Error),
}

/// A wallet key pair
#[derive(Debug, Clone)]
pub struct KeyPair {
    private_key: PrivateKey,
    pub public_key: PublicKey,
    /// Derived from the public key
    pub address: Address,
}

impl KeyPair {
    /// Generate a new random keypair
    pub fn generate() -> Self {
        Self::from_private_key(PrivateKey::generate())
    }

    fn from_private_key(private_key: PrivateKey) -> Self {
        let public_key = private_key.public_key();
        let address = public_key.to_address();
        Self {
            private_key,
            public_key,
            address,
        }
    }

    pub fn from_private_key_bytes(bytes: &[u8; 32]) -> Result<Self, WalletError> {
        let private_key = PrivateKey::from_bytes(bytes).map_err(|_| WalletError::InvalidKey)?;
        Ok(Self::from_private_key(private_key))
    }

    pub fn from_hex(hex_str: &str) -> Result<Self, WalletError> {
        let private_key = PrivateKey::from_hex(hex_str).map_err(|_| WalletError::InvalidKey)?;
        Ok(Self::from_private_key(private_key))
    }

    pub fn private_key_bytes(&self) -> [u8; 32] {
        self.private_key.to_bytes()
    }

    pub fn private_key_hex(&self) -> String {
        hex::encode(self.private_key_bytes())
    }

    /// Sign `call` with the sender's next nonce
    pub fn sign_call(&self, call: impl Into<Call>, nonce: u64) -> Result<SignedCall, WalletError> {
        Ok(SignedCall::sign(call.into(), nonce, &self.private_key)?)
    }
}

/// On-disk form: hex private keys
#[derive(Serialize, Deserialize)]
struct WalletFile {
    keys: Vec<String>,
}

/// A simple wallet
#[derive(Debug, Default)]
pub struct Wallet {
    keys: BTreeMap<Address, KeyPair>,
}

impl Wallet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a new key and add to wallet
    pub fn generate_key(&mut self) -> &KeyPair {
        self.insert(KeyPair::generate())
    }

    pub fn import_key(&mut self, bytes: &[u8; 32]) -> Result<&KeyPair, WalletError> {
        let keypair = KeyPair::from_private_key_bytes(bytes)?;
        Ok(self.insert(keypair))
    }

    pub fn import_hex(&mut self, hex_str: &str) -> Result<&KeyPair, WalletError> {
        let keypair = KeyPair::from_hex(hex_str)?;
        Ok(self.insert(keypair))
    }

    fn insert(&mut self, keypair: KeyPair) -> &KeyPair {
        self.keys.entry(keypair.address).or_insert(keypair)
    }

    pub fn get_key(&self, address: &Address) -> Option<&KeyPair> {
        self.keys.get(address)
    }

    pub fn addresses(&self) -> Vec<Address> {
        self.keys.keys().copied().collect()
    }

    /// Sign on behalf of one of the wallet's addresses
    pub fn sign_call(
        &self,
        sender: &Address,
        call: impl Into<Call>,
        nonce: u64,
    ) -> Result<SignedCall, WalletError> {
        self.get_key(sender)
            .ok_or(WalletError::UnknownAddress(*sender))?
            .sign_call(call, nonce)
    }

    /// Save wallet to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), WalletError> {
        let file = WalletFile {
            keys: self.keys.values().map(KeyPair::private_key_hex).collect(),
        };
        std::fs::write(path, serde_json::to_vec_pretty(&file)?)?;
        Ok(())
    }

    /// Load wallet from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, WalletError> {
        let bytes = std::fs::read(path)?;
        let file: WalletFile = serde_json::from_slice(&bytes)?;
        let mut wallet = Self::new();
        for key in &file.keys {
            wallet.import_hex(key)?;
        }
        Ok(wallet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call::LedgerCall;

    #[test]
    fn test_keypair_export_import() {
        let kp1 = KeyPair::generate();
        let kp2 = KeyPair::from_private_key_bytes(&kp1.private_key_bytes()).unwrap();

        assert_eq!(kp1.public_key, kp2.public_key);
        assert_eq!(kp1.address, kp2.address);
        assert_eq!(KeyPair::from_hex(&kp1.private_key_hex()).unwrap().address, kp1.address);
    }

    #[test]
    fn test_wallet_generate_key() {
        let mut wallet = Wallet::new();
        let address = wallet.generate_key().address;
        assert_eq!(wallet.addresses(), vec![address]);
    }

    #[test]
    fn test_sign_call_verifies_as_sender() {
        let mut wallet = Wallet::new();
        let address = wallet.generate_key().address;
        let signed = wallet
            .sign_call(&address, LedgerCall::Burn { amount: 1 }, 4)
            .unwrap();
        assert_eq!(signed.nonce, 4);
        assert_eq!(signed.verify().unwrap(), address);
    }

    #[test]
    fn test_unknown_sender() {
        let wallet = Wallet::new();
        let stray = Address::derive(b"stray");
        assert!(matches!(
            wallet.sign_call(&stray, LedgerCall::RenounceOwnership, 0),
            Err(WalletError::UnknownAddress(a)) if a == stray
        ));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallet.json");

        let mut wallet = Wallet::new();
        wallet.generate_key();
        wallet.generate_key();
        wallet.save(&path).unwrap();

        let loaded = Wallet::load(&path).unwrap();
        assert_eq!(loaded.addresses(), wallet.addresses());
    }

    #[test]
    fn test_invalid_key_rejected() {
        assert!(matches!(KeyPair::from_private_key_bytes(&[0u8; 32]), Err(WalletError::InvalidKey)));
    }
}
