//! Wallet module - key management and call signing

mod wallet;

pub use wallet::*;
