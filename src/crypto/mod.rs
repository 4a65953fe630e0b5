//! Cryptography module - BLAKE3 hashing, Schnorr signatures, account addresses

mod address;
mod hash;
mod schnorr;

pub use address::*;
pub use hash::*;
pub use schnorr::*;
