//! Storage module - slot-addressed ledger state and its on-disk persistence

pub mod db;
mod slots;

pub use slots::*;

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("Slot value codec error: {0}")]
    Codec(String),
    #[error("Database error: {0}")]
    Database(String),
    #[error("Corrupt record in {tree}: {reason}")]
    Corrupt { tree: &'static str, reason: String },
}

impl From<sled::Error> for StorageError {
    fn from(err: sled::Error) -> Self {
        StorageError::Database(err.to_string())
    }
}
