//! Ledger errors
//!
//! Every variant aborts the whole operation; the caller's overlay is dropped
//! and nothing it wrote becomes visible.

use thiserror::Error;

use crate::crypto::Address;
use crate::storage::StorageError;
use super::Amount;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Insufficient balance: have {have}, need {need}")]
    InsufficientBalance { have: Amount, need: Amount },

    #[error("Insufficient allowance: have {have}, need {need}")]
    InsufficientAllowance { have: Amount, need: Amount },

    #[error("Decreased allowance below zero: current {current}, decrease {decrease}")]
    AllowanceUnderflow { current: Amount, decrease: Amount },

    #[error("Arithmetic overflow")]
    ArithmeticOverflow,

    #[error("Arithmetic underflow")]
    ArithmeticUnderflow,

    #[error("Zero address")]
    ZeroAddress,

    #[error("Token is not mintable")]
    NotMintable,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Already initialized")]
    AlreadyInitialized,

    #[error("Exceeded max transaction value: {amount} > {max}")]
    ExceededMaxTransactionValue { amount: Amount, max: Amount },

    #[error("Exceeded max transactions per block: {account} already transferred in block {block}")]
    ExceededMaxTransactionsPerBlock { account: Address, block: u64 },

    #[error("Sender is blacklisted: {0}")]
    SenderBlacklisted(Address),

    #[error("Call {call} is not supported by logic {logic}")]
    UnsupportedCall { call: &'static str, logic: &'static str },

    #[error("Unknown logic implementation: {0}")]
    UnknownLogic(Address),

    #[error("Proxy not deployed")]
    NotDeployed,

    #[error("Proxy already deployed")]
    AlreadyDeployed,

    #[error("Storage: {0}")]
    Storage(#[from] StorageError),
}

pub type LedgerResult<T> = Result<T, LedgerError>;
