//! Storage layout declarations
//!
//! Each logic version declares its fields in order; field `n` lives at
//! `Slot::field(n)`. A version may only append to its predecessor's list.
//! Nothing checks this while the node runs: `check_upgrade` is the migration
//! tool run before a new version is registered.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Value,
    Mapping,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDecl {
    pub name: &'static str,
    pub kind: FieldKind,
}

const fn value(name: &'static str) -> FieldDecl {
    FieldDecl {
        name,
        kind: FieldKind::Value,
    }
}

const fn mapping(name: &'static str) -> FieldDecl {
    FieldDecl {
        name,
        kind: FieldKind::Mapping,
    }
}

/// Field indices; must match the position in the layouts below.
pub mod field {
    pub const INITIALIZED: u64 = 0;
    pub const BALANCES: u64 = 1;
    pub const ALLOWANCES: u64 = 2;
    pub const TOTAL_SUPPLY: u64 = 3;
    pub const NAME: u64 = 4;
    pub const SYMBOL: u64 = 5;
    pub const DECIMALS: u64 = 6;
    pub const MINTABLE: u64 = 7;
    pub const OWNER: u64 = 8;
    pub const START_BLOCK: u64 = 9;
    pub const BLACKLIST: u64 = 10;
    pub const MAX_TRANSACTION_VALUE: u64 = 11;
    pub const THROTTLE_ENABLED: u64 = 12;
    pub const LAST_TX_BLOCK: u64 = 13;
    pub const BLACKLIST_ENFORCED: u64 = 14;
}

pub const TOKEN_V1_LAYOUT: &[FieldDecl] = &[
    value("initialized"),
    mapping("balances"),
    mapping("allowances"),
    value("total_supply"),
    value("name"),
    value("symbol"),
    value("decimals"),
    value("mintable"),
    value("owner"),
    value("start_block"),
    mapping("blacklist"),
    value("max_transaction_value"),
    value("throttle_enabled"),
    mapping("last_tx_block"),
];

pub const TOKEN_V2_LAYOUT: &[FieldDecl] = &[
    value("initialized"),
    mapping("balances"),
    mapping("allowances"),
    value("total_supply"),
    value("name"),
    value("symbol"),
    value("decimals"),
    value("mintable"),
    value("owner"),
    value("start_block"),
    mapping("blacklist"),
    value("max_transaction_value"),
    value("throttle_enabled"),
    mapping("last_tx_block"),
    value("blacklist_enforced"),
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("next layout drops fields: {current} declared, {next} kept")]
    Truncated { current: usize, next: usize },
    #[error("field {index} changed from {was:?} to {now:?}")]
    Mismatch {
        index: usize,
        was: FieldDecl,
        now: FieldDecl,
    },
}

/// Verify that `next` keeps every field of `current` at the same index.
pub fn check_upgrade(current: &[FieldDecl], next: &[FieldDecl]) -> Result<(), LayoutError> {
    if next.len() < current.len() {
        return Err(LayoutError::Truncated {
            current: current.len(),
            next: next.len(),
        });
    }
    for (index, (was, now)) in current.iter().zip(next.iter()).enumerate() {
        if was != now {
            return Err(LayoutError::Mismatch {
                index,
                was: *was,
                now: *now,
            });
        }
    }
    Ok(())
}

pub fn index_of(layout: &[FieldDecl], name: &str) -> Option<u64> {
    layout.iter().position(|f| f.name == name).map(|i| i as u64)
}
