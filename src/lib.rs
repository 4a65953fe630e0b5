//! BEP20 Core Library
//!
//! A single fungible-token ledger with launch-window anti-bot protection,
//! served behind an upgradeable proxy by a single node.
//!
//! Ledger state is a slot-addressed key space; logic versions are code that
//! reads and writes it through the proxy.

pub mod call;
pub mod crypto;
pub mod ledger;
pub mod node;
pub mod proxy;
pub mod rpc;
pub mod storage;
pub mod wallet;

/// Protocol constants
pub mod constants {
    /// Domain tag mixed into every signed call
    pub const SIGNING_DOMAIN: &str = "bep20-core/call/v1";

    /// Label of the slot holding the proxy's logic implementation
    pub const PROXY_IMPLEMENTATION_SLOT: &str = "bep20.proxy.implementation";

    /// Label of the slot holding the proxy admin
    pub const PROXY_ADMIN_SLOT: &str = "bep20.proxy.admin";

    /// Events kept in memory for `getevents`
    pub const MAX_EVENT_LOG: usize = 10_000;

    /// Default JSON-RPC listen port
    pub const DEFAULT_RPC_PORT: u16 = 8545;

    /// Default block interval when interval production is on
    pub const DEFAULT_BLOCK_INTERVAL_MS: u64 = 3_000;
}
