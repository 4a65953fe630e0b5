//! Ledger module - token bookkeeping, the launch-window anti-bot gate and
//! single-owner authorization, all executed against a slot state space.

mod antibot;
mod errors;
mod events;
pub mod layout;
mod ownership;
mod store;
mod token;

pub use antibot::*;
pub use errors::*;
pub use events::*;
pub use token::InitParams;

use crate::crypto::Address;
use crate::storage::SlotRead;

/// Token amounts in base units
pub type Amount = u128;

/// Who is calling and at which block height
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Env {
    pub caller: Address,
    pub block: u64,
}

impl Env {
    pub fn new(caller: Address, block: u64) -> Self {
        Self { caller, block }
    }
}

/// Behaviour switches that differ between logic versions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogicRules {
    /// Whether `blacklist_enforced` is honoured and the blacklist can be edited
    pub blacklist_admin: bool,
}

/// Typed view of the ledger fields in a state space
pub struct Ledger<S> {
    store: S,
    rules: LogicRules,
    events: Vec<Event>,
}

impl<S: SlotRead> Ledger<S> {
    pub fn new(store: S, rules: LogicRules) -> Self {
        Self {
            store,
            rules,
            events: Vec::new(),
        }
    }

    pub fn rules(&self) -> LogicRules {
        self.rules
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }

    fn emit(&mut self, event: Event) {
        self.events.push(event);
    }
}
