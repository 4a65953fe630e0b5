//! Ledger node
//!
//! Owns the proxy's state space, the block height and every sender's next
//! nonce. Submissions run verify, execute and commit under one write lock, so
//! calls are applied strictly one at a time. Reads share a consistent
//! snapshot through the read lock.

use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::call::{Call, CallError, CallOutput, Query, QueryOutput, SignedCall};
use crate::constants::MAX_EVENT_LOG;
use crate::crypto::Address;
use crate::ledger::{Env, Event, LedgerError};
use crate::proxy::{LogicRegistry, LogicVersion, Proxy};
use crate::storage::db::LedgerDB;
use crate::storage::{ChangeSet, StateSpace, StorageError};
use super::{create_genesis, BlockProduction, ConfigError, NodeConfig, GENESIS_HEIGHT};

#[derive(Debug, Error)]
pub enum NodeError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Call(#[from] CallError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Node state lock poisoned")]
    LockPoisoned,
}

/// Result of an accepted call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Receipt {
    pub sender: Address,
    pub nonce: u64,
    /// Height the call executed at
    pub block: u64,
    pub call: &'static str,
    pub output: CallOutput,
    pub events: Vec<Event>,
}

/// An event with the block it was emitted in
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoggedEvent {
    pub block: u64,
    pub event: Event,
}

#[derive(Debug)]
struct NodeState {
    state: StateSpace,
    height: u64,
    nonces: HashMap<Address, u64>,
    events: VecDeque<LoggedEvent>,
}

impl NodeState {
    fn log_events(&mut self, block: u64, events: &[Event]) {
        for event in events {
            if self.events.len() == MAX_EVENT_LOG {
                self.events.pop_front();
            }
            self.events.push_back(LoggedEvent {
                block,
                event: event.clone(),
            });
        }
    }
}

pub struct LedgerNode {
    registry: LogicRegistry,
    production: BlockProduction,
    db: Option<LedgerDB>,
    inner: RwLock<NodeState>,
}

impl LedgerNode {
    /// Open the node described by `config`.
    ///
    /// With a data directory, existing state is reloaded; a fresh directory
    /// (or no directory) gets the genesis deployment.
    pub fn open(config: &NodeConfig) -> Result<Self, NodeError> {
        config.validate()?;
        let registry = LogicRegistry::standard();

        let db = match &config.data_dir {
            Some(dir) => Some(LedgerDB::open(dir)?),
            None => None,
        };

        let restored = match &db {
            Some(db) if !db.is_fresh() => Some(NodeState {
                state: db.load_state()?,
                height: db.load_height()?.unwrap_or(GENESIS_HEIGHT),
                nonces: db.load_nonces()?,
                events: VecDeque::new(),
            }),
            _ => None,
        };

        let inner = match restored {
            Some(inner) => {
                info!(height = inner.height, slots = inner.state.len(), "Ledger state restored");
                inner
            }
            None => {
                let mut state = StateSpace::new();
                let genesis = create_genesis(&registry, &state, config)?;
                if let Some(db) = &db {
                    db.commit(&genesis.changes, None, GENESIS_HEIGHT)?;
                }
                state.apply(&genesis.changes);
                info!(
                    logic = %genesis.logic,
                    owner = %config.token.owner,
                    supply = %config.token.total_supply,
                    "Token deployed"
                );
                let mut inner = NodeState {
                    state,
                    height: GENESIS_HEIGHT,
                    nonces: HashMap::new(),
                    events: VecDeque::new(),
                };
                inner.log_events(GENESIS_HEIGHT, &genesis.outcome.events);
                inner
            }
        };

        Ok(Self {
            registry,
            production: config.block_production,
            db,
            inner: RwLock::new(inner),
        })
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, NodeState>, NodeError> {
        self.inner.read().map_err(|_| NodeError::LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, NodeState>, NodeError> {
        self.inner.write().map_err(|_| NodeError::LockPoisoned)
    }

    pub fn production(&self) -> BlockProduction {
        self.production
    }

    /// Verify, execute and commit a signed call.
    ///
    /// A rejected call leaves state, nonces and height untouched.
    pub fn submit(&self, signed: &SignedCall) -> Result<Receipt, NodeError> {
        let sender = signed.verify()?;
        let mut guard = self.write()?;
        let inner = &mut *guard;

        let expected = inner.nonces.get(&sender).copied().unwrap_or(0);
        if signed.nonce != expected {
            warn!(%sender, expected, got = signed.nonce, "Call rejected: bad nonce");
            return Err(CallError::BadNonce {
                sender,
                expected,
                got: signed.nonce,
            }
            .into());
        }

        let block = inner.height;
        let env = Env::new(sender, block);
        let mut overlay = inner.state.overlay();
        let outcome = match Proxy::new(&self.registry).dispatch(&mut overlay, &env, &signed.call) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(%sender, block, error = %e, "Call rejected");
                return Err(e.into());
            }
        };
        let changes = overlay.into_changes();

        let next_height = match self.production {
            BlockProduction::Automine => block + 1,
            _ => block,
        };
        self.persist(&changes, Some((sender, expected + 1)), next_height)?;

        inner.state.apply(&changes);
        inner.nonces.insert(sender, expected + 1);
        inner.height = next_height;
        inner.log_events(block, &outcome.events);

        let call = match &signed.call {
            Call::Ledger(call) => call.name(),
            Call::Admin(_) => "admin",
        };
        debug!(%sender, block, call, events = outcome.events.len(), "Call committed");

        Ok(Receipt {
            sender,
            nonce: signed.nonce,
            block,
            call,
            output: outcome.output,
            events: outcome.events,
        })
    }

    fn persist(
        &self,
        changes: &ChangeSet,
        nonce: Option<(Address, u64)>,
        height: u64,
    ) -> Result<(), NodeError> {
        if let Some(db) = &self.db {
            db.commit(changes, nonce, height)?;
        }
        Ok(())
    }

    pub fn query(&self, query: &Query) -> Result<QueryOutput, NodeError> {
        let inner = self.read()?;
        Ok(Proxy::new(&self.registry).query(&inner.state, query)?)
    }

    pub fn logic(&self) -> Result<LogicVersion, NodeError> {
        let inner = self.read()?;
        Ok(Proxy::new(&self.registry).logic(&inner.state)?)
    }

    pub fn height(&self) -> Result<u64, NodeError> {
        Ok(self.read()?.height)
    }

    /// Next nonce `account` must sign with
    pub fn nonce(&self, account: &Address) -> Result<u64, NodeError> {
        Ok(self.read()?.nonces.get(account).copied().unwrap_or(0))
    }

    /// Logged events from `from_block` on, oldest first
    pub fn events(&self, from_block: u64, limit: usize) -> Result<Vec<LoggedEvent>, NodeError> {
        let inner = self.read()?;
        Ok(inner
            .events
            .iter()
            .filter(|logged| logged.block >= from_block)
            .take(limit)
            .cloned()
            .collect())
    }

    /// Seal the current block and return the new height
    pub fn mine_block(&self) -> Result<u64, NodeError> {
        let mut inner = self.write()?;
        let next = inner.height + 1;
        if let Some(db) = &self.db {
            db.save_height(next)?;
        }
        inner.height = next;
        debug!(height = next, "Block sealed");
        Ok(next)
    }
}
