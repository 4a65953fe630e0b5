//! Upgradeable proxy
//!
//! The proxy owns the state space and two pointer slots: the current logic
//! implementation and the admin allowed to repoint it. Ledger calls and reads
//! are forwarded to the logic version with the proxy's storage; admin calls
//! are handled here and never reach the logic.

mod logic;

pub use logic::*;

use tracing::info;

use crate::call::{AdminCall, Call, CallOutput, LedgerCall, Outcome, Query, QueryOutput};
use crate::constants::{PROXY_ADMIN_SLOT, PROXY_IMPLEMENTATION_SLOT};
use crate::crypto::Address;
use crate::ledger::{Env, Event, InitParams, LedgerError, LedgerResult};
use crate::storage::{read_value, write_value, Slot, SlotRead, SlotWrite};

fn implementation_slot() -> Slot {
    Slot::named(PROXY_IMPLEMENTATION_SLOT)
}

fn admin_slot() -> Slot {
    Slot::named(PROXY_ADMIN_SLOT)
}

/// Router over a state space, resolving implementations through a registry
pub struct Proxy<'r> {
    registry: &'r LogicRegistry,
}

impl<'r> Proxy<'r> {
    pub fn new(registry: &'r LogicRegistry) -> Self {
        Self { registry }
    }

    pub fn is_deployed<S: SlotRead>(&self, store: &S) -> bool {
        store.load(&implementation_slot()).is_some()
    }

    pub fn implementation<S: SlotRead>(&self, store: &S) -> LedgerResult<Address> {
        let implementation: Address = read_value(store, &implementation_slot())?;
        if implementation.is_zero() {
            return Err(LedgerError::NotDeployed);
        }
        Ok(implementation)
    }

    pub fn admin<S: SlotRead>(&self, store: &S) -> LedgerResult<Address> {
        if !self.is_deployed(store) {
            return Err(LedgerError::NotDeployed);
        }
        Ok(read_value(store, &admin_slot())?)
    }

    /// Logic version currently behind the proxy
    pub fn logic<S: SlotRead>(&self, store: &S) -> LedgerResult<LogicVersion> {
        let implementation = self.implementation(store)?;
        self.registry.resolve(&implementation)
    }

    /// Point an empty state space at `logic` and initialize the ledger through
    /// it in the same step, so no caller ever sees an uninitialized ledger.
    ///
    /// Either everything lands in `store` or, on error, the caller drops the
    /// overlay and nothing does.
    pub fn deploy<S: SlotWrite>(
        &self,
        store: &mut S,
        env: &Env,
        logic: Address,
        admin: Address,
        init: &InitParams,
    ) -> LedgerResult<Outcome> {
        if self.is_deployed(&*store) {
            return Err(LedgerError::AlreadyDeployed);
        }
        if admin.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }
        let version = self.registry.resolve(&logic)?;

        write_value(store, implementation_slot(), &logic)?;
        write_value(store, admin_slot(), &admin)?;
        info!(%logic, %version, %admin, "Proxy deployed");

        let mut events = vec![
            Event::Upgraded {
                implementation: logic,
            },
            Event::AdminChanged {
                previous: Address::ZERO,
                new: admin,
            },
        ];
        let outcome = version.execute(&mut *store, env, &LedgerCall::Initialize(init.clone()))?;
        events.extend(outcome.events);
        Ok(Outcome {
            output: outcome.output,
            events,
        })
    }

    pub fn dispatch<S: SlotWrite>(&self, store: &mut S, env: &Env, call: &Call) -> LedgerResult<Outcome> {
        match call {
            Call::Admin(admin_call) => self.admin_call(store, env, admin_call),
            Call::Ledger(ledger_call) => {
                let version = self.logic(&*store)?;
                version.execute(&mut *store, env, ledger_call)
            }
        }
    }

    pub fn query<S: SlotRead>(&self, store: &S, query: &Query) -> LedgerResult<QueryOutput> {
        match query {
            Query::Implementation => Ok(QueryOutput::Address(self.implementation(store)?)),
            Query::Admin => Ok(QueryOutput::Address(self.admin(store)?)),
            _ => self.logic(store)?.query(store, query),
        }
    }

    fn admin_call<S: SlotWrite>(&self, store: &mut S, env: &Env, call: &AdminCall) -> LedgerResult<Outcome> {
        let admin = self.admin(&*store)?;
        if env.caller != admin {
            return Err(LedgerError::Unauthorized(format!(
                "{} is not the proxy admin",
                env.caller
            )));
        }

        match call {
            AdminCall::UpgradeTo { implementation } => {
                let event = self.upgrade_to(store, implementation)?;
                Ok(Outcome {
                    output: CallOutput::Unit,
                    events: vec![event],
                })
            }
            AdminCall::UpgradeToAndCall {
                implementation,
                call,
            } => {
                let event = self.upgrade_to(store, implementation)?;
                let version = self.registry.resolve(implementation)?;
                let outcome = version.execute(&mut *store, env, call)?;
                let mut events = vec![event];
                events.extend(outcome.events);
                Ok(Outcome {
                    output: outcome.output,
                    events,
                })
            }
            AdminCall::ChangeAdmin { new_admin } => {
                if new_admin.is_zero() {
                    return Err(LedgerError::ZeroAddress);
                }
                write_value(store, admin_slot(), new_admin)?;
                info!(previous = %admin, new = %new_admin, "Proxy admin changed");
                Ok(Outcome {
                    output: CallOutput::Unit,
                    events: vec![Event::AdminChanged {
                        previous: admin,
                        new: *new_admin,
                    }],
                })
            }
        }
    }

    fn upgrade_to<S: SlotWrite>(&self, store: &mut S, implementation: &Address) -> LedgerResult<Event> {
        let version = self.registry.resolve(implementation)?;
        write_value(store, implementation_slot(), implementation)?;
        info!(implementation = %implementation, %version, "Proxy upgraded");
        Ok(Event::Upgraded {
            implementation: *implementation,
        })
    }
}
