//! Logic implementations
//!
//! The closed set of ledger versions a proxy can point at. A version is code
//! only: it receives the proxy's state space for every call and keeps nothing
//! of its own.

use std::collections::HashMap;
use std::fmt;

use crate::call::{CallOutput, LedgerCall, Outcome, Query, QueryOutput};
use crate::crypto::Address;
use crate::ledger::layout::{FieldDecl, TOKEN_V1_LAYOUT, TOKEN_V2_LAYOUT};
use crate::ledger::{Env, Ledger, LedgerError, LedgerResult, LogicRules};
use crate::storage::{SlotRead, SlotWrite};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicVersion {
    /// Launch-window ledger; blacklist membership is informational only
    TokenV1,
    /// V1 plus owner-managed blacklist and opt-in enforcement against senders
    TokenV2,
}

impl LogicVersion {
    pub const ALL: [LogicVersion; 2] = [LogicVersion::TokenV1, LogicVersion::TokenV2];

    pub fn label(&self) -> &'static str {
        match self {
            LogicVersion::TokenV1 => "token-v1",
            LogicVersion::TokenV2 => "token-v2",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.label() == label)
    }

    pub fn layout(&self) -> &'static [FieldDecl] {
        match self {
            LogicVersion::TokenV1 => TOKEN_V1_LAYOUT,
            LogicVersion::TokenV2 => TOKEN_V2_LAYOUT,
        }
    }

    pub fn rules(&self) -> LogicRules {
        match self {
            LogicVersion::TokenV1 => LogicRules::default(),
            LogicVersion::TokenV2 => LogicRules {
                blacklist_admin: true,
            },
        }
    }

    /// Address the standard registry deploys this version at
    pub fn standard_address(&self) -> Address {
        Address::derive(format!("bep20/logic/{}", self.label()).as_bytes())
    }

    pub fn execute<S: SlotWrite>(&self, store: S, env: &Env, call: &LedgerCall) -> LedgerResult<Outcome> {
        let rules = self.rules();
        if !rules.blacklist_admin
            && matches!(
                call,
                LedgerCall::SetBlacklistEnforced { .. } | LedgerCall::SetBlacklisted { .. }
            )
        {
            return Err(LedgerError::UnsupportedCall {
                call: call.name(),
                logic: self.label(),
            });
        }

        let mut ledger = Ledger::new(store, rules);
        let output = match call {
            LedgerCall::Initialize(params) => {
                ledger.initialize(params)?;
                CallOutput::Unit
            }
            LedgerCall::Transfer { to, amount } => {
                ledger.transfer(env, to, *amount)?;
                CallOutput::Success(true)
            }
            LedgerCall::TransferFrom { owner, to, amount } => {
                ledger.transfer_from(env, owner, to, *amount)?;
                CallOutput::Success(true)
            }
            LedgerCall::Approve { spender, amount } => {
                ledger.approve(env, spender, *amount)?;
                CallOutput::Success(true)
            }
            LedgerCall::IncreaseAllowance { spender, amount } => {
                CallOutput::Amount(ledger.increase_allowance(env, spender, *amount)?)
            }
            LedgerCall::DecreaseAllowance { spender, amount } => {
                CallOutput::Amount(ledger.decrease_allowance(env, spender, *amount)?)
            }
            LedgerCall::Mint { amount } => {
                ledger.mint(env, *amount)?;
                CallOutput::Success(true)
            }
            LedgerCall::Burn { amount } => {
                ledger.burn(env, *amount)?;
                CallOutput::Success(true)
            }
            LedgerCall::BurnFrom { account, amount } => {
                ledger.burn_from(env, account, *amount)?;
                CallOutput::Success(true)
            }
            LedgerCall::TransferOwnership { new_owner } => {
                ledger.transfer_ownership(env, new_owner)?;
                CallOutput::Unit
            }
            LedgerCall::RenounceOwnership => {
                ledger.renounce_ownership(env)?;
                CallOutput::Unit
            }
            LedgerCall::SetMaxTransactionValue { amount } => {
                ledger.set_max_transaction_value(env, *amount)?;
                CallOutput::Unit
            }
            LedgerCall::SetThrottleEnabled { enabled } => {
                ledger.set_throttle(env, *enabled)?;
                CallOutput::Unit
            }
            LedgerCall::SetBlacklistEnforced { enforced } => {
                ledger.set_blacklist_enforcement(env, *enforced)?;
                CallOutput::Unit
            }
            LedgerCall::SetBlacklisted {
                account,
                blacklisted,
            } => {
                ledger.update_blacklist(env, account, *blacklisted)?;
                CallOutput::Unit
            }
        };

        Ok(Outcome {
            output,
            events: ledger.into_events(),
        })
    }

    pub fn query<S: SlotRead>(&self, store: S, query: &Query) -> LedgerResult<QueryOutput> {
        let ledger = Ledger::new(store, self.rules());
        let output = match query {
            Query::Name => QueryOutput::Text(ledger.name()?),
            Query::Symbol => QueryOutput::Text(ledger.symbol()?),
            Query::Decimals => QueryOutput::Decimals(ledger.decimals()?),
            Query::TotalSupply => QueryOutput::Amount(ledger.total_supply()?),
            Query::BalanceOf { account } => QueryOutput::Amount(ledger.balance_of(account)?),
            Query::Allowance { owner, spender } => {
                QueryOutput::Amount(ledger.allowance(owner, spender)?)
            }
            Query::GetOwner => QueryOutput::Address(ledger.owner()?),
            Query::Mintable => QueryOutput::Bool(ledger.mintable()?),
            Query::IsBlacklisted { account } => QueryOutput::Bool(ledger.is_blacklisted(account)?),
            Query::StartBlock => QueryOutput::Block(ledger.start_block()?),
            Query::MaxTransactionValue => QueryOutput::Amount(ledger.max_transaction_value()?),
            Query::ThrottleEnabled => QueryOutput::Bool(ledger.throttle_enabled()?),
            Query::BlacklistEnforced => QueryOutput::Bool(ledger.blacklist_enforced()?),
            Query::Implementation | Query::Admin => {
                return Err(LedgerError::UnsupportedCall {
                    call: "proxy query",
                    logic: self.label(),
                })
            }
        };
        Ok(output)
    }
}

impl fmt::Display for LogicVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Deployed logic implementations by address
#[derive(Debug, Clone, Default)]
pub struct LogicRegistry {
    implementations: HashMap<Address, LogicVersion>,
}

impl LogicRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every known version at its standard address
    pub fn standard() -> Self {
        let mut registry = Self::new();
        for version in LogicVersion::ALL {
            registry.register(version.standard_address(), version);
        }
        registry
    }

    pub fn register(&mut self, address: Address, version: LogicVersion) {
        self.implementations.insert(address, version);
    }

    pub fn resolve(&self, address: &Address) -> LedgerResult<LogicVersion> {
        self.implementations
            .get(address)
            .copied()
            .ok_or(LedgerError::UnknownLogic(*address))
    }
}
