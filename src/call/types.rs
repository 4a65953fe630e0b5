//! Call and query vocabulary
//!
//! Enums are externally tagged so JSON payloads read as
//! `{"transfer": {"to": "0x..", "amount": 10}}`.

use serde::{Deserialize, Serialize};

use crate::crypto::Address;
use crate::ledger::{Amount, Event, InitParams};

/// State-changing operations forwarded to the logic implementation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LedgerCall {
    Initialize(InitParams),
    Transfer { to: Address, amount: Amount },
    TransferFrom { owner: Address, to: Address, amount: Amount },
    Approve { spender: Address, amount: Amount },
    IncreaseAllowance { spender: Address, amount: Amount },
    DecreaseAllowance { spender: Address, amount: Amount },
    Mint { amount: Amount },
    Burn { amount: Amount },
    BurnFrom { account: Address, amount: Amount },
    TransferOwnership { new_owner: Address },
    RenounceOwnership,
    SetMaxTransactionValue { amount: Amount },
    SetThrottleEnabled { enabled: bool },
    SetBlacklistEnforced { enforced: bool },
    SetBlacklisted { account: Address, blacklisted: bool },
}

impl LedgerCall {
    pub fn name(&self) -> &'static str {
        match self {
            LedgerCall::Initialize(_) => "initialize",
            LedgerCall::Transfer { .. } => "transfer",
            LedgerCall::TransferFrom { .. } => "transferFrom",
            LedgerCall::Approve { .. } => "approve",
            LedgerCall::IncreaseAllowance { .. } => "increaseAllowance",
            LedgerCall::DecreaseAllowance { .. } => "decreaseAllowance",
            LedgerCall::Mint { .. } => "mint",
            LedgerCall::Burn { .. } => "burn",
            LedgerCall::BurnFrom { .. } => "burnFrom",
            LedgerCall::TransferOwnership { .. } => "transferOwnership",
            LedgerCall::RenounceOwnership => "renounceOwnership",
            LedgerCall::SetMaxTransactionValue { .. } => "setMaxTransactionValue",
            LedgerCall::SetThrottleEnabled { .. } => "setThrottleEnabled",
            LedgerCall::SetBlacklistEnforced { .. } => "setBlacklistEnforced",
            LedgerCall::SetBlacklisted { .. } => "setBlacklisted",
        }
    }
}

/// Proxy management operations, handled by the proxy itself
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AdminCall {
    UpgradeTo { implementation: Address },
    UpgradeToAndCall { implementation: Address, call: LedgerCall },
    ChangeAdmin { new_admin: Address },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Call {
    Admin(AdminCall),
    Ledger(LedgerCall),
}

impl From<LedgerCall> for Call {
    fn from(call: LedgerCall) -> Self {
        Call::Ledger(call)
    }
}

impl From<AdminCall> for Call {
    fn from(call: AdminCall) -> Self {
        Call::Admin(call)
    }
}

/// Side-effect-free reads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Query {
    Name,
    Symbol,
    Decimals,
    TotalSupply,
    BalanceOf { account: Address },
    Allowance { owner: Address, spender: Address },
    GetOwner,
    Mintable,
    IsBlacklisted { account: Address },
    StartBlock,
    MaxTransactionValue,
    ThrottleEnabled,
    BlacklistEnforced,
    Implementation,
    Admin,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum QueryOutput {
    Amount(Amount),
    Bool(bool),
    Text(String),
    Decimals(u8),
    Block(u64),
    Address(Address),
}

/// Return value of a state-changing call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CallOutput {
    Unit,
    Success(bool),
    Amount(Amount),
}

/// Result of a call that committed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub output: CallOutput,
    pub events: Vec<Event>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_json_shape() {
        let to = Address::derive(b"to");
        let call = Call::Ledger(LedgerCall::Transfer { to, amount: 10 });
        let json = serde_json::to_value(&call).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"ledger": {"transfer": {"to": to.to_hex(), "amount": 10}}})
        );
        let back: Call = serde_json::from_value(json).unwrap();
        assert_eq!(back, call);
    }

    #[test]
    fn test_unit_variant_json() {
        let call: Call = serde_json::from_str(r#"{"ledger": "renounceOwnership"}"#).unwrap();
        assert_eq!(call, Call::Ledger(LedgerCall::RenounceOwnership));
    }

    #[test]
    fn test_query_output_is_bare_value() {
        assert_eq!(serde_json::to_string(&QueryOutput::Bool(true)).unwrap(), "true");
        assert_eq!(serde_json::to_string(&QueryOutput::Amount(5)).unwrap(), "5");
        assert_eq!(serde_json::to_string(&CallOutput::Unit).unwrap(), "null");
    }
}
