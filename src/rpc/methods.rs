//! RPC Method Implementations
//!
//! Each method corresponds to a JSON-RPC call that external apps can make.
//! Params are accepted positionally (`[a, b]`), by name (`{"a": .., "b": ..}`)
//! or, for single-argument methods, as a bare value.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

use crate::call::{Query, SignedCall};
use crate::crypto::Address;
use crate::node::{LedgerNode, NodeError};

pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;
pub const LEDGER_ERROR: i32 = -32000;
pub const AUTH_ERROR: i32 = -32001;

/// Events returned by `getevents` when no limit is given
const DEFAULT_EVENT_LIMIT: usize = 100;

/// JSON-RPC 2.0 Request
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub params: Option<Value>,
    pub id: Value,
}

/// JSON-RPC 2.0 Response
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    pub id: Value,
}

/// JSON-RPC Error
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
}

impl JsonRpcError {
    fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl From<NodeError> for JsonRpcError {
    fn from(err: NodeError) -> Self {
        let code = match &err {
            NodeError::Ledger(_) => LEDGER_ERROR,
            NodeError::Call(_) => AUTH_ERROR,
            NodeError::Storage(_) | NodeError::Config(_) | NodeError::LockPoisoned => INTERNAL_ERROR,
        };
        JsonRpcError::new(code, err.to_string())
    }
}

impl JsonRpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    pub fn error(id: Value, code: i32, message: String) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(JsonRpcError { code, message }),
            id,
        }
    }

    fn from_result(id: Value, result: Result<Value, JsonRpcError>) -> Self {
        match result {
            Ok(value) => Self::success(id, value),
            Err(e) => Self::error(id, e.code, e.message),
        }
    }
}

/// RPC Handler State
pub struct RpcState {
    pub node: Arc<LedgerNode>,
    /// Expose `mineblock`
    pub dev_rpc: bool,
}

type MethodResult = Result<Value, JsonRpcError>;

/// Process a JSON-RPC request and return a response
pub fn handle_request(state: &RpcState, request: JsonRpcRequest) -> JsonRpcResponse {
    let params = request.params.as_ref();
    let result = match request.method.as_str() {
        "sendcall" => send_call(state, params),
        "name" => query(state, Query::Name),
        "symbol" => query(state, Query::Symbol),
        "decimals" => query(state, Query::Decimals),
        "totalsupply" => query(state, Query::TotalSupply),
        "balanceof" => param(params, 0, "account").and_then(|account| query(state, Query::BalanceOf { account })),
        "allowance" => allowance(state, params),
        "getowner" => query(state, Query::GetOwner),
        "mintable" => query(state, Query::Mintable),
        "isblacklisted" => {
            param(params, 0, "account").and_then(|account| query(state, Query::IsBlacklisted { account }))
        }
        "startblock" => query(state, Query::StartBlock),
        "maxtransactionvalue" => query(state, Query::MaxTransactionValue),
        "throttleenabled" => query(state, Query::ThrottleEnabled),
        "blacklistenforced" => query(state, Query::BlacklistEnforced),
        "implementation" => query(state, Query::Implementation),
        "admin" => query(state, Query::Admin),
        "blocknumber" => block_number(state),
        "getnonce" => get_nonce(state, params),
        "getevents" => get_events(state, params),
        "getinfo" => get_info(state),
        "mineblock" if state.dev_rpc => mine_block(state),
        _ => Err(JsonRpcError::new(
            METHOD_NOT_FOUND,
            format!("Method not found: {}", request.method),
        )),
    };
    JsonRpcResponse::from_result(request.id, result)
}

/// Extract one parameter by position or by name
fn param<T: DeserializeOwned>(params: Option<&Value>, index: usize, name: &str) -> Result<T, JsonRpcError> {
    let value = match params {
        Some(Value::Array(items)) => items.get(index),
        Some(Value::Object(fields)) => fields.get(name),
        Some(value) if index == 0 => Some(value),
        _ => None,
    }
    .ok_or_else(|| JsonRpcError::new(INVALID_PARAMS, format!("Invalid params: missing {}", name)))?;

    serde_json::from_value(value.clone())
        .map_err(|e| JsonRpcError::new(INVALID_PARAMS, format!("Invalid params: {}: {}", name, e)))
}

/// Like `param`, but absent (or null) is `None`
fn optional_param<T: DeserializeOwned>(
    params: Option<&Value>,
    index: usize,
    name: &str,
) -> Result<Option<T>, JsonRpcError> {
    let present = match params {
        Some(Value::Array(items)) => items.get(index).is_some_and(|v| !v.is_null()),
        Some(Value::Object(fields)) => fields.get(name).is_some_and(|v| !v.is_null()),
        Some(Value::Null) | None => false,
        Some(_) => index == 0,
    };
    if present {
        param(params, index, name).map(Some)
    } else {
        Ok(None)
    }
}

fn to_json<T: Serialize>(value: &T) -> MethodResult {
    serde_json::to_value(value)
        .map_err(|e| JsonRpcError::new(INTERNAL_ERROR, format!("Failed to encode result: {}", e)))
}

/// Submit a signed call envelope; returns the receipt
fn send_call(state: &RpcState, params: Option<&Value>) -> MethodResult {
    let signed: SignedCall = param(params, 0, "call")?;
    match state.node.submit(&signed) {
        Ok(receipt) => to_json(&receipt),
        Err(e) => {
            warn!(sender = %signed.sender(), error = %e, "sendcall failed");
            Err(e.into())
        }
    }
}

fn query(state: &RpcState, query: Query) -> MethodResult {
    let output = state.node.query(&query)?;
    to_json(&output)
}

/// Params: [owner, spender]
fn allowance(state: &RpcState, params: Option<&Value>) -> MethodResult {
    let owner: Address = param(params, 0, "owner")?;
    let spender: Address = param(params, 1, "spender")?;
    query(state, Query::Allowance { owner, spender })
}

fn block_number(state: &RpcState) -> MethodResult {
    to_json(&state.node.height()?)
}

/// Params: [address]
fn get_nonce(state: &RpcState, params: Option<&Value>) -> MethodResult {
    let account: Address = param(params, 0, "account")?;
    to_json(&state.node.nonce(&account)?)
}

/// Params: [(optional) from_block, (optional) limit]
fn get_events(state: &RpcState, params: Option<&Value>) -> MethodResult {
    let from_block: u64 = optional_param(params, 0, "from_block")?.unwrap_or(0);
    let limit: usize = optional_param(params, 1, "limit")?.unwrap_or(DEFAULT_EVENT_LIMIT);
    to_json(&state.node.events(from_block, limit)?)
}

/// Returns general node information
fn get_info(state: &RpcState) -> MethodResult {
    let node = &state.node;
    Ok(serde_json::json!({
        "name": to_json(&node.query(&Query::Name)?)?,
        "symbol": to_json(&node.query(&Query::Symbol)?)?,
        "logic": node.logic()?.label(),
        "implementation": to_json(&node.query(&Query::Implementation)?)?,
        "blocks": node.height()?,
        "production": to_json(&node.production())?,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

fn mine_block(state: &RpcState) -> MethodResult {
    to_json(&state.node.mine_block()?)
}
