//! JSON-RPC API Module
//!
//! HTTP interface for submitting signed calls and reading ledger state.

mod methods;
mod server;

pub use methods::*;
pub use server::*;
