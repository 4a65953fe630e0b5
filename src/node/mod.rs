//! Node module - configuration, genesis deployment and the ledger service

mod config;
mod genesis;
mod service;

pub use config::*;
pub use genesis::*;
pub use service::*;
