//! Genesis deployment
//!
//! A fresh node deploys the proxy at height zero, points it at the configured
//! logic version and initializes the token from the config in the same step.

use crate::call::Outcome;
use crate::crypto::Address;
use crate::ledger::Env;
use crate::proxy::{LogicRegistry, LogicVersion, Proxy};
use crate::storage::{ChangeSet, StateSpace};
use super::{NodeConfig, NodeError};

/// Height the proxy is deployed at
pub const GENESIS_HEIGHT: u64 = 0;

/// Writes and events of the genesis deployment
#[derive(Debug)]
pub struct Genesis {
    pub logic: LogicVersion,
    pub changes: ChangeSet,
    pub outcome: Outcome,
}

/// Deploy and initialize against `state`, which must be empty.
///
/// Produces the same change set for the same config.
pub fn create_genesis(
    registry: &LogicRegistry,
    state: &StateSpace,
    config: &NodeConfig,
) -> Result<Genesis, NodeError> {
    config.validate()?;
    let logic = config.logic_version()?;

    let mut overlay = state.overlay();
    let outcome = Proxy::new(registry).deploy(
        &mut overlay,
        &Env::new(config.admin, GENESIS_HEIGHT),
        logic.standard_address(),
        config.admin,
        &config.token.init_params(),
    )?;

    Ok(Genesis {
        logic,
        changes: overlay.into_changes(),
        outcome,
    })
}

/// Summary printed at startup
#[derive(Debug)]
pub struct GenesisInfo {
    pub logic: LogicVersion,
    pub implementation: Address,
    pub admin: Address,
    pub owner: Address,
    pub total_supply: u128,
}

impl GenesisInfo {
    pub fn new(config: &NodeConfig) -> Result<Self, NodeError> {
        let logic = config.logic_version()?;
        Ok(Self {
            logic,
            implementation: logic.standard_address(),
            admin: config.admin,
            owner: config.token.owner,
            total_supply: config.token.total_supply,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call::{Query, QueryOutput};
    use crate::ledger::Event;

    fn config() -> NodeConfig {
        let mut config = NodeConfig::new(Address::derive(b"owner"), "Tic", "TIC", 10 * 100_000_000);
        config.token.mintable = true;
        config.token.start_block = 10;
        config
    }

    #[test]
    fn test_genesis_is_deterministic() {
        let registry = LogicRegistry::standard();
        let state = StateSpace::new();
        let first = create_genesis(&registry, &state, &config()).unwrap();
        let second = create_genesis(&registry, &state, &config()).unwrap();
        assert_eq!(first.changes, second.changes);
    }

    #[test]
    fn test_genesis_mints_supply_to_owner() {
        let registry = LogicRegistry::standard();
        let mut state = StateSpace::new();
        let genesis = create_genesis(&registry, &state, &config()).unwrap();
        state.apply(&genesis.changes);

        let proxy = Proxy::new(&registry);
        assert_eq!(
            proxy.query(&state, &Query::TotalSupply),
            Ok(QueryOutput::Amount(10 * 100_000_000))
        );
        assert_eq!(proxy.query(&state, &Query::StartBlock), Ok(QueryOutput::Block(10)));
        assert!(genesis.outcome.events.contains(&Event::Transfer {
            from: Address::ZERO,
            to: Address::derive(b"owner"),
            value: 10 * 100_000_000,
        }));
    }

    #[test]
    fn test_genesis_rejects_invalid_config() {
        let registry = LogicRegistry::standard();
        let mut bad = config();
        bad.token.name.clear();
        assert!(matches!(
            create_genesis(&registry, &StateSpace::new(), &bad),
            Err(NodeError::Config(_))
        ));
    }

    #[test]
    fn test_genesis_info() {
        let info = GenesisInfo::new(&config()).unwrap();
        assert_eq!(info.logic, LogicVersion::TokenV1);
        assert_eq!(info.implementation, LogicVersion::TokenV1.standard_address());
        assert_eq!(info.total_supply, 10 * 100_000_000);
    }
}
