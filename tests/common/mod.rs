//! Shared fixtures for integration tests

#![allow(dead_code)]

use bep20_core::call::{Call, Outcome, Query, QueryOutput};
use bep20_core::crypto::Address;
use bep20_core::ledger::{Amount, Env, InitParams, LedgerError};
use bep20_core::proxy::{LogicRegistry, LogicVersion, Proxy};
use bep20_core::storage::StateSpace;

pub fn owner() -> Address {
    Address::derive(b"owner")
}

pub fn admin() -> Address {
    Address::derive(b"proxy admin")
}

/// A deployed proxy over an in-memory state space, driven without signatures
pub struct World {
    pub registry: LogicRegistry,
    pub state: StateSpace,
}

impl World {
    pub fn deploy(total_amount: Amount, mintable: bool, start_block: u64) -> Self {
        let registry = LogicRegistry::standard();
        let mut state = StateSpace::new();
        let init = InitParams {
            name: "Tic".into(),
            symbol: "TIC".into(),
            decimals: 8,
            total_amount,
            mintable,
            owner: owner(),
            start_block,
        };
        let mut overlay = state.overlay();
        Proxy::new(&registry)
            .deploy(
                &mut overlay,
                &Env::new(admin(), 0),
                LogicVersion::TokenV1.standard_address(),
                admin(),
                &init,
            )
            .unwrap();
        let changes = overlay.into_changes();
        state.apply(&changes);
        Self { registry, state }
    }

    /// Run `call`, keeping its writes only when it succeeds
    pub fn call(&mut self, caller: Address, block: u64, call: impl Into<Call>) -> Result<Outcome, LedgerError> {
        let call = call.into();
        let mut overlay = self.state.overlay();
        let result = Proxy::new(&self.registry).dispatch(&mut overlay, &Env::new(caller, block), &call);
        if result.is_ok() {
            let changes = overlay.into_changes();
            self.state.apply(&changes);
        }
        result
    }

    pub fn query(&self, query: Query) -> QueryOutput {
        Proxy::new(&self.registry).query(&self.state, &query).unwrap()
    }

    pub fn balance(&self, account: Address) -> Amount {
        match self.query(Query::BalanceOf { account }) {
            QueryOutput::Amount(v) => v,
            other => panic!("unexpected output {:?}", other),
        }
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> Amount {
        match self.query(Query::Allowance { owner, spender }) {
            QueryOutput::Amount(v) => v,
            other => panic!("unexpected output {:?}", other),
        }
    }

    pub fn total_supply(&self) -> Amount {
        match self.query(Query::TotalSupply) {
            QueryOutput::Amount(v) => v,
            other => panic!("unexpected output {:?}", other),
        }
    }

    pub fn is_blacklisted(&self, account: Address) -> bool {
        self.query(Query::IsBlacklisted { account }) == QueryOutput::Bool(true)
    }
}

/// A node driven through signed calls, tracking each key's nonce
pub mod signed {
    use bep20_core::call::{Call, Query, QueryOutput};
    use bep20_core::crypto::Address;
    use bep20_core::ledger::Amount;
    use bep20_core::node::{LedgerNode, NodeError, Receipt};
    use bep20_core::wallet::KeyPair;

    pub struct Actor {
        pub key: KeyPair,
    }

    impl Actor {
        pub fn new() -> Self {
            Self {
                key: KeyPair::generate(),
            }
        }

        pub fn address(&self) -> Address {
            self.key.address
        }

        pub fn send(&self, node: &LedgerNode, call: impl Into<Call>) -> Result<Receipt, NodeError> {
            let nonce = node.nonce(&self.address())?;
            node.submit(&self.key.sign_call(call, nonce).unwrap())
        }
    }

    pub fn balance(node: &LedgerNode, account: Address) -> Amount {
        match node.query(&Query::BalanceOf { account }).unwrap() {
            QueryOutput::Amount(v) => v,
            other => panic!("unexpected output {:?}", other),
        }
    }

    pub fn allowance(node: &LedgerNode, owner: Address, spender: Address) -> Amount {
        match node.query(&Query::Allowance { owner, spender }).unwrap() {
            QueryOutput::Amount(v) => v,
            other => panic!("unexpected output {:?}", other),
        }
    }

    pub fn is_blacklisted(node: &LedgerNode, account: Address) -> bool {
        node.query(&Query::IsBlacklisted { account }).unwrap() == QueryOutput::Bool(true)
    }
}
