//! Token behaviour end to end: metadata, transfers, allowances, supply and
//! ownership, submitted as signed calls

mod common;

use bep20_core::call::{CallOutput, LedgerCall, Query, QueryOutput};
use bep20_core::crypto::Address;
use bep20_core::ledger::LedgerError;
use bep20_core::node::{LedgerNode, NodeConfig, NodeError};
use common::signed::{balance, Actor};

const AMOUNT: u128 = 1_000_000_000;

fn deploy(mintable: bool) -> (LedgerNode, Actor) {
    let owner = Actor::new();
    let mut config = NodeConfig::new(owner.address(), "TIC", "TIC", AMOUNT);
    config.token.decimals = 8;
    config.token.mintable = mintable;
    (LedgerNode::open(&config).unwrap(), owner)
}

fn allowance(node: &LedgerNode, owner: Address, spender: Address) -> u128 {
    match node.query(&Query::Allowance { owner, spender }).unwrap() {
        QueryOutput::Amount(v) => v,
        other => panic!("unexpected output {:?}", other),
    }
}

#[test]
fn test_initialized_metadata() {
    let (node, owner) = deploy(false);
    assert_eq!(node.query(&Query::Name).unwrap(), QueryOutput::Text("TIC".into()));
    assert_eq!(node.query(&Query::Decimals).unwrap(), QueryOutput::Decimals(8));
    assert_eq!(node.query(&Query::TotalSupply).unwrap(), QueryOutput::Amount(AMOUNT));
    assert_eq!(node.query(&Query::Mintable).unwrap(), QueryOutput::Bool(false));
    assert_eq!(node.query(&Query::GetOwner).unwrap(), QueryOutput::Address(owner.address()));
    assert_eq!(
        node.query(&Query::MaxTransactionValue).unwrap(),
        QueryOutput::Amount(AMOUNT)
    );
    assert_eq!(balance(&node, owner.address()), AMOUNT);
}

#[test]
fn test_transfer_between_accounts() {
    let (node, owner) = deploy(false);
    let (user1, user2) = (Actor::new(), Actor::new());

    owner.send(&node, LedgerCall::Transfer { to: user1.address(), amount: 50 }).unwrap();
    user1.send(&node, LedgerCall::Transfer { to: user2.address(), amount: 25 }).unwrap();

    assert_eq!(balance(&node, owner.address()), AMOUNT - 50);
    assert_eq!(balance(&node, user1.address()), 25);
    assert_eq!(balance(&node, user2.address()), 25);
}

#[test]
fn test_allowance_flow() {
    let (node, owner) = deploy(false);
    let (user1, user2) = (Actor::new(), Actor::new());

    let receipt = owner
        .send(&node, LedgerCall::IncreaseAllowance { spender: user1.address(), amount: 100 })
        .unwrap();
    assert_eq!(receipt.output, CallOutput::Amount(100));
    owner
        .send(&node, LedgerCall::DecreaseAllowance { spender: user1.address(), amount: 50 })
        .unwrap();
    assert_eq!(allowance(&node, owner.address(), user1.address()), 50);

    let over = user1.send(
        &node,
        LedgerCall::TransferFrom {
            owner: owner.address(),
            to: user2.address(),
            amount: 51,
        },
    );
    assert!(matches!(
        over,
        Err(NodeError::Ledger(LedgerError::InsufficientAllowance { have: 50, need: 51 }))
    ));

    user1
        .send(
            &node,
            LedgerCall::TransferFrom {
                owner: owner.address(),
                to: user2.address(),
                amount: 50,
            },
        )
        .unwrap();
    assert_eq!(allowance(&node, owner.address(), user1.address()), 0);
    assert_eq!(balance(&node, user2.address()), 50);

    let under = owner.send(&node, LedgerCall::DecreaseAllowance { spender: user1.address(), amount: 1 });
    assert!(matches!(
        under,
        Err(NodeError::Ledger(LedgerError::AllowanceUnderflow { .. }))
    ));
}

#[test]
fn test_mint_and_burn() {
    let (node, owner) = deploy(true);
    let spender = Actor::new();

    owner.send(&node, LedgerCall::Mint { amount: 1_000 }).unwrap();
    assert_eq!(node.query(&Query::TotalSupply).unwrap(), QueryOutput::Amount(AMOUNT + 1_000));

    owner.send(&node, LedgerCall::Burn { amount: 400 }).unwrap();
    owner.send(&node, LedgerCall::Approve { spender: spender.address(), amount: 100 }).unwrap();
    spender
        .send(&node, LedgerCall::BurnFrom { account: owner.address(), amount: 100 })
        .unwrap();
    assert_eq!(node.query(&Query::TotalSupply).unwrap(), QueryOutput::Amount(AMOUNT + 500));
    assert_eq!(balance(&node, owner.address()), AMOUNT + 500);

    let stranger = Actor::new();
    assert!(matches!(
        stranger.send(&node, LedgerCall::Mint { amount: 1 }),
        Err(NodeError::Ledger(LedgerError::Unauthorized(_)))
    ));
    assert!(matches!(
        stranger.send(&node, LedgerCall::Burn { amount: 1 }),
        Err(NodeError::Ledger(LedgerError::InsufficientBalance { .. }))
    ));
}

#[test]
fn test_ownership_transfer_and_renounce() {
    let (node, owner) = deploy(true);
    let user1 = Actor::new();

    owner
        .send(&node, LedgerCall::TransferOwnership { new_owner: user1.address() })
        .unwrap();
    assert_eq!(node.query(&Query::GetOwner).unwrap(), QueryOutput::Address(user1.address()));
    assert!(matches!(
        owner.send(&node, LedgerCall::TransferOwnership { new_owner: owner.address() }),
        Err(NodeError::Ledger(LedgerError::Unauthorized(_)))
    ));

    user1.send(&node, LedgerCall::RenounceOwnership).unwrap();
    assert_eq!(node.query(&Query::GetOwner).unwrap(), QueryOutput::Address(Address::ZERO));
    assert!(matches!(
        user1.send(&node, LedgerCall::Mint { amount: 1 }),
        Err(NodeError::Ledger(LedgerError::Unauthorized(_)))
    ));
}
