//! Field accessors
//!
//! The only place that knows which slot a ledger field lives in.

use crate::crypto::Address;
use crate::storage::{read_value, write_value, Slot, SlotRead, SlotWrite};
use super::layout::field;
use super::{Amount, Ledger, LedgerResult};

fn balance_slot(account: &Address) -> Slot {
    Slot::mapping(Slot::field(field::BALANCES), account.as_bytes())
}

fn allowance_slot(owner: &Address, spender: &Address) -> Slot {
    let mut key = [0u8; 40];
    key[..20].copy_from_slice(owner.as_bytes());
    key[20..].copy_from_slice(spender.as_bytes());
    Slot::mapping(Slot::field(field::ALLOWANCES), &key)
}

fn blacklist_slot(account: &Address) -> Slot {
    Slot::mapping(Slot::field(field::BLACKLIST), account.as_bytes())
}

fn last_tx_block_slot(account: &Address) -> Slot {
    Slot::mapping(Slot::field(field::LAST_TX_BLOCK), account.as_bytes())
}

impl<S: SlotRead> Ledger<S> {
    pub fn initialized(&self) -> LedgerResult<bool> {
        Ok(read_value(&self.store, &Slot::field(field::INITIALIZED))?)
    }

    pub fn balance_of(&self, account: &Address) -> LedgerResult<Amount> {
        Ok(read_value(&self.store, &balance_slot(account))?)
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> LedgerResult<Amount> {
        Ok(read_value(&self.store, &allowance_slot(owner, spender))?)
    }

    pub fn total_supply(&self) -> LedgerResult<Amount> {
        Ok(read_value(&self.store, &Slot::field(field::TOTAL_SUPPLY))?)
    }

    pub fn name(&self) -> LedgerResult<String> {
        Ok(read_value(&self.store, &Slot::field(field::NAME))?)
    }

    pub fn symbol(&self) -> LedgerResult<String> {
        Ok(read_value(&self.store, &Slot::field(field::SYMBOL))?)
    }

    pub fn decimals(&self) -> LedgerResult<u8> {
        Ok(read_value(&self.store, &Slot::field(field::DECIMALS))?)
    }

    pub fn mintable(&self) -> LedgerResult<bool> {
        Ok(read_value(&self.store, &Slot::field(field::MINTABLE))?)
    }

    pub fn owner(&self) -> LedgerResult<Address> {
        Ok(read_value(&self.store, &Slot::field(field::OWNER))?)
    }

    pub fn start_block(&self) -> LedgerResult<u64> {
        Ok(read_value(&self.store, &Slot::field(field::START_BLOCK))?)
    }

    pub fn is_blacklisted(&self, account: &Address) -> LedgerResult<bool> {
        Ok(read_value(&self.store, &blacklist_slot(account))?)
    }

    pub fn max_transaction_value(&self) -> LedgerResult<Amount> {
        Ok(read_value(&self.store, &Slot::field(field::MAX_TRANSACTION_VALUE))?)
    }

    pub fn throttle_enabled(&self) -> LedgerResult<bool> {
        Ok(read_value(&self.store, &Slot::field(field::THROTTLE_ENABLED))?)
    }

    /// Last block an account sent a transfer in; `None` if it never has
    pub fn last_tx_block(&self, account: &Address) -> LedgerResult<Option<u64>> {
        Ok(read_value(&self.store, &last_tx_block_slot(account))?)
    }

    pub fn blacklist_enforced(&self) -> LedgerResult<bool> {
        if !self.rules.blacklist_admin {
            return Ok(false);
        }
        Ok(read_value(&self.store, &Slot::field(field::BLACKLIST_ENFORCED))?)
    }
}

impl<S: SlotWrite> Ledger<S> {
    pub(super) fn set_initialized(&mut self) -> LedgerResult<()> {
        Ok(write_value(&mut self.store, Slot::field(field::INITIALIZED), &true)?)
    }

    pub(super) fn set_balance(&mut self, account: &Address, amount: Amount) -> LedgerResult<()> {
        Ok(write_value(&mut self.store, balance_slot(account), &amount)?)
    }

    pub(super) fn set_allowance(
        &mut self,
        owner: &Address,
        spender: &Address,
        amount: Amount,
    ) -> LedgerResult<()> {
        Ok(write_value(&mut self.store, allowance_slot(owner, spender), &amount)?)
    }

    pub(super) fn set_total_supply(&mut self, amount: Amount) -> LedgerResult<()> {
        Ok(write_value(&mut self.store, Slot::field(field::TOTAL_SUPPLY), &amount)?)
    }

    pub(super) fn set_metadata(&mut self, name: &str, symbol: &str, decimals: u8) -> LedgerResult<()> {
        write_value(&mut self.store, Slot::field(field::NAME), &name.to_string())?;
        write_value(&mut self.store, Slot::field(field::SYMBOL), &symbol.to_string())?;
        write_value(&mut self.store, Slot::field(field::DECIMALS), &decimals)?;
        Ok(())
    }

    pub(super) fn set_mintable(&mut self, mintable: bool) -> LedgerResult<()> {
        Ok(write_value(&mut self.store, Slot::field(field::MINTABLE), &mintable)?)
    }

    pub(super) fn set_owner(&mut self, owner: &Address) -> LedgerResult<()> {
        Ok(write_value(&mut self.store, Slot::field(field::OWNER), owner)?)
    }

    pub(super) fn set_start_block(&mut self, block: u64) -> LedgerResult<()> {
        Ok(write_value(&mut self.store, Slot::field(field::START_BLOCK), &block)?)
    }

    pub(super) fn set_blacklisted(&mut self, account: &Address, flag: bool) -> LedgerResult<()> {
        Ok(write_value(&mut self.store, blacklist_slot(account), &flag)?)
    }

    pub(super) fn store_max_transaction_value(&mut self, amount: Amount) -> LedgerResult<()> {
        Ok(write_value(
            &mut self.store,
            Slot::field(field::MAX_TRANSACTION_VALUE),
            &amount,
        )?)
    }

    pub(super) fn set_throttle_enabled(&mut self, enabled: bool) -> LedgerResult<()> {
        Ok(write_value(&mut self.store, Slot::field(field::THROTTLE_ENABLED), &enabled)?)
    }

    pub(super) fn set_last_tx_block(&mut self, account: &Address, block: u64) -> LedgerResult<()> {
        Ok(write_value(&mut self.store, last_tx_block_slot(account), &Some(block))?)
    }

    pub(super) fn set_blacklist_enforced(&mut self, enforced: bool) -> LedgerResult<()> {
        Ok(write_value(&mut self.store, Slot::field(field::BLACKLIST_ENFORCED), &enforced)?)
    }
}
