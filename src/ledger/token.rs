//! Token operations
//!
//! Balances, allowances and supply. Every path that moves a balance between
//! two accounts goes through `move_balance`, which is wrapped by the
//! anti-bot gate. Mint and burn change supply and exactly one balance.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::crypto::Address;
use crate::storage::SlotWrite;
use super::{Amount, Env, Event, Ledger, LedgerError, LedgerResult};

/// One-time initialization payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitParams {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub total_amount: Amount,
    pub mintable: bool,
    pub owner: Address,
    pub start_block: u64,
}

impl<S: SlotWrite> Ledger<S> {
    /// Configure the token and mint the initial supply to the owner.
    ///
    /// The value cap starts at the initial supply.
    pub fn initialize(&mut self, params: &InitParams) -> LedgerResult<()> {
        if self.initialized()? {
            return Err(LedgerError::AlreadyInitialized);
        }
        if params.owner.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }

        self.set_initialized()?;
        self.set_metadata(&params.name, &params.symbol, params.decimals)?;
        self.set_mintable(params.mintable)?;
        self.set_start_block(params.start_block)?;
        self.store_max_transaction_value(params.total_amount)?;
        self.replace_owner(&params.owner)?;
        self.mint_to(&params.owner, params.total_amount)?;
        Ok(())
    }

    pub fn transfer(&mut self, env: &Env, to: &Address, amount: Amount) -> LedgerResult<()> {
        self.move_balance(&env.caller, to, amount, env.block)
    }

    pub fn transfer_from(
        &mut self,
        env: &Env,
        owner: &Address,
        to: &Address,
        amount: Amount,
    ) -> LedgerResult<()> {
        self.spend_allowance(owner, &env.caller, amount)?;
        self.move_balance(owner, to, amount, env.block)
    }

    pub fn approve(&mut self, env: &Env, spender: &Address, amount: Amount) -> LedgerResult<()> {
        self.write_allowance(&env.caller, spender, amount)
    }

    /// Returns the new allowance
    pub fn increase_allowance(
        &mut self,
        env: &Env,
        spender: &Address,
        added: Amount,
    ) -> LedgerResult<Amount> {
        let current = self.allowance(&env.caller, spender)?;
        let updated = current
            .checked_add(added)
            .ok_or(LedgerError::ArithmeticOverflow)?;
        self.write_allowance(&env.caller, spender, updated)?;
        Ok(updated)
    }

    /// Returns the new allowance
    pub fn decrease_allowance(
        &mut self,
        env: &Env,
        spender: &Address,
        subtracted: Amount,
    ) -> LedgerResult<Amount> {
        let current = self.allowance(&env.caller, spender)?;
        let updated = current
            .checked_sub(subtracted)
            .ok_or(LedgerError::AllowanceUnderflow {
                current,
                decrease: subtracted,
            })?;
        self.write_allowance(&env.caller, spender, updated)?;
        Ok(updated)
    }

    /// Mintability is checked before the caller so a fixed-supply token
    /// reports `NotMintable` to everyone, owner included.
    pub fn mint(&mut self, env: &Env, amount: Amount) -> LedgerResult<()> {
        if !self.mintable()? {
            return Err(LedgerError::NotMintable);
        }
        self.require_owner(env)?;
        self.mint_to(&env.caller, amount)
    }

    pub fn burn(&mut self, env: &Env, amount: Amount) -> LedgerResult<()> {
        self.burn_from_account(&env.caller, amount)
    }

    pub fn burn_from(&mut self, env: &Env, account: &Address, amount: Amount) -> LedgerResult<()> {
        self.spend_allowance(account, &env.caller, amount)?;
        self.burn_from_account(account, amount)
    }

    fn move_balance(
        &mut self,
        from: &Address,
        to: &Address,
        amount: Amount,
        block: u64,
    ) -> LedgerResult<()> {
        if from.is_zero() || to.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }

        let gate = self.anti_bot_gate()?;
        self.gate_before(&gate, from, amount, block)?;

        let from_balance = self.balance_of(from)?;
        if from_balance < amount {
            return Err(LedgerError::InsufficientBalance {
                have: from_balance,
                need: amount,
            });
        }
        self.set_balance(from, from_balance - amount)?;

        // Read after the debit so a self-transfer nets to zero.
        let to_balance = self.balance_of(to)?;
        let credited = to_balance
            .checked_add(amount)
            .ok_or(LedgerError::ArithmeticOverflow)?;
        self.set_balance(to, credited)?;

        debug!(%from, %to, %amount, block, "Transfer");
        self.emit(Event::Transfer {
            from: *from,
            to: *to,
            value: amount,
        });

        self.gate_after(&gate, from, to, block)
    }

    fn mint_to(&mut self, account: &Address, amount: Amount) -> LedgerResult<()> {
        let supply = self
            .total_supply()?
            .checked_add(amount)
            .ok_or(LedgerError::ArithmeticOverflow)?;
        let balance = self
            .balance_of(account)?
            .checked_add(amount)
            .ok_or(LedgerError::ArithmeticOverflow)?;
        self.set_total_supply(supply)?;
        self.set_balance(account, balance)?;
        self.emit(Event::Transfer {
            from: Address::ZERO,
            to: *account,
            value: amount,
        });
        Ok(())
    }

    fn burn_from_account(&mut self, account: &Address, amount: Amount) -> LedgerResult<()> {
        if account.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }
        let balance = self.balance_of(account)?;
        if balance < amount {
            return Err(LedgerError::InsufficientBalance {
                have: balance,
                need: amount,
            });
        }
        let supply = self
            .total_supply()?
            .checked_sub(amount)
            .ok_or(LedgerError::ArithmeticUnderflow)?;
        self.set_balance(account, balance - amount)?;
        self.set_total_supply(supply)?;
        self.emit(Event::Transfer {
            from: *account,
            to: Address::ZERO,
            value: amount,
        });
        Ok(())
    }

    fn spend_allowance(&mut self, owner: &Address, spender: &Address, amount: Amount) -> LedgerResult<()> {
        let current = self.allowance(owner, spender)?;
        if current < amount {
            return Err(LedgerError::InsufficientAllowance {
                have: current,
                need: amount,
            });
        }
        self.write_allowance(owner, spender, current - amount)
    }

    fn write_allowance(&mut self, owner: &Address, spender: &Address, amount: Amount) -> LedgerResult<()> {
        if owner.is_zero() || spender.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }
        let old_value = self.allowance(owner, spender)?;
        self.set_allowance(owner, spender, amount)?;
        self.emit(Event::Approval {
            owner: *owner,
            spender: *spender,
            old_value,
            new_value: amount,
        });
        Ok(())
    }
}
