//! Launch-window anti-bot gate
//!
//! Rules applied to every balance-moving transfer, in this order:
//! 1. value cap, always on
//! 2. per-block throttle, when enabled
//! 3. after the transfer succeeds and while `block < start_block`, a
//!    non-owner sender marks its recipient as blacklisted
//!
//! Blacklisting never rejects the transfer that caused it. Where enforcement
//! is on, a blacklisted debited account is refused, except the owner.

use tracing::info;

use crate::crypto::Address;
use crate::storage::{SlotRead, SlotWrite};
use super::{Amount, Env, Event, Ledger, LedgerError, LedgerResult};

/// Gate parameters loaded once per transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AntiBotGate {
    pub owner: Address,
    pub start_block: u64,
    pub max_transaction_value: Amount,
    pub throttle_enabled: bool,
}

impl AntiBotGate {
    pub fn in_launch_window(&self, block: u64) -> bool {
        block < self.start_block
    }

    pub fn check_value(&self, amount: Amount) -> LedgerResult<()> {
        if amount > self.max_transaction_value {
            return Err(LedgerError::ExceededMaxTransactionValue {
                amount,
                max: self.max_transaction_value,
            });
        }
        Ok(())
    }

    pub fn check_throttle(&self, from: &Address, block: u64, last: Option<u64>) -> LedgerResult<()> {
        if self.throttle_enabled && last == Some(block) {
            return Err(LedgerError::ExceededMaxTransactionsPerBlock {
                account: *from,
                block,
            });
        }
        Ok(())
    }

    /// Account to blacklist once a transfer from `from` to `to` has succeeded.
    ///
    /// The amount plays no part: a zero-value transfer from an empty account
    /// marks its recipient too. With enforcement on that lets anyone freeze
    /// an account before launch for free; the owner undoes it with
    /// `setBlacklisted` and is itself never refused.
    pub fn contagion_target(&self, from: &Address, to: &Address, block: u64) -> Option<Address> {
        if self.in_launch_window(block) && *from != self.owner {
            Some(*to)
        } else {
            None
        }
    }
}

impl<S: SlotRead> Ledger<S> {
    pub fn anti_bot_gate(&self) -> LedgerResult<AntiBotGate> {
        Ok(AntiBotGate {
            owner: self.owner()?,
            start_block: self.start_block()?,
            max_transaction_value: self.max_transaction_value()?,
            throttle_enabled: self.throttle_enabled()?,
        })
    }
}

impl<S: SlotWrite> Ledger<S> {
    /// Checks that run before any balance moves
    pub(super) fn gate_before(
        &self,
        gate: &AntiBotGate,
        from: &Address,
        amount: Amount,
        block: u64,
    ) -> LedgerResult<()> {
        gate.check_value(amount)?;
        if gate.throttle_enabled {
            gate.check_throttle(from, block, self.last_tx_block(from)?)?;
        }
        if *from != gate.owner && self.blacklist_enforced()? && self.is_blacklisted(from)? {
            return Err(LedgerError::SenderBlacklisted(*from));
        }
        Ok(())
    }

    /// Side effects of a transfer that has already moved balances
    pub(super) fn gate_after(
        &mut self,
        gate: &AntiBotGate,
        from: &Address,
        to: &Address,
        block: u64,
    ) -> LedgerResult<()> {
        if gate.throttle_enabled {
            self.set_last_tx_block(from, block)?;
        }
        if let Some(target) = gate.contagion_target(from, to, block) {
            if !self.is_blacklisted(&target)? {
                self.set_blacklisted(&target, true)?;
                info!(account = %target, sender = %from, block, "Blacklisted pre-launch recipient");
                self.emit(Event::Blacklisted {
                    account: target,
                    block,
                });
            }
        }
        Ok(())
    }

    pub fn set_max_transaction_value(&mut self, env: &Env, amount: Amount) -> LedgerResult<()> {
        self.require_owner(env)?;
        let old_value = self.max_transaction_value()?;
        self.store_max_transaction_value(amount)?;
        self.emit(Event::MaxTransactionValueUpdated {
            old_value,
            new_value: amount,
        });
        Ok(())
    }

    pub fn set_throttle(&mut self, env: &Env, enabled: bool) -> LedgerResult<()> {
        self.require_owner(env)?;
        self.set_throttle_enabled(enabled)?;
        self.emit(Event::ThrottleUpdated { enabled });
        Ok(())
    }

    pub fn set_blacklist_enforcement(&mut self, env: &Env, enforced: bool) -> LedgerResult<()> {
        self.require_owner(env)?;
        self.set_blacklist_enforced(enforced)?;
        self.emit(Event::BlacklistEnforcementUpdated { enforced });
        Ok(())
    }

    /// Owner edit of blacklist membership
    pub fn update_blacklist(&mut self, env: &Env, account: &Address, flag: bool) -> LedgerResult<()> {
        self.require_owner(env)?;
        if account.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }
        if self.is_blacklisted(account)? == flag {
            return Ok(());
        }
        self.set_blacklisted(account, flag)?;
        if flag {
            self.emit(Event::Blacklisted {
                account: *account,
                block: env.block,
            });
        } else {
            self.emit(Event::Unblacklisted { account: *account });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate(start_block: u64) -> AntiBotGate {
        AntiBotGate {
            owner: Address::derive(b"owner"),
            start_block,
            max_transaction_value: 1_000,
            throttle_enabled: false,
        }
    }

    #[test]
    fn test_value_cap_is_inclusive() {
        let g = gate(10);
        assert!(g.check_value(1_000).is_ok());
        assert_eq!(
            g.check_value(1_001),
            Err(LedgerError::ExceededMaxTransactionValue {
                amount: 1_001,
                max: 1_000
            })
        );
    }

    #[test]
    fn test_launch_window_is_half_open() {
        let g = gate(10);
        assert!(g.in_launch_window(9));
        assert!(!g.in_launch_window(10));
        assert!(!g.in_launch_window(11));
    }

    #[test]
    fn test_owner_sender_exempt_from_contagion() {
        let g = gate(10);
        let user = Address::derive(b"user");
        assert_eq!(g.contagion_target(&g.owner, &user, 3), None);
    }

    #[test]
    fn test_non_owner_sender_marks_recipient() {
        let g = gate(10);
        let pool = Address::derive(b"pool");
        let user = Address::derive(b"user");
        assert_eq!(g.contagion_target(&pool, &user, 3), Some(user));
        assert_eq!(g.contagion_target(&pool, &user, 10), None);
    }

    #[test]
    fn test_throttle_only_when_enabled() {
        let mut g = gate(0);
        let user = Address::derive(b"user");
        assert!(g.check_throttle(&user, 5, Some(5)).is_ok());

        g.throttle_enabled = true;
        assert!(g.check_throttle(&user, 5, Some(4)).is_ok());
        assert!(g.check_throttle(&user, 5, None).is_ok());
        assert_eq!(
            g.check_throttle(&user, 5, Some(5)),
            Err(LedgerError::ExceededMaxTransactionsPerBlock {
                account: user,
                block: 5
            })
        );
    }
}
