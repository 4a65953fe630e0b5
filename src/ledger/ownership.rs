//! Single-owner authorization

use tracing::info;

use crate::crypto::Address;
use crate::storage::{SlotRead, SlotWrite};
use super::{Env, Event, Ledger, LedgerError, LedgerResult};

impl<S: SlotRead> Ledger<S> {
    /// Capability check at the top of every privileged operation.
    ///
    /// After renouncement the owner is the zero address, which no caller can
    /// authenticate as.
    pub fn require_owner(&self, env: &Env) -> LedgerResult<()> {
        let owner = self.owner()?;
        if owner.is_zero() || env.caller != owner {
            return Err(LedgerError::Unauthorized(format!(
                "{} is not the owner",
                env.caller
            )));
        }
        Ok(())
    }
}

impl<S: SlotWrite> Ledger<S> {
    pub fn transfer_ownership(&mut self, env: &Env, new_owner: &Address) -> LedgerResult<()> {
        self.require_owner(env)?;
        if new_owner.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }
        self.replace_owner(new_owner)
    }

    pub fn renounce_ownership(&mut self, env: &Env) -> LedgerResult<()> {
        self.require_owner(env)?;
        self.replace_owner(&Address::ZERO)
    }

    pub(super) fn replace_owner(&mut self, new_owner: &Address) -> LedgerResult<()> {
        let previous = self.owner()?;
        self.set_owner(new_owner)?;
        info!(%previous, new = %new_owner, "Ownership transferred");
        self.emit(Event::OwnershipTransferred {
            previous,
            new: *new_owner,
        });
        Ok(())
    }
}
