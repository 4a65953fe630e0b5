//! Observable events
//!
//! Events are collected while an operation runs and only reach the node's log
//! when the operation commits.

use serde::Serialize;

use crate::crypto::Address;
use super::Amount;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    /// Balance movement; mint comes from and burn goes to the zero address
    Transfer {
        from: Address,
        to: Address,
        value: Amount,
    },
    Approval {
        owner: Address,
        spender: Address,
        old_value: Amount,
        new_value: Amount,
    },
    OwnershipTransferred {
        previous: Address,
        new: Address,
    },
    Blacklisted {
        account: Address,
        block: u64,
    },
    Unblacklisted {
        account: Address,
    },
    MaxTransactionValueUpdated {
        old_value: Amount,
        new_value: Amount,
    },
    ThrottleUpdated {
        enabled: bool,
    },
    BlacklistEnforcementUpdated {
        enforced: bool,
    },
    Upgraded {
        implementation: Address,
    },
    AdminChanged {
        previous: Address,
        new: Address,
    },
}
