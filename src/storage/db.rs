//! Database persistence layer using Sled
//!
//! The committed state space, caller nonces and the block height are written
//! in one sled transaction per accepted call, so a crash never leaves a
//! ledger change on disk without the nonce that authorised it.

use sled::transaction::{ConflictableTransactionError, TransactionError};
use sled::{Db, Transactional, Tree};
use std::collections::HashMap;
use std::path::Path;

use crate::crypto::{Address, Hash, ADDRESS_LEN};
use super::{ChangeSet, Slot, StateSpace, StorageError};

const HEIGHT_KEY: &str = "height";

/// Database wrapper
#[derive(Debug, Clone)]
pub struct LedgerDB {
    db: Db,
    state_tree: Tree,
    nonces_tree: Tree,
    metadata_tree: Tree,
}

impl LedgerDB {
    /// Open or create the database
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let db = sled::open(path)?;
        let state_tree = db.open_tree("state")?;
        let nonces_tree = db.open_tree("nonces")?;
        let metadata_tree = db.open_tree("metadata")?;

        Ok(Self {
            db,
            state_tree,
            nonces_tree,
            metadata_tree,
        })
    }

    /// True when nothing has ever been committed
    pub fn is_fresh(&self) -> bool {
        self.state_tree.is_empty()
    }

    /// Persist one accepted operation
    pub fn commit(
        &self,
        changes: &ChangeSet,
        nonce: Option<(Address, u64)>,
        height: u64,
    ) -> Result<(), StorageError> {
        let result = (&self.state_tree, &self.nonces_tree, &self.metadata_tree).transaction(
            |(state, nonces, metadata)| {
                for (slot, value) in changes.iter() {
                    let key = slot.as_bytes().as_slice();
                    match value {
                        Some(bytes) => {
                            state.insert(key, bytes.as_slice())?;
                        }
                        None => {
                            state.remove(key)?;
                        }
                    }
                }
                if let Some((address, next)) = nonce {
                    nonces.insert(address.as_bytes().as_slice(), &next.to_le_bytes()[..])?;
                }
                metadata.insert(HEIGHT_KEY, &height.to_le_bytes()[..])?;
                Ok::<(), ConflictableTransactionError<()>>(())
            },
        );
        result.map_err(|e: TransactionError<()>| StorageError::Database(format!("{:?}", e)))?;
        self.db.flush()?;
        Ok(())
    }

    /// Record a height change that carries no ledger writes
    pub fn save_height(&self, height: u64) -> Result<(), StorageError> {
        self.metadata_tree.insert(HEIGHT_KEY, &height.to_le_bytes()[..])?;
        self.db.flush()?;
        Ok(())
    }

    pub fn load_height(&self) -> Result<Option<u64>, StorageError> {
        match self.metadata_tree.get(HEIGHT_KEY)? {
            Some(bytes) => {
                let arr: [u8; 8] = bytes.as_ref().try_into().map_err(|_| StorageError::Corrupt {
                    tree: "metadata",
                    reason: "height is not 8 bytes".into(),
                })?;
                Ok(Some(u64::from_le_bytes(arr)))
            }
            None => Ok(None),
        }
    }

    /// Load the entire state space
    pub fn load_state(&self) -> Result<StateSpace, StorageError> {
        let mut state = StateSpace::new();
        for item in self.state_tree.iter() {
            let (key, value) = item?;
            let arr: [u8; 32] = key.as_ref().try_into().map_err(|_| StorageError::Corrupt {
                tree: "state",
                reason: format!("slot key of {} bytes", key.len()),
            })?;
            state.insert_raw(Slot(Hash(arr)), value.to_vec());
        }
        Ok(state)
    }

    pub fn load_nonces(&self) -> Result<HashMap<Address, u64>, StorageError> {
        let mut nonces = HashMap::new();
        for item in self.nonces_tree.iter() {
            let (key, value) = item?;
            let addr: [u8; ADDRESS_LEN] = key.as_ref().try_into().map_err(|_| StorageError::Corrupt {
                tree: "nonces",
                reason: format!("address key of {} bytes", key.len()),
            })?;
            let nonce: [u8; 8] = value.as_ref().try_into().map_err(|_| StorageError::Corrupt {
                tree: "nonces",
                reason: "nonce is not 8 bytes".into(),
            })?;
            nonces.insert(Address(addr), u64::from_le_bytes(nonce));
        }
        Ok(nonces)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::write_value;

    #[test]
    fn test_commit_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let db = LedgerDB::open(dir.path()).unwrap();
        assert!(db.is_fresh());

        let mut state = StateSpace::new();
        let mut overlay = state.overlay();
        write_value(&mut overlay, Slot::field(3), &1_000u128).unwrap();
        let changes = overlay.into_changes();
        state.apply(&changes);

        let alice = Address::derive(b"alice");
        db.commit(&changes, Some((alice, 1)), 7).unwrap();

        assert!(!db.is_fresh());
        assert_eq!(db.load_state().unwrap(), state);
        assert_eq!(db.load_height().unwrap(), Some(7));
        assert_eq!(db.load_nonces().unwrap().get(&alice), Some(&1));
    }

    #[test]
    fn test_cleared_slot_removed_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let db = LedgerDB::open(dir.path()).unwrap();

        let mut state = StateSpace::new();
        let mut overlay = state.overlay();
        write_value(&mut overlay, Slot::field(1), &5u64).unwrap();
        let changes = overlay.into_changes();
        state.apply(&changes);
        db.commit(&changes, None, 1).unwrap();

        let mut overlay = state.overlay();
        write_value(&mut overlay, Slot::field(1), &0u64).unwrap();
        let changes = overlay.into_changes();
        db.commit(&changes, None, 2).unwrap();

        assert!(db.load_state().unwrap().is_empty());
    }
}
