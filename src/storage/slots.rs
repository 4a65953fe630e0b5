//! Slot-addressed state space
//!
//! Ledger fields, mapping entries and proxy pointers all live in one keyspace
//! of 32-byte slots. A field keeps its slot for the life of the ledger, which
//! is what lets a new logic version read the state an older one wrote.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::crypto::{hash_bytes, hash_parts, Hash};
use super::StorageError;

/// Identity of one stored value
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Slot(pub Hash);

impl Slot {
    /// Slot of the `index`-th declared field
    pub fn field(index: u64) -> Self {
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&index.to_be_bytes());
        Slot(Hash(bytes))
    }

    /// Slot of `key` inside the mapping declared at `base`
    pub fn mapping(base: Slot, key: &[u8]) -> Self {
        Slot(hash_parts(&[key, &base.0 .0]))
    }

    /// Slot named by a label, offset by one so no mapping key can reach it
    pub fn named(label: &str) -> Self {
        Slot(hash_bytes(label.as_bytes()).minus_one())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Slot({})", self.0.to_hex())
    }
}

/// Read access to raw slot contents
pub trait SlotRead {
    fn load(&self, slot: &Slot) -> Option<&[u8]>;
}

/// Write access; `None` clears the slot
pub trait SlotWrite: SlotRead {
    fn store(&mut self, slot: Slot, value: Option<Vec<u8>>);
}

impl<T: SlotRead + ?Sized> SlotRead for &T {
    fn load(&self, slot: &Slot) -> Option<&[u8]> {
        (**self).load(slot)
    }
}

impl<T: SlotRead + ?Sized> SlotRead for &mut T {
    fn load(&self, slot: &Slot) -> Option<&[u8]> {
        (**self).load(slot)
    }
}

impl<T: SlotWrite + ?Sized> SlotWrite for &mut T {
    fn store(&mut self, slot: Slot, value: Option<Vec<u8>>) {
        (**self).store(slot, value)
    }
}

/// Decode the value at `slot`, or the type's default when the slot is empty
pub fn read_value<T, S>(store: &S, slot: &Slot) -> Result<T, StorageError>
where
    T: DeserializeOwned + Default,
    S: SlotRead + ?Sized,
{
    match store.load(slot) {
        Some(bytes) => bincode::deserialize(bytes).map_err(|e| StorageError::Codec(e.to_string())),
        None => Ok(T::default()),
    }
}

/// Encode `value` into `slot`. Default values clear the slot.
pub fn write_value<T, S>(store: &mut S, slot: Slot, value: &T) -> Result<(), StorageError>
where
    T: Serialize + Default + PartialEq,
    S: SlotWrite + ?Sized,
{
    if *value == T::default() {
        store.store(slot, None);
        return Ok(());
    }
    let bytes = bincode::serialize(value).map_err(|e| StorageError::Codec(e.to_string()))?;
    store.store(slot, Some(bytes));
    Ok(())
}

/// Committed state of one ledger instance
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StateSpace {
    slots: BTreeMap<Slot, Vec<u8>>,
}

impl StateSpace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a write overlay on top of the committed state
    pub fn overlay(&self) -> StateOverlay<'_> {
        StateOverlay {
            base: self,
            writes: BTreeMap::new(),
        }
    }

    /// Merge a committed change set
    pub fn apply(&mut self, changes: &ChangeSet) {
        for (slot, value) in &changes.writes {
            match value {
                Some(bytes) => {
                    self.slots.insert(*slot, bytes.clone());
                }
                None => {
                    self.slots.remove(slot);
                }
            }
        }
    }

    /// Insert a raw slot, used when loading from disk
    pub fn insert_raw(&mut self, slot: Slot, value: Vec<u8>) {
        self.slots.insert(slot, value);
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Slot, &Vec<u8>)> {
        self.slots.iter()
    }
}

impl SlotRead for StateSpace {
    fn load(&self, slot: &Slot) -> Option<&[u8]> {
        self.slots.get(slot).map(Vec::as_slice)
    }
}

/// Buffered writes against a state space.
///
/// Dropping the overlay discards every write; only `into_changes` followed by
/// `StateSpace::apply` makes them visible.
#[derive(Debug)]
pub struct StateOverlay<'a> {
    base: &'a StateSpace,
    writes: BTreeMap<Slot, Option<Vec<u8>>>,
}

impl<'a> StateOverlay<'a> {
    pub fn into_changes(self) -> ChangeSet {
        ChangeSet {
            writes: self.writes,
        }
    }

    pub fn is_dirty(&self) -> bool {
        !self.writes.is_empty()
    }
}

impl SlotRead for StateOverlay<'_> {
    fn load(&self, slot: &Slot) -> Option<&[u8]> {
        match self.writes.get(slot) {
            Some(Some(bytes)) => Some(bytes.as_slice()),
            Some(None) => None,
            None => self.base.load(slot),
        }
    }
}

impl SlotWrite for StateOverlay<'_> {
    fn store(&mut self, slot: Slot, value: Option<Vec<u8>>) {
        self.writes.insert(slot, value);
    }
}

/// Writes produced by one successful operation
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ChangeSet {
    writes: BTreeMap<Slot, Option<Vec<u8>>>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Slot, &Option<Vec<u8>>)> {
        self.writes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_slots_are_distinct() {
        assert_ne!(Slot::field(0), Slot::field(1));
        assert_eq!(Slot::field(3).as_bytes()[31], 3);
    }

    #[test]
    fn test_mapping_slots_depend_on_base_and_key() {
        let a = Slot::mapping(Slot::field(1), b"alice");
        let b = Slot::mapping(Slot::field(2), b"alice");
        let c = Slot::mapping(Slot::field(1), b"bob");
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_absent_reads_default() {
        let state = StateSpace::new();
        let value: u128 = read_value(&state, &Slot::field(3)).unwrap();
        assert_eq!(value, 0);
    }

    #[test]
    fn test_overlay_isolated_until_applied() {
        let mut state = StateSpace::new();
        let slot = Slot::field(3);

        let changes = {
            let mut overlay = state.overlay();
            write_value(&mut overlay, slot, &42u128).unwrap();
            let seen: u128 = read_value(&overlay, &slot).unwrap();
            assert_eq!(seen, 42);
            overlay.into_changes()
        };

        let before: u128 = read_value(&state, &slot).unwrap();
        assert_eq!(before, 0);

        state.apply(&changes);
        let after: u128 = read_value(&state, &slot).unwrap();
        assert_eq!(after, 42);
    }

    #[test]
    fn test_dropped_overlay_discards_writes() {
        let state = StateSpace::new();
        {
            let mut overlay = state.overlay();
            write_value(&mut overlay, Slot::field(0), &true).unwrap();
        }
        assert!(state.is_empty());
    }

    #[test]
    fn test_default_value_clears_slot() {
        let mut state = StateSpace::new();
        let slot = Slot::field(7);

        let mut overlay = state.overlay();
        write_value(&mut overlay, slot, &9u64).unwrap();
        let changes = overlay.into_changes();
        state.apply(&changes);
        assert_eq!(state.len(), 1);

        let mut overlay = state.overlay();
        write_value(&mut overlay, slot, &0u64).unwrap();
        let changes = overlay.into_changes();
        state.apply(&changes);
        assert!(state.is_empty());
    }
}
