//! In-memory state store for testing and light nodes

use acctreg_core::{
    IterOrder, KvIter, KvPair, RegistryResult, StateChange, StateMutator, StateProvider,
};
use parking_lot::RwLock;
use std::collections::BTreeMap;

use crate::store::{range_bounds, range_is_empty};

/// Ordered in-memory state store.
///
/// Iterators copy the requested range when they are created, so a caller may
/// write to the store while walking it without deadlocking on the lock.
pub struct MemoryStateStore {
    data: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self {
            data: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}

impl Default for MemoryStateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MemoryStateStore {
    fn clone(&self) -> Self {
        Self {
            data: RwLock::new(self.data.read().clone()),
        }
    }
}

impl StateProvider for MemoryStateStore {
    fn get(&self, key: &[u8]) -> RegistryResult<Option<Vec<u8>>> {
        Ok(self.data.read().get(key).cloned())
    }

    fn exists(&self, key: &[u8]) -> RegistryResult<bool> {
        Ok(self.data.read().contains_key(key))
    }

    fn iter_range(
        &self,
        start: Option<&[u8]>,
        end: Option<&[u8]>,
        order: IterOrder,
    ) -> RegistryResult<KvIter<'_>> {
        if range_is_empty(start, end) {
            return Ok(Box::new(std::iter::empty()));
        }

        let data = self.data.read();
        let range = data.range::<[u8], _>(range_bounds(start, end));
        let mut entries: Vec<KvPair> = range.map(|(k, v)| (k.clone(), v.clone())).collect();
        if order == IterOrder::Descending {
            entries.reverse();
        }

        Ok(Box::new(entries.into_iter().map(Ok)))
    }
}

impl StateMutator for MemoryStateStore {
    fn set(&self, key: &[u8], value: &[u8]) -> RegistryResult<()> {
        self.data.write().insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> RegistryResult<()> {
        self.data.write().remove(key);
        Ok(())
    }

    fn apply_batch(&self, changes: Vec<StateChange>) -> RegistryResult<()> {
        let mut data = self.data.write();
        for change in changes {
            match change {
                StateChange::Set { key, value } => {
                    data.insert(key, value);
                }
                StateChange::Delete { key } => {
                    data.remove(&key);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(iter: KvIter<'_>) -> Vec<Vec<u8>> {
        iter.map(|r| r.unwrap().0).collect()
    }

    #[test]
    fn test_memory_store_basic() {
        let store = MemoryStateStore::new();

        store.set(b"key1", b"value1").unwrap();
        let value = store.get(b"key1").unwrap();
        assert_eq!(value, Some(b"value1".to_vec()));

        store.delete(b"key1").unwrap();
        let value = store.get(b"key1").unwrap();
        assert_eq!(value, None);
    }

    #[test]
    fn test_memory_store_batch() {
        let store = MemoryStateStore::new();
        store.set(b"k0", b"v0").unwrap();

        let changes = vec![
            StateChange::Set {
                key: b"k1".to_vec(),
                value: b"v1".to_vec(),
            },
            StateChange::Set {
                key: b"k2".to_vec(),
                value: b"v2".to_vec(),
            },
            StateChange::Delete { key: b"k0".to_vec() },
        ];
        store.apply_batch(changes).unwrap();

        assert!(!store.exists(b"k0").unwrap());
        assert!(store.exists(b"k1").unwrap());
        assert!(store.exists(b"k2").unwrap());
    }

    #[test]
    fn test_memory_store_range_order() {
        let store = MemoryStateStore::new();
        for k in [b"c", b"a", b"d", b"b"] {
            store.set(k, b"").unwrap();
        }

        let asc = keys(
            store
                .iter_range(Some(&b"b"[..]), Some(&b"d"[..]), IterOrder::Ascending)
                .unwrap(),
        );
        assert_eq!(asc, vec![b"b".to_vec(), b"c".to_vec()]);

        let desc = keys(store.iter_range(None, None, IterOrder::Descending).unwrap());
        assert_eq!(
            desc,
            vec![b"d".to_vec(), b"c".to_vec(), b"b".to_vec(), b"a".to_vec()]
        );

        let inverted = keys(
            store
                .iter_range(Some(&b"d"[..]), Some(&b"a"[..]), IterOrder::Ascending)
                .unwrap(),
        );
        assert!(inverted.is_empty());
    }

    #[test]
    fn test_memory_store_write_during_iteration() {
        let store = MemoryStateStore::new();
        store.set(b"a", b"1").unwrap();
        store.set(b"b", b"2").unwrap();

        for item in store.iter_range(None, None, IterOrder::Ascending).unwrap() {
            let (key, _) = item.unwrap();
            store.set(&key, b"updated").unwrap();
        }

        assert_eq!(store.get(b"a").unwrap(), Some(b"updated".to_vec()));
        assert_eq!(store.len(), 2);
    }
}
