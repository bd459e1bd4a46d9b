//! Persistent state store using sled database

use acctreg_core::{
    IterOrder, KvIter, RegistryError, RegistryResult, StateChange, StateMutator, StateProvider,
};
use sled::{Db, Tree};
use std::path::Path;
use tracing::debug;

use crate::store::{range_bounds, range_is_empty};

const STATE_TREE: &str = "state";

fn storage_err(e: sled::Error) -> RegistryError {
    RegistryError::StorageError(e.to_string())
}

/// Persistent state store backed by sled database
pub struct PersistentStateStore {
    db: Db,
    state: Tree,
}

impl PersistentStateStore {
    pub fn open<P: AsRef<Path>>(path: P) -> RegistryResult<Self> {
        let db = sled::open(path.as_ref()).map_err(storage_err)?;
        let state = db.open_tree(STATE_TREE).map_err(storage_err)?;

        debug!(path = %path.as_ref().display(), entries = state.len(), "opened state store");

        Ok(Self { db, state })
    }

    /// Flush pending writes to disk
    pub fn flush(&self) -> RegistryResult<()> {
        self.db.flush().map_err(storage_err)?;
        Ok(())
    }
}

impl StateProvider for PersistentStateStore {
    fn get(&self, key: &[u8]) -> RegistryResult<Option<Vec<u8>>> {
        self.state
            .get(key)
            .map(|opt| opt.map(|v| v.to_vec()))
            .map_err(storage_err)
    }

    fn exists(&self, key: &[u8]) -> RegistryResult<bool> {
        self.state.contains_key(key).map_err(storage_err)
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

        let iter = self.state.range::<&[u8], _>(range_bounds(start, end));
        let convert = |item: Result<(sled::IVec, sled::IVec), sled::Error>| {
            item.map(|(k, v)| (k.to_vec(), v.to_vec())).map_err(storage_err)
        };

        Ok(match order {
            IterOrder::Ascending => Box::new(iter.map(convert)),
            IterOrder::Descending => Box::new(iter.rev().map(convert)),
        })
    }
}

impl StateMutator for PersistentStateStore {
    fn set(&self, key: &[u8], value: &[u8]) -> RegistryResult<()> {
        self.state.insert(key, value).map_err(storage_err)?;
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> RegistryResult<()> {
        self.state.remove(key).map_err(storage_err)?;
        Ok(())
    }

    fn apply_batch(&self, changes: Vec<StateChange>) -> RegistryResult<()> {
        let count = changes.len();
        let mut batch = sled::Batch::default();

        for change in changes {
            match change {
                StateChange::Set { key, value } => batch.insert(key, value),
                StateChange::Delete { key } => batch.remove(key),
            }
        }

        self.state.apply_batch(batch).map_err(storage_err)?;
        self.flush()?;

        debug!(changes = count, "applied state batch");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_persistent_store_basic() {
        let tmp = TempDir::new().unwrap();
        let store = PersistentStateStore::open(tmp.path()).unwrap();

        store.set(b"key1", b"value1").unwrap();
        let value = store.get(b"key1").unwrap();
        assert_eq!(value, Some(b"value1".to_vec()));

        store.delete(b"key1").unwrap();
        let value = store.get(b"key1").unwrap();
        assert_eq!(value, None);
    }

    #[test]
    fn test_persistent_store_reopen() {
        let tmp = TempDir::new().unwrap();

        {
            let store = PersistentStateStore::open(tmp.path()).unwrap();
            store.set(b"key1", b"value1").unwrap();
            let changes = vec![StateChange::Set {
                key: b"k2".to_vec(),
                value: b"v2".to_vec(),
            }];
            store.apply_batch(changes).unwrap();
        }

        {
            let store = PersistentStateStore::open(tmp.path()).unwrap();
            assert_eq!(store.get(b"key1").unwrap(), Some(b"value1".to_vec()));
            assert_eq!(store.get(b"k2").unwrap(), Some(b"v2".to_vec()));
        }
    }

    #[test]
    fn test_persistent_store_range() {
        let tmp = TempDir::new().unwrap();
        let store = PersistentStateStore::open(tmp.path()).unwrap();
        for k in [&b"\x01b"[..], b"\x01a", b"\x02a", b"\x00z"] {
            store.set(k, b"v").unwrap();
        }

        let asc: Vec<Vec<u8>> = store
            .iter_range(Some(&[0x01][..]), Some(&[0x02][..]), IterOrder::Ascending)
            .unwrap()
            .map(|r| r.unwrap().0)
            .collect();
        assert_eq!(asc, vec![b"\x01a".to_vec(), b"\x01b".to_vec()]);

        let desc: Vec<Vec<u8>> = store
            .iter_range(None, None, IterOrder::Descending)
            .unwrap()
            .map(|r| r.unwrap().0)
            .collect();
        assert_eq!(desc.first(), Some(&b"\x02a".to_vec()));
        assert_eq!(desc.last(), Some(&b"\x00z".to_vec()));
    }
}
