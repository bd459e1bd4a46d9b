//! Write-buffering cache layered over another store
//!
//! A `CacheStore` is the transaction scope callers hand to the registry:
//! reads fall through to the parent, writes stay buffered until `write`
//! applies them to the parent as one batch. Dropping the cache without
//! writing discards everything, including any account numbers allocated
//! through it.

use acctreg_core::{
    IterOrder, KvIter, KvPair, RegistryResult, StateChange, StateMutator, StateProvider,
};
use parking_lot::RwLock;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::iter::Peekable;
use tracing::debug;

use crate::store::{range_bounds, range_is_empty};

/// Buffered entry: `None` marks a pending delete
type CacheEntry = (Vec<u8>, Option<Vec<u8>>);

/// Transactional overlay over a parent store
pub struct CacheStore<'a, P: StateMutator + ?Sized> {
    parent: &'a P,
    writes: RwLock<BTreeMap<Vec<u8>, Option<Vec<u8>>>>,
}

impl<'a, P: StateMutator + ?Sized> CacheStore<'a, P> {
    pub fn new(parent: &'a P) -> Self {
        Self {
            parent,
            writes: RwLock::new(BTreeMap::new()),
        }
    }

    /// Number of buffered changes
    pub fn pending(&self) -> usize {
        self.writes.read().len()
    }

    /// Buffered changes in key order
    pub fn changes(&self) -> Vec<StateChange> {
        self.writes
            .read()
            .iter()
            .map(|(key, value)| match value {
                Some(value) => StateChange::Set {
                    key: key.clone(),
                    value: value.clone(),
                },
                None => StateChange::Delete { key: key.clone() },
            })
            .collect()
    }

    /// Apply all buffered changes to the parent atomically
    pub fn write(self) -> RegistryResult<()> {
        let changes = self.changes();
        if changes.is_empty() {
            return Ok(());
        }
        debug!(changes = changes.len(), "committing cache");
        self.parent.apply_batch(changes)
    }

    /// Drop all buffered changes
    pub fn discard(self) {
        debug!(changes = self.pending(), "discarding cache");
    }
}

impl<'a, P: StateMutator + ?Sized> StateProvider for CacheStore<'a, P> {
    fn get(&self, key: &[u8]) -> RegistryResult<Option<Vec<u8>>> {
        if let Some(value) = self.writes.read().get(key) {
            return Ok(value.clone());
        }
        self.parent.get(key)
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

        let mut buffered: Vec<CacheEntry> = self
            .writes
            .read()
            .range::<[u8], _>(range_bounds(start, end))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        if order == IterOrder::Descending {
            buffered.reverse();
        }

        let parent = self.parent.iter_range(start, end, order)?;
        Ok(Box::new(MergeIter {
            parent: parent.peekable(),
            cache: buffered.into_iter().peekable(),
            order,
        }))
    }
}

impl<'a, P: StateMutator + ?Sized> StateMutator for CacheStore<'a, P> {
    fn set(&self, key: &[u8], value: &[u8]) -> RegistryResult<()> {
        self.writes.write().insert(key.to_vec(), Some(value.to_vec()));
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> RegistryResult<()> {
        self.writes.write().insert(key.to_vec(), None);
        Ok(())
    }

    fn apply_batch(&self, changes: Vec<StateChange>) -> RegistryResult<()> {
        let mut writes = self.writes.write();
        for change in changes {
            match change {
                StateChange::Set { key, value } => writes.insert(key, Some(value)),
                StateChange::Delete { key } => writes.insert(key, None),
            };
        }
        Ok(())
    }
}

enum Next {
    Done,
    Parent,
    Cache,
    Both,
}

/// Merges a parent scan with buffered writes; buffered entries shadow the parent
struct MergeIter<'a> {
    parent: Peekable<KvIter<'a>>,
    cache: Peekable<std::vec::IntoIter<CacheEntry>>,
    order: IterOrder,
}

impl<'a> Iterator for MergeIter<'a> {
    type Item = RegistryResult<KvPair>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let step = match (self.parent.peek(), self.cache.peek()) {
                (None, None) => Next::Done,
                (Some(Err(_)), _) | (Some(Ok(_)), None) => Next::Parent,
                (None, Some(_)) => Next::Cache,
                (Some(Ok((parent_key, _))), Some((cache_key, _))) => {
                    let ord = parent_key.as_slice().cmp(cache_key.as_slice());
                    let ord = match self.order {
                        IterOrder::Ascending => ord,
                        IterOrder::Descending => ord.reverse(),
                    };
                    match ord {
                        Ordering::Less => Next::Parent,
                        Ordering::Greater => Next::Cache,
                        Ordering::Equal => Next::Both,
                    }
                }
            };

            let (key, value) = match step {
                Next::Done => return None,
                Next::Parent => return self.parent.next(),
                Next::Cache => self.cache.next()?,
                Next::Both => {
                    self.parent.next();
                    self.cache.next()?
                }
            };

            // a buffered delete hides the parent entry and yields nothing
            if let Some(value) = value {
                return Some(Ok((key, value)));
            }
        }
    }
}
