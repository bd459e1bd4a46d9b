//! Prefix-namespaced view of a store

use acctreg_core::{
    IterOrder, KvIter, RegistryResult, StateChange, StateMutator, StateProvider,
};

use crate::store::prefix_end_bytes;

/// View of a parent store restricted to keys under `prefix`.
///
/// Keys passed in are relative to the prefix and keys yielded by iteration
/// have the prefix stripped.
pub struct PrefixStore<'a, S: ?Sized> {
    parent: &'a S,
    prefix: Vec<u8>,
}

impl<'a, S: ?Sized> PrefixStore<'a, S> {
    pub fn new(parent: &'a S, prefix: &[u8]) -> Self {
        Self {
            parent,
            prefix: prefix.to_vec(),
        }
    }

    pub fn prefix(&self) -> &[u8] {
        &self.prefix
    }

    fn full_key(&self, key: &[u8]) -> Vec<u8> {
        let mut full = Vec::with_capacity(self.prefix.len() + key.len());
        full.extend_from_slice(&self.prefix);
        full.extend_from_slice(key);
        full
    }
}

impl<'a, S: StateProvider + ?Sized> StateProvider for PrefixStore<'a, S> {
    fn get(&self, key: &[u8]) -> RegistryResult<Option<Vec<u8>>> {
        self.parent.get(&self.full_key(key))
    }

    fn exists(&self, key: &[u8]) -> RegistryResult<bool> {
        self.parent.exists(&self.full_key(key))
    }

    fn iter_range(
        &self,
        start: Option<&[u8]>,
        end: Option<&[u8]>,
        order: IterOrder,
    ) -> RegistryResult<KvIter<'_>> {
        let lower = self.full_key(start.unwrap_or_default());
        let upper = match end {
            Some(end) => Some(self.full_key(end)),
            None => prefix_end_bytes(&self.prefix),
        };

        let prefix_len = self.prefix.len();
        let iter = self
            .parent
            .iter_range(Some(lower.as_slice()), upper.as_deref(), order)?
            .map(move |item| item.map(|(key, value)| (key[prefix_len..].to_vec(), value)));
        Ok(Box::new(iter))
    }
}

impl<'a, S: StateMutator + ?Sized> StateMutator for PrefixStore<'a, S> {
    fn set(&self, key: &[u8], value: &[u8]) -> RegistryResult<()> {
        self.parent.set(&self.full_key(key), value)
    }

    fn delete(&self, key: &[u8]) -> RegistryResult<()> {
        self.parent.delete(&self.full_key(key))
    }

    fn apply_batch(&self, changes: Vec<StateChange>) -> RegistryResult<()> {
        let changes = changes
            .into_iter()
            .map(|change| match change {
                StateChange::Set { key, value } => StateChange::Set {
                    key: self.full_key(&key),
                    value,
                },
                StateChange::Delete { key } => StateChange::Delete {
                    key: self.full_key(&key),
                },
            })
            .collect();
        self.parent.apply_batch(changes)
    }
}
