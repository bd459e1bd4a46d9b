//! Core traits defining ACCTREG interfaces
//!
//! The registry never owns a database. Every read and write goes through one
//! of these traits on a store handle supplied by the caller, which is how the
//! caller's transaction scope reaches the registry.

/// Result type for ACCTREG operations
pub type RegistryResult<T> = Result<T, crate::error::RegistryError>;

/// Raw key/value pair yielded by store iterators
pub type KvPair = (Vec<u8>, Vec<u8>);

/// Owned store iterator.
///
/// Any backend resources held by the iterator are released when it is
/// dropped, whether it was exhausted, abandoned early, or unwound through.
pub type KvIter<'a> = Box<dyn Iterator<Item = RegistryResult<KvPair>> + 'a>;

/// Direction of a range scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IterOrder {
    #[default]
    Ascending,
    Descending,
}

/// Read access to a key-value store
pub trait StateProvider: Send + Sync {
    /// Get a value by key
    fn get(&self, key: &[u8]) -> RegistryResult<Option<Vec<u8>>>;

    /// Check if a key exists
    fn exists(&self, key: &[u8]) -> RegistryResult<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Scan keys in `[start, end)` in the given order.
    ///
    /// `None` leaves that side of the range unbounded.
    fn iter_range(
        &self,
        start: Option<&[u8]>,
        end: Option<&[u8]>,
        order: IterOrder,
    ) -> RegistryResult<KvIter<'_>>;
}

/// Write access to a key-value store
pub trait StateMutator: StateProvider {
    /// Set a value
    fn set(&self, key: &[u8], value: &[u8]) -> RegistryResult<()>;

    /// Delete a key
    fn delete(&self, key: &[u8]) -> RegistryResult<()>;

    /// Apply a batch of changes atomically
    fn apply_batch(&self, changes: Vec<StateChange>) -> RegistryResult<()>;
}

/// State change operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateChange {
    Set { key: Vec<u8>, value: Vec<u8> },
    Delete { key: Vec<u8> },
}
