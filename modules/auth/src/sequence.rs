//! Account number allocation
//!
//! The counter lives under its own key in the caller's store, so an
//! allocation commits or rolls back together with whatever else the caller
//! writes through the same store.

use acctreg_core::{AccountNumber, RegistryError, RegistryResult, StateMutator, StateProvider};
use tracing::debug;

use crate::keys::GLOBAL_ACCOUNT_NUMBER_KEY;

/// Hands out strictly increasing, never reused account numbers
#[derive(Debug, Clone, Copy, Default)]
pub struct AccountNumberAllocator {
    base: u64,
}

impl AccountNumberAllocator {
    /// `base` is the first number handed out on a store without a counter
    pub fn new(base: u64) -> Self {
        Self { base }
    }

    pub fn base(&self) -> u64 {
        self.base
    }

    /// Return the current counter value and store its successor
    pub fn next<S: StateMutator + ?Sized>(&self, store: &S) -> RegistryResult<AccountNumber> {
        let current = self.peek(store)?;
        let next = current.0.checked_add(1).ok_or_else(|| {
            RegistryError::StateCorruption("account number counter overflowed".into())
        })?;
        store.set(GLOBAL_ACCOUNT_NUMBER_KEY, &next.to_be_bytes())?;

        debug!(account_number = current.0, "allocated account number");
        Ok(current)
    }

    /// Number the next allocation will return
    pub fn peek<S: StateProvider + ?Sized>(&self, store: &S) -> RegistryResult<AccountNumber> {
        match store.get(GLOBAL_ACCOUNT_NUMBER_KEY)? {
            Some(bytes) => decode_counter(&bytes).map(AccountNumber),
            None => Ok(AccountNumber(self.base)),
        }
    }

    /// Move the counter; refuses to go backwards
    pub fn set<S: StateMutator + ?Sized>(
        &self,
        store: &S,
        next: AccountNumber,
    ) -> RegistryResult<()> {
        let current = self.peek(store)?;
        if next < current {
            return Err(RegistryError::InvalidArgument(format!(
                "account number counter cannot move back from {} to {}",
                current, next
            )));
        }
        store.set(GLOBAL_ACCOUNT_NUMBER_KEY, &next.0.to_be_bytes())
    }
}

fn decode_counter(bytes: &[u8]) -> RegistryResult<u64> {
    let raw: [u8; 8] = bytes.try_into().map_err(|_| {
        RegistryError::StateCorruption(format!(
            "account number counter has {} bytes, expected 8",
            bytes.len()
        ))
    })?;
    Ok(u64::from_be_bytes(raw))
}
