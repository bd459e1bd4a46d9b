//! Account keeper - address-keyed account storage
//!
//! The keeper holds no state of its own. Every call takes the store to act
//! on, which is the caller's transaction scope; the keeper never opens or
//! commits anything itself.

use acctreg_core::{
    AccountNumber, Address, IterOrder, RegistryConfig, RegistryError, RegistryResult,
    StateMutator, StateProvider,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::account::{Account, AccountI, BaseAccount, ModuleAccount};
use crate::address::{AddressCodec, Bech32Codec};
use crate::codec::{AccountCodec, BincodeAccountCodec};
use crate::keys::{account_key_range, address_from_store_key, address_store_key, PARAMS_KEY};
use crate::params::Params;
use crate::query::QueryServer;
use crate::sequence::AccountNumberAllocator;

fn base_account_proto() -> Account {
    Account::Base(BaseAccount::default())
}

/// Account registry over a caller-supplied store
pub struct AccountKeeper<C: AccountCodec = BincodeAccountCodec> {
    codec: C,
    address_codec: Arc<dyn AddressCodec>,
    allocator: AccountNumberAllocator,
    proto: fn() -> Account,
    permissions: BTreeMap<String, Vec<String>>,
    bech32_prefix: String,
    default_page_limit: u64,
}

impl AccountKeeper<BincodeAccountCodec> {
    pub fn new(config: &RegistryConfig) -> RegistryResult<Self> {
        Self::with_codec(config, BincodeAccountCodec)
    }
}

impl<C: AccountCodec> AccountKeeper<C> {
    pub fn with_codec(config: &RegistryConfig, codec: C) -> RegistryResult<Self> {
        config.validate()?;

        Ok(Self {
            codec,
            address_codec: Arc::new(Bech32Codec::new(&config.bech32_prefix)),
            allocator: AccountNumberAllocator::new(config.account_number_base),
            proto: base_account_proto,
            permissions: config.module_permissions.clone(),
            bech32_prefix: config.bech32_prefix.clone(),
            default_page_limit: config.default_page_limit,
        })
    }

    /// Use `proto` to build the records handed out by `new_account_with_address`
    pub fn with_proto(mut self, proto: fn() -> Account) -> Self {
        self.proto = proto;
        self
    }

    /// Replace the address text codec
    pub fn with_address_codec(mut self, codec: Arc<dyn AddressCodec>) -> Self {
        self.address_codec = codec;
        self
    }

    pub fn address_codec(&self) -> &dyn AddressCodec {
        self.address_codec.as_ref()
    }

    pub fn bech32_prefix(&self) -> &str {
        &self.bech32_prefix
    }

    pub fn default_page_limit(&self) -> u64 {
        self.default_page_limit
    }

    pub fn allocator(&self) -> &AccountNumberAllocator {
        &self.allocator
    }

    /// Read-only query surface over this keeper
    pub fn query_server(&self) -> QueryServer<'_, C> {
        QueryServer::new(self)
    }

    // ============ Accounts ============

    /// Build an unsaved account for `address` with a fresh account number.
    ///
    /// Does not look for an existing record: persisting the result over an
    /// existing address replaces it. Call `has_account` first when that
    /// must not happen.
    pub fn new_account_with_address<S: StateMutator + ?Sized>(
        &self,
        ctx: &S,
        address: Address,
    ) -> RegistryResult<Account> {
        let mut account = (self.proto)();
        account.set_address(address)?;
        self.new_account(ctx, account)
    }

    /// Assign the next account number to `account`; does not persist it
    pub fn new_account<S: StateMutator + ?Sized>(
        &self,
        ctx: &S,
        mut account: Account,
    ) -> RegistryResult<Account> {
        let number = self.allocator.next(ctx)?;
        account.set_account_number(number)?;
        Ok(account)
    }

    /// Allocate an account number without building an account
    pub fn next_account_number<S: StateMutator + ?Sized>(
        &self,
        ctx: &S,
    ) -> RegistryResult<AccountNumber> {
        self.allocator.next(ctx)
    }

    pub fn has_account<S: StateProvider + ?Sized>(
        &self,
        ctx: &S,
        address: &Address,
    ) -> RegistryResult<bool> {
        ctx.exists(&address_store_key(address.as_bytes()))
    }

    /// Load the account at `address`.
    ///
    /// `Ok(None)` means no record exists. Bytes that exist but do not decode
    /// are reported as `StateCorruption`, never as absence.
    pub fn get_account<S: StateProvider + ?Sized>(
        &self,
        ctx: &S,
        address: &Address,
    ) -> RegistryResult<Option<Account>> {
        match ctx.get(&address_store_key(address.as_bytes()))? {
            Some(bytes) => Ok(Some(self.decode_account(address.as_bytes(), &bytes)?)),
            None => {
                debug!(%address, "account does not exist");
                Ok(None)
            }
        }
    }

    /// Every stored account in address order.
    ///
    /// Materializes the whole registry; prefer `iterate_accounts` or the
    /// paginated query on large stores.
    pub fn get_all_accounts<S: StateProvider + ?Sized>(
        &self,
        ctx: &S,
    ) -> RegistryResult<Vec<Account>> {
        let mut accounts = Vec::new();
        self.iterate_accounts(ctx, |account| {
            accounts.push(account);
            false
        })?;
        Ok(accounts)
    }

    /// Store `account` at its address, replacing any existing record
    pub fn set_account<S: StateMutator + ?Sized>(
        &self,
        ctx: &S,
        account: &Account,
    ) -> RegistryResult<()> {
        let address = account.address();
        Address::verify_format(address.as_bytes())?;

        let bytes = self.codec.marshal_account(account)?;
        ctx.set(&address_store_key(address.as_bytes()), &bytes)?;

        debug!(%address, account_number = account.account_number().0, "stored account");
        Ok(())
    }

    /// Delete the record of `account`.
    ///
    /// Anything that aggregates over accounts (supply totals, for one) stops
    /// adding up once a record is removed behind its back.
    pub fn remove_account<S: StateMutator + ?Sized>(
        &self,
        ctx: &S,
        account: &Account,
    ) -> RegistryResult<()> {
        let address = account.address();
        warn!(%address, account_number = account.account_number().0, "removing account");
        ctx.delete(&address_store_key(address.as_bytes()))
    }

    /// Visit accounts in ascending address order until `visit` returns true.
    ///
    /// The store iterator is dropped on every exit: exhaustion, early stop,
    /// a decode error, or a panic in `visit`.
    pub fn iterate_accounts<S, F>(&self, ctx: &S, mut visit: F) -> RegistryResult<()>
    where
        S: StateProvider + ?Sized,
        F: FnMut(Account) -> bool,
    {
        let (start, end) = account_key_range();
        let iter = ctx.iter_range(Some(start.as_slice()), end.as_deref(), IterOrder::Ascending)?;

        for item in iter {
            let (key, value) = item?;
            let address = address_from_store_key(&key).ok_or_else(|| {
                RegistryError::StateCorruption(format!(
                    "key 0x{} outside the account range",
                    hex::encode(&key)
                ))
            })?;
            let account = self.decode_account(address, &value)?;
            if visit(account) {
                break;
            }
        }
        Ok(())
    }

    /// Decode stored bytes found under `address`.
    ///
    /// Both a codec failure and a record whose address disagrees with its key
    /// mean the store is corrupt.
    pub fn decode_account(&self, address: &[u8], bytes: &[u8]) -> RegistryResult<Account> {
        let account = self.codec.unmarshal_account(bytes).map_err(|e| {
            RegistryError::StateCorruption(format!("account at 0x{}: {}", hex::encode(address), e))
        })?;

        if account.address().as_bytes() != address {
            return Err(RegistryError::StateCorruption(format!(
                "account at 0x{} records address {}",
                hex::encode(address),
                account.address()
            )));
        }
        Ok(account)
    }

    // ============ Module accounts ============

    /// Configured module names, sorted
    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.permissions.keys().map(String::as_str)
    }

    pub fn module_permissions(&self, name: &str) -> Option<&[String]> {
        self.permissions.get(name).map(Vec::as_slice)
    }

    /// Address of a configured module account
    pub fn module_address(&self, name: &str) -> Option<Address> {
        self.permissions
            .contains_key(name)
            .then(|| acctreg_crypto::module_address(name))
    }

    /// Look up a module account without creating it.
    ///
    /// Unknown module names and missing records both yield `Ok(None)`.
    pub fn get_module_account<S: StateProvider + ?Sized>(
        &self,
        ctx: &S,
        name: &str,
    ) -> RegistryResult<Option<ModuleAccount>> {
        let Some(address) = self.module_address(name) else {
            return Ok(None);
        };

        match self.get_account(ctx, &address)? {
            None => Ok(None),
            Some(Account::Module(account)) => Ok(Some(account)),
            Some(Account::Base(_)) => Err(RegistryError::Internal(format!(
                "account is not a module account: {}",
                name
            ))),
        }
    }

    /// Look up a module account, creating and storing it when missing
    pub fn get_or_create_module_account<S: StateMutator + ?Sized>(
        &self,
        ctx: &S,
        name: &str,
    ) -> RegistryResult<ModuleAccount> {
        let permissions = self
            .permissions
            .get(name)
            .ok_or_else(|| RegistryError::ModuleNotFound(name.to_string()))?;

        if let Some(account) = self.get_module_account(ctx, name)? {
            return Ok(account);
        }

        let mut account = ModuleAccount::new(name, permissions.clone());
        account.set_account_number(self.allocator.next(ctx)?)?;
        self.set_account(ctx, &Account::Module(account.clone()))?;

        info!(module = name, account_number = account.account_number().0, "created module account");
        Ok(account)
    }

    // ============ Params ============

    /// Current params; defaults until some have been stored
    pub fn get_params<S: StateProvider + ?Sized>(&self, ctx: &S) -> RegistryResult<Params> {
        match ctx.get(PARAMS_KEY)? {
            Some(bytes) => Params::from_bytes(&bytes),
            None => Ok(Params::default()),
        }
    }

    pub fn set_params<S: StateMutator + ?Sized>(
        &self,
        ctx: &S,
        params: &Params,
    ) -> RegistryResult<()> {
        params.validate()?;
        ctx.set(PARAMS_KEY, &params.to_bytes()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use acctreg_core::Sequence;
    use acctreg_state::{CacheStore, MemoryStateStore};

    fn keeper() -> AccountKeeper {
        AccountKeeper::new(&RegistryConfig::default()).unwrap()
    }

    fn addr(bytes: &[u8]) -> Address {
        Address::new(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_numbers_follow_creation_order() {
        let store = MemoryStateStore::new();
        let keeper = keeper();

        let numbers: Vec<u64> = (1u8..=5)
            .rev()
            .map(|i| {
                keeper
                    .new_account_with_address(&store, addr(&[i; 20]))
                    .unwrap()
                    .account_number()
                    .0
            })
            .collect();
        assert_eq!(numbers, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_create_does_not_persist() {
        let store = MemoryStateStore::new();
        let keeper = keeper();
        let account = keeper.new_account_with_address(&store, addr(&[1; 20])).unwrap();

        assert!(!keeper.has_account(&store, account.address()).unwrap());
        keeper.set_account(&store, &account).unwrap();
        assert!(keeper.has_account(&store, account.address()).unwrap());
    }

    #[test]
    fn test_get_roundtrip_and_update() {
        let store = MemoryStateStore::new();
        let keeper = keeper();
        let mut account = keeper.new_account_with_address(&store, addr(&[7; 20])).unwrap();
        keeper.set_account(&store, &account).unwrap();

        account.set_sequence(Sequence::new(4)).unwrap();
        keeper.set_account(&store, &account).unwrap();

        let loaded = keeper.get_account(&store, account.address()).unwrap().unwrap();
        assert_eq!(loaded, account);
        assert_eq!(loaded.sequence(), Sequence::new(4));
    }

    #[test]
    fn test_recreating_address_replaces_record() {
        let store = MemoryStateStore::new();
        let keeper = keeper();
        let address = addr(&[8; 20]);

        let first = keeper.new_account_with_address(&store, address.clone()).unwrap();
        keeper.set_account(&store, &first).unwrap();
        assert_eq!(first.account_number(), AccountNumber(0));

        // no existence check: a fresh number is burned and the record overwritten
        let second = keeper.new_account_with_address(&store, address.clone()).unwrap();
        assert_eq!(second.account_number(), AccountNumber(1));
        keeper.set_account(&store, &second).unwrap();

        let loaded = keeper.get_account(&store, &address).unwrap().unwrap();
        assert_eq!(loaded.account_number(), AccountNumber(1));

        let all = keeper.get_all_accounts(&store).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].address(), &address);
        assert_eq!(keeper.allocator().peek(&store).unwrap(), AccountNumber(2));
    }

    #[test]
    fn test_absent_is_not_an_error() {
        let store = MemoryStateStore::new();
        assert!(keeper().get_account(&store, &addr(&[9; 20])).unwrap().is_none());
    }

    #[test]
    fn test_corrupt_record_is_fatal() {
        let store = MemoryStateStore::new();
        let keeper = keeper();
        let address = addr(&[3; 20]);
        store
            .set(&address_store_key(address.as_bytes()), &[0xFF, 0xFF, 0xFF])
            .unwrap();

        let err = keeper.get_account(&store, &address).unwrap_err();
        assert!(matches!(err, RegistryError::StateCorruption(_)));
        assert!(keeper.get_all_accounts(&store).is_err());
    }

    #[test]
    fn test_record_under_wrong_key_is_fatal() {
        let store = MemoryStateStore::new();
        let keeper = keeper();
        let account = keeper.new_account_with_address(&store, addr(&[1; 20])).unwrap();
        let bytes = BincodeAccountCodec.marshal_account(&account).unwrap();
        store.set(&address_store_key(&[2; 20]), &bytes).unwrap();

        let err = keeper.get_account(&store, &addr(&[2; 20])).unwrap_err();
        assert!(matches!(err, RegistryError::StateCorruption(_)));
    }

    #[test]
    fn test_set_rejects_empty_address() {
        let store = MemoryStateStore::new();
        let err = keeper().set_account(&store, &Account::default()).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidAddress(_)));
        assert!(store.is_empty());
    }

    #[test]
    fn test_remove_account() {
        let store = MemoryStateStore::new();
        let keeper = keeper();
        let account = keeper.new_account_with_address(&store, addr(&[1; 20])).unwrap();
        keeper.set_account(&store, &account).unwrap();
        keeper.remove_account(&store, &account).unwrap();
        assert!(keeper.get_account(&store, account.address()).unwrap().is_none());
    }

    #[test]
    fn test_iterate_stops_early() {
        let store = MemoryStateStore::new();
        let keeper = keeper();
        for i in 1u8..=5 {
            let account = keeper.new_account_with_address(&store, addr(&[i])).unwrap();
            keeper.set_account(&store, &account).unwrap();
        }

        let mut visited = Vec::new();
        keeper
            .iterate_accounts(&store, |account| {
                visited.push(account.address().as_bytes()[0]);
                visited.len() == 2
            })
            .unwrap();
        assert_eq!(visited, vec![1, 2]);
    }

    #[test]
    fn test_iteration_skips_other_keys() {
        let store = MemoryStateStore::new();
        let keeper = keeper();
        keeper.set_params(&store, &Params::default()).unwrap();
        let account = keeper.new_account_with_address(&store, addr(&[0xFF; 20])).unwrap();
        keeper.set_account(&store, &account).unwrap();

        let all = keeper.get_all_accounts(&store).unwrap();
        assert_eq!(all, vec![account]);
    }

    #[test]
    fn test_custom_proto() {
        fn sequenced_proto() -> Account {
            Account::Base(BaseAccount {
                sequence: Sequence::new(1),
                ..Default::default()
            })
        }
        let store = MemoryStateStore::new();
        let keeper = keeper().with_proto(sequenced_proto);
        let account = keeper.new_account_with_address(&store, addr(&[1; 20])).unwrap();
        assert_eq!(account.sequence(), Sequence::new(1));
    }

    #[test]
    fn test_module_account_lookup_does_not_create() {
        let store = MemoryStateStore::new();
        let keeper = keeper();
        assert!(keeper.get_module_account(&store, "mint").unwrap().is_none());
        assert!(keeper.get_module_account(&store, "unknown").unwrap().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_get_or_create_module_account() {
        let store = MemoryStateStore::new();
        let keeper = keeper();

        let created = keeper.get_or_create_module_account(&store, "mint").unwrap();
        assert_eq!(created.account_number(), AccountNumber(0));
        assert!(created.has_permission(acctreg_core::MINTER));

        let again = keeper.get_or_create_module_account(&store, "mint").unwrap();
        assert_eq!(again, created);
        assert_eq!(keeper.allocator().peek(&store).unwrap(), AccountNumber(1));

        let err = keeper.get_or_create_module_account(&store, "gov").unwrap_err();
        assert!(matches!(err, RegistryError::ModuleNotFound(_)));
    }

    #[test]
    fn test_module_address_holding_base_account() {
        let store = MemoryStateStore::new();
        let keeper = keeper();
        let address = keeper.module_address("mint").unwrap();
        let account = keeper.new_account_with_address(&store, address).unwrap();
        keeper.set_account(&store, &account).unwrap();

        let err = keeper.get_module_account(&store, "mint").unwrap_err();
        assert!(matches!(err, RegistryError::Internal(_)));
    }

    #[test]
    fn test_params_default_and_update() {
        let store = MemoryStateStore::new();
        let keeper = keeper();
        assert_eq!(keeper.get_params(&store).unwrap(), Params::default());

        let params = Params {
            tx_sig_limit: 3,
            ..Default::default()
        };
        keeper.set_params(&store, &params).unwrap();
        assert_eq!(keeper.get_params(&store).unwrap(), params);

        let invalid = Params {
            tx_sig_limit: 0,
            ..Default::default()
        };
        assert!(keeper.set_params(&store, &invalid).is_err());
    }

    #[test]
    fn test_dropped_transaction_rolls_back_create() {
        let store = MemoryStateStore::new();
        let keeper = keeper();

        {
            let tx = CacheStore::new(&store);
            let account = keeper.new_account_with_address(&tx, addr(&[1; 20])).unwrap();
            keeper.set_account(&tx, &account).unwrap();
            assert!(keeper.has_account(&tx, account.address()).unwrap());
        }
        assert!(store.is_empty());

        let tx = CacheStore::new(&store);
        let account = keeper.new_account_with_address(&tx, addr(&[2; 20])).unwrap();
        assert_eq!(account.account_number(), AccountNumber(0));
        keeper.set_account(&tx, &account).unwrap();
        tx.write().unwrap();

        assert_eq!(keeper.get_all_accounts(&store).unwrap(), vec![account]);
    }
}
