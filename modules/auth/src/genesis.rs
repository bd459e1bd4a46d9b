//! Genesis import and export

use acctreg_core::{
    AccountNumber, Address, RegistryError, RegistryResult, StateMutator, StateProvider,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::info;

use crate::account::{Account, AccountI};
use crate::any::Any;
use crate::codec::AccountCodec;
use crate::keeper::AccountKeeper;
use crate::params::Params;

/// Initial registry contents
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisState {
    pub params: Params,
    #[serde(default)]
    pub accounts: Vec<Any>,
}

impl GenesisState {
    pub fn new(params: Params, accounts: &[Account]) -> RegistryResult<Self> {
        let accounts = accounts.iter().map(Any::pack).collect::<RegistryResult<_>>()?;
        Ok(Self { params, accounts })
    }

    pub fn unpack_accounts(&self) -> RegistryResult<Vec<Account>> {
        self.accounts.iter().map(Any::unpack).collect()
    }

    /// Reject invalid params and accounts, repeated addresses or numbers,
    /// and numbers that leave no room for the counter
    pub fn validate(&self) -> RegistryResult<()> {
        self.params.validate()?;

        let mut addresses: HashSet<Address> = HashSet::new();
        let mut numbers: HashSet<AccountNumber> = HashSet::new();
        for account in self.unpack_accounts()? {
            account.validate()?;
            if account.account_number().0 == u64::MAX {
                return Err(RegistryError::InvalidArgument(format!(
                    "account number {} is out of range",
                    account.account_number()
                )));
            }

            if !addresses.insert(account.address().clone()) {
                return Err(RegistryError::InvalidArgument(format!(
                    "duplicate account found in genesis state; address: {}",
                    account.address()
                )));
            }
            if !numbers.insert(account.account_number()) {
                return Err(RegistryError::InvalidArgument(format!(
                    "duplicate account number found in genesis state; number: {}",
                    account.account_number()
                )));
            }
        }
        Ok(())
    }

    pub fn to_json(&self) -> RegistryResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> RegistryResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Load `genesis` into `ctx`.
///
/// Accounts are stored in account-number order and the counter ends past
/// the highest imported number. Configured module accounts missing from the
/// file are created afterwards. A rejected import leaves `ctx` untouched.
pub fn init_genesis<C, S>(
    keeper: &AccountKeeper<C>,
    ctx: &S,
    genesis: &GenesisState,
) -> RegistryResult<()>
where
    C: AccountCodec,
    S: StateMutator + ?Sized,
{
    genesis.validate()?;

    let mut accounts = genesis.unpack_accounts()?;
    accounts.sort_by_key(|account| account.account_number());

    let allocator = keeper.allocator();
    if let Some(lowest) = accounts.first() {
        let next = allocator.peek(ctx)?;
        if lowest.account_number() < next {
            return Err(RegistryError::InvalidArgument(format!(
                "account number {} is already in use; next free number is {}",
                lowest.account_number(),
                next
            )));
        }
    }

    let modules: Vec<String> = keeper.module_names().map(str::to_string).collect();
    for name in &modules {
        // fails when the stored record at the module address is not a module account
        keeper.get_module_account(ctx, name)?;
        let Some(address) = keeper.module_address(name) else {
            continue;
        };
        let clash = accounts
            .iter()
            .any(|account| account.address() == &address && !account.is_module());
        if clash {
            return Err(RegistryError::InvalidArgument(format!(
                "genesis account at {} collides with module account {}",
                address, name
            )));
        }
    }

    keeper.set_params(ctx, &genesis.params)?;
    for account in &accounts {
        // validate rejected u64::MAX
        allocator.set(ctx, AccountNumber(account.account_number().0 + 1))?;
        keeper.set_account(ctx, account)?;
    }

    for name in &modules {
        keeper.get_or_create_module_account(ctx, name)?;
    }

    info!(
        accounts = accounts.len(),
        modules = modules.len(),
        "initialized registry from genesis"
    );
    Ok(())
}

/// Snapshot params and every stored account
pub fn export_genesis<C, S>(keeper: &AccountKeeper<C>, ctx: &S) -> RegistryResult<GenesisState>
where
    C: AccountCodec,
    S: StateProvider + ?Sized,
{
    let params = keeper.get_params(ctx)?;
    let accounts = keeper.get_all_accounts(ctx)?;
    info!(accounts = accounts.len(), "exported registry genesis");
    GenesisState::new(params, &accounts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::BaseAccount;
    use crate::keys::PARAMS_KEY;
    use acctreg_core::{RegistryConfig, Sequence};
    use acctreg_state::MemoryStateStore;

    fn base(byte: u8, number: u64) -> Account {
        Account::Base(BaseAccount::new(
            Address::new(vec![byte; 20]).unwrap(),
            None,
            AccountNumber(number),
            Sequence::new(0),
        ))
    }

    #[test]
    fn test_duplicate_address_rejected() {
        let genesis = GenesisState::new(Params::default(), &[base(1, 0), base(1, 1)]).unwrap();
        assert!(genesis.validate().is_err());
    }

    #[test]
    fn test_duplicate_number_rejected() {
        let genesis = GenesisState::new(Params::default(), &[base(1, 3), base(2, 3)]).unwrap();
        assert!(genesis.validate().is_err());
    }

    #[test]
    fn test_init_moves_counter_past_imports() {
        let store = MemoryStateStore::new();
        let keeper = AccountKeeper::new(&RegistryConfig::default()).unwrap();
        let genesis = GenesisState::new(Params::default(), &[base(2, 9), base(1, 4)]).unwrap();

        init_genesis(&keeper, &store, &genesis).unwrap();

        // four configured modules take 10..=13
        assert_eq!(keeper.allocator().peek(&store).unwrap(), AccountNumber(14));
        let stored = keeper
            .get_account(&store, &Address::new(vec![1; 20]).unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(stored.account_number(), AccountNumber(4));
        assert!(keeper.get_module_account(&store, "mint").unwrap().is_some());
    }

    #[test]
    fn test_export_then_import() {
        let source = MemoryStateStore::new();
        let keeper = AccountKeeper::new(&RegistryConfig::default()).unwrap();
        let genesis = GenesisState::new(Params::default(), &[base(5, 0), base(6, 1)]).unwrap();
        init_genesis(&keeper, &source, &genesis).unwrap();

        let exported = export_genesis(&keeper, &source).unwrap();
        let json = exported.to_json().unwrap();

        let target = MemoryStateStore::new();
        init_genesis(&keeper, &target, &GenesisState::from_json(&json).unwrap()).unwrap();

        assert_eq!(
            keeper.get_all_accounts(&target).unwrap(),
            keeper.get_all_accounts(&source).unwrap()
        );
        assert_eq!(
            keeper.allocator().peek(&target).unwrap(),
            keeper.allocator().peek(&source).unwrap()
        );
    }

    #[test]
    fn test_init_rejects_used_number() {
        let store = MemoryStateStore::new();
        let keeper = AccountKeeper::new(&RegistryConfig::default()).unwrap();
        keeper.allocator().set(&store, AccountNumber(5)).unwrap();

        let params = Params {
            max_memo_characters: 1,
            ..Default::default()
        };
        let genesis = GenesisState::new(params, &[base(1, 2), base(2, 8)]).unwrap();
        assert!(init_genesis(&keeper, &store, &genesis).is_err());

        assert_eq!(store.get(PARAMS_KEY).unwrap(), None);
        assert_eq!(store.len(), 1);
        assert_eq!(keeper.allocator().peek(&store).unwrap(), AccountNumber(5));
    }

    #[test]
    fn test_rejected_import_leaves_store_empty() {
        let store = MemoryStateStore::new();
        let keeper = AccountKeeper::new(&RegistryConfig::default()).unwrap();
        let params = Params {
            max_memo_characters: 1,
            ..Default::default()
        };
        let genesis = GenesisState::new(params, &[base(1, 3), base(2, u64::MAX)]).unwrap();

        assert!(genesis.validate().is_err());
        assert!(init_genesis(&keeper, &store, &genesis).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_base_account_at_module_address_rejected() {
        let store = MemoryStateStore::new();
        let keeper = AccountKeeper::new(&RegistryConfig::default()).unwrap();
        let squatter = Account::Base(BaseAccount::new(
            keeper.module_address("mint").unwrap(),
            None,
            AccountNumber(0),
            Sequence::new(0),
        ));
        let genesis = GenesisState::new(Params::default(), &[base(1, 1), squatter]).unwrap();

        assert!(init_genesis(&keeper, &store, &genesis).is_err());
        assert!(store.is_empty());
    }
}
