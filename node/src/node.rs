//! Registry node over a sled-backed store

use acctreg_auth::{
    export_genesis, init_genesis, Account, AccountKeeper, GenesisState, QueryServer,
};
use acctreg_core::{Address, RegistryConfig, RegistryError, RegistryResult};
use acctreg_state::{CacheStore, PersistentStateStore};
use std::path::PathBuf;
use tracing::info;

/// On-disk account registry
pub struct RegistryNode {
    config: RegistryConfig,
    store: PersistentStateStore,
    keeper: AccountKeeper,
}

impl RegistryNode {
    pub fn open(config: RegistryConfig) -> RegistryResult<Self> {
        let keeper = AccountKeeper::new(&config)?;
        let store = PersistentStateStore::open(&config.data_dir)?;
        info!(
            data_dir = %config.data_dir.display(),
            prefix = %config.bech32_prefix,
            "opened registry"
        );

        Ok(Self {
            config,
            store,
            keeper,
        })
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn keeper(&self) -> &AccountKeeper {
        &self.keeper
    }

    pub fn store(&self) -> &PersistentStateStore {
        &self.store
    }

    pub fn query(&self) -> QueryServer<'_> {
        self.keeper.query_server()
    }

    /// Import `genesis`; nothing is written unless the whole import succeeds
    pub fn init_genesis(&self, genesis: &GenesisState) -> RegistryResult<()> {
        let tx = CacheStore::new(&self.store);
        init_genesis(&self.keeper, &tx, genesis)?;
        tx.write()
    }

    pub fn export_genesis(&self) -> RegistryResult<GenesisState> {
        export_genesis(&self.keeper, &self.store)
    }

    /// Create and store a fresh account at a text address
    pub fn create_account(&self, address: &str) -> RegistryResult<Account> {
        let bytes = self.keeper.address_codec().string_to_bytes(address)?;
        let address = Address::new(bytes)?;

        let tx = CacheStore::new(&self.store);
        if self.keeper.has_account(&tx, &address)? {
            return Err(RegistryError::InvalidArgument(format!(
                "account {} already exists",
                address
            )));
        }
        let account = self.keeper.new_account_with_address(&tx, address)?;
        self.keeper.set_account(&tx, &account)?;
        tx.write()?;

        info!(account = %account, "created account");
        Ok(account)
    }
}

/// Builder for `RegistryNode`
pub struct NodeBuilder {
    config: RegistryConfig,
}

impl NodeBuilder {
    pub fn new() -> Self {
        Self {
            config: RegistryConfig::default(),
        }
    }

    pub fn config(mut self, config: RegistryConfig) -> Self {
        self.config = config;
        self
    }

    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.data_dir = dir.into();
        self
    }

    pub fn bech32_prefix(mut self, prefix: &str) -> Self {
        self.config.bech32_prefix = prefix.to_string();
        self
    }

    pub fn build(self) -> RegistryResult<RegistryNode> {
        RegistryNode::open(self.config)
    }
}

impl Default for NodeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
