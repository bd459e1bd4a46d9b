//! Configuration types for ACCTREG

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::error::RegistryError;
use crate::traits::RegistryResult;

/// Module permission allowing an account to mint
pub const MINTER: &str = "minter";
/// Module permission allowing an account to burn
pub const BURNER: &str = "burner";
/// Module permission allowing an account to stake
pub const STAKING: &str = "staking";

/// Main registry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Human-readable prefix for address text encoding
    pub bech32_prefix: String,

    /// First account number handed out on an empty store
    pub account_number_base: u64,

    /// Page size used when a request does not set one
    pub default_page_limit: u64,

    /// Module accounts known to the registry, with their permissions
    pub module_permissions: BTreeMap<String, Vec<String>>,

    /// Data directory
    pub data_dir: PathBuf,

    /// Logging level
    pub log_level: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        let mut module_permissions = BTreeMap::new();
        module_permissions.insert("fee_collector".to_string(), vec![]);
        module_permissions.insert("mint".to_string(), vec![MINTER.to_string()]);
        module_permissions.insert(
            "bonded_tokens_pool".to_string(),
            vec![BURNER.to_string(), STAKING.to_string()],
        );
        module_permissions.insert(
            "not_bonded_tokens_pool".to_string(),
            vec![BURNER.to_string(), STAKING.to_string()],
        );

        Self {
            bech32_prefix: "acct".to_string(),
            account_number_base: 0,
            default_page_limit: 100,
            module_permissions,
            data_dir: PathBuf::from("./data"),
            log_level: "info".to_string(),
        }
    }
}

impl RegistryConfig {
    /// Check the configuration for values the registry cannot run with
    pub fn validate(&self) -> RegistryResult<()> {
        if self.bech32_prefix.is_empty() {
            return Err(RegistryError::ConfigError("bech32 prefix cannot be empty".into()));
        }
        if self.bech32_prefix.chars().any(|c| c.is_ascii_uppercase()) {
            return Err(RegistryError::ConfigError(format!(
                "bech32 prefix must be lowercase: {}",
                self.bech32_prefix
            )));
        }
        if self.bech32_prefix.len() > 83
            || !self.bech32_prefix.bytes().all(|b| (33..=126).contains(&b))
        {
            return Err(RegistryError::ConfigError(format!(
                "bech32 prefix must be 1-83 printable ASCII characters: {:?}",
                self.bech32_prefix
            )));
        }
        if self.default_page_limit == 0 {
            return Err(RegistryError::ConfigError("default page limit must be positive".into()));
        }
        for (name, permissions) in &self.module_permissions {
            if name.trim().is_empty() {
                return Err(RegistryError::ConfigError("module name cannot be blank".into()));
            }
            for permission in permissions {
                if ![MINTER, BURNER, STAKING].contains(&permission.as_str()) {
                    return Err(RegistryError::ConfigError(format!(
                        "module {} has unknown permission {}",
                        name, permission
                    )));
                }
            }
        }
        Ok(())
    }

    /// Save to JSON
    pub fn to_json(&self) -> RegistryResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| RegistryError::SerializationError(e.to_string()))
    }

    /// Load from JSON
    pub fn from_json(json: &str) -> RegistryResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| RegistryError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}
