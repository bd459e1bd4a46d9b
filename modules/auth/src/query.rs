//! Read-only query surface
//!
//! Every handler rejects a missing request before touching the store and
//! reports failures as a `QueryStatus`: `InvalidArgument` for malformed
//! input, `NotFound` for missing records, `Internal` for everything that
//! indicates broken state.

use acctreg_core::{Address, RegistryError, StateProvider, StatusCode};
use acctreg_state::{paginate, PageRequest, PageResponse, PrefixStore};
use serde::{Deserialize, Serialize};
use serde_with::{base64::Base64, serde_as};
use thiserror::Error;
use tracing::debug;

use crate::account::Account;
use crate::any::Any;
use crate::codec::{AccountCodec, BincodeAccountCodec};
use crate::keeper::AccountKeeper;
use crate::keys::ADDRESS_STORE_KEY_PREFIX;
use crate::params::Params;

/// Error returned to query callers
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct QueryStatus {
    pub code: StatusCode,
    pub message: String,
}

impl QueryStatus {
    pub fn new(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(StatusCode::InvalidArgument, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NotFound, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::Internal, message)
    }
}

impl From<RegistryError> for QueryStatus {
    fn from(err: RegistryError) -> Self {
        Self::new(err.code(), err.to_string())
    }
}

pub type QueryResult<T> = Result<T, QueryStatus>;

// ============ Requests and responses ============

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryAccountsRequest {
    pub pagination: Option<PageRequest>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryAccountsResponse {
    pub accounts: Vec<Any>,
    pub pagination: PageResponse,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryAccountRequest {
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryAccountResponse {
    pub account: Any,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParamsRequest {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParamsResponse {
    pub params: Params,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryModuleAccountsRequest {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryModuleAccountsResponse {
    pub accounts: Vec<Any>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bech32PrefixRequest {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bech32PrefixResponse {
    pub bech32_prefix: String,
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressBytesToStringRequest {
    #[serde_as(as = "Base64")]
    pub address_bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressBytesToStringResponse {
    pub address_string: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressStringToBytesRequest {
    pub address_string: String,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressStringToBytesResponse {
    #[serde_as(as = "Base64")]
    pub address_bytes: Vec<u8>,
}

// ============ Server ============

/// Query handlers over an `AccountKeeper`
pub struct QueryServer<'a, C: AccountCodec = BincodeAccountCodec> {
    keeper: &'a AccountKeeper<C>,
}

fn require<T>(request: Option<T>) -> QueryResult<T> {
    request.ok_or_else(|| QueryStatus::invalid_argument("empty request"))
}

impl<'a, C: AccountCodec> QueryServer<'a, C> {
    pub fn new(keeper: &'a AccountKeeper<C>) -> Self {
        Self { keeper }
    }

    /// One page of stored accounts in address order
    pub fn accounts<S: StateProvider + ?Sized>(
        &self,
        ctx: &S,
        request: Option<QueryAccountsRequest>,
    ) -> QueryResult<QueryAccountsResponse> {
        let request = require(request)?;
        let store = PrefixStore::new(ctx, ADDRESS_STORE_KEY_PREFIX);

        let mut accounts = Vec::new();
        let pagination = paginate(
            &store,
            request.pagination.as_ref(),
            self.keeper.default_page_limit(),
            |address, value| {
                let account = self.keeper.decode_account(address, value)?;
                accounts.push(Any::pack(&account)?);
                Ok(())
            },
        )?;

        Ok(QueryAccountsResponse {
            accounts,
            pagination,
        })
    }

    /// The account stored under a text address
    pub fn account<S: StateProvider + ?Sized>(
        &self,
        ctx: &S,
        request: Option<QueryAccountRequest>,
    ) -> QueryResult<QueryAccountResponse> {
        let request = require(request)?;
        if request.address.trim().is_empty() {
            return Err(QueryStatus::invalid_argument("address cannot be empty"));
        }

        let address = self.parse_address(&request.address)?;
        match self.keeper.get_account(ctx, &address)? {
            Some(account) => Ok(QueryAccountResponse {
                account: Any::pack(&account)?,
            }),
            None => {
                debug!(address = %request.address, "queried account not found");
                Err(QueryStatus::not_found(format!(
                    "account {} not found",
                    request.address
                )))
            }
        }
    }

    pub fn params<S: StateProvider + ?Sized>(
        &self,
        ctx: &S,
        request: Option<QueryParamsRequest>,
    ) -> QueryResult<QueryParamsResponse> {
        require(request)?;
        Ok(QueryParamsResponse {
            params: self.keeper.get_params(ctx)?,
        })
    }

    /// Every configured module account, in module name order.
    ///
    /// A single missing module account fails the whole call; no partial list
    /// is returned.
    pub fn module_accounts<S: StateProvider + ?Sized>(
        &self,
        ctx: &S,
        request: Option<QueryModuleAccountsRequest>,
    ) -> QueryResult<QueryModuleAccountsResponse> {
        require(request)?;

        let mut accounts = Vec::new();
        for name in self.keeper.module_names() {
            let account = self
                .keeper
                .get_module_account(ctx, name)?
                .ok_or_else(|| QueryStatus::not_found(format!("account {} not found", name)))?;
            accounts.push(Any::pack(&Account::Module(account))?);
        }

        Ok(QueryModuleAccountsResponse { accounts })
    }

    pub fn bech32_prefix(
        &self,
        request: Option<Bech32PrefixRequest>,
    ) -> QueryResult<Bech32PrefixResponse> {
        require(request)?;
        Ok(Bech32PrefixResponse {
            bech32_prefix: self.keeper.bech32_prefix().to_string(),
        })
    }

    pub fn address_bytes_to_string(
        &self,
        request: Option<AddressBytesToStringRequest>,
    ) -> QueryResult<AddressBytesToStringResponse> {
        let request = require(request)?;
        if request.address_bytes.is_empty() {
            return Err(QueryStatus::invalid_argument("empty address bytes is not allowed"));
        }

        let address_string = self
            .keeper
            .address_codec()
            .bytes_to_string(&request.address_bytes)
            .map_err(invalid_argument)?;
        Ok(AddressBytesToStringResponse { address_string })
    }

    pub fn address_string_to_bytes(
        &self,
        request: Option<AddressStringToBytesRequest>,
    ) -> QueryResult<AddressStringToBytesResponse> {
        let request = require(request)?;
        if request.address_string.trim().is_empty() {
            return Err(QueryStatus::invalid_argument("empty address string is not allowed"));
        }

        let address_bytes = self
            .keeper
            .address_codec()
            .string_to_bytes(&request.address_string)
            .map_err(invalid_argument)?;
        Ok(AddressStringToBytesResponse { address_bytes })
    }

    fn parse_address(&self, text: &str) -> QueryResult<Address> {
        let bytes = self
            .keeper
            .address_codec()
            .string_to_bytes(text)
            .map_err(invalid_argument)?;
        Address::new(bytes).map_err(invalid_argument)
    }
}

// Text decode failures are the caller's fault whatever the codec reports.
fn invalid_argument(err: RegistryError) -> QueryStatus {
    QueryStatus::invalid_argument(err.to_string())
}
