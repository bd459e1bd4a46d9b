//! Cursor-based pagination over range scans
//!
//! Every call opens a fresh bounded scan and returns the key to resume from,
//! so no iterator outlives a single request.

use acctreg_core::{IterOrder, RegistryError, RegistryResult, StateProvider};
use serde::{Deserialize, Serialize};
use serde_with::{base64::Base64, serde_as};

use crate::store::key_successor;

/// Page size used when neither the request nor the caller set one
pub const DEFAULT_LIMIT: u64 = 100;

/// Pagination parameters of a list request
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageRequest {
    /// Resume key returned by a previous page; empty to start from the edge
    #[serde_as(as = "Base64")]
    pub key: Vec<u8>,
    /// Number of entries to skip; only valid without `key`
    pub offset: u64,
    /// Maximum entries in the page; zero selects the default
    pub limit: u64,
    /// Report the number of entries in the range (offset mode only)
    pub count_total: bool,
    /// Walk keys in descending order
    pub reverse: bool,
}

impl PageRequest {
    pub fn with_limit(limit: u64) -> Self {
        Self {
            limit,
            ..Default::default()
        }
    }

    pub fn from_key(key: Vec<u8>, limit: u64) -> Self {
        Self {
            key,
            limit,
            ..Default::default()
        }
    }
}

/// Pagination metadata of a list response
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResponse {
    /// Key to pass as `PageRequest::key` for the next page, absent when exhausted
    #[serde_as(as = "Option<Base64>")]
    pub next_key: Option<Vec<u8>>,
    /// Total entries in the range, when requested
    pub total: Option<u64>,
}

/// Walk one page of `store`, handing each entry to `on_result`.
///
/// Keys are whatever `store` yields; pass a `PrefixStore` to page over a
/// namespace with the prefix stripped.
pub fn paginate<S, F>(
    store: &S,
    request: Option<&PageRequest>,
    default_limit: u64,
    mut on_result: F,
) -> RegistryResult<PageResponse>
where
    S: StateProvider + ?Sized,
    F: FnMut(&[u8], &[u8]) -> RegistryResult<()>,
{
    let request = request.cloned().unwrap_or_default();

    if !request.key.is_empty() && request.offset > 0 {
        return Err(RegistryError::InvalidPagination(
            "either offset or key is expected, got both".into(),
        ));
    }

    let limit = match (request.limit, default_limit) {
        (0, 0) => DEFAULT_LIMIT,
        (0, default) => default,
        (limit, _) => limit,
    };
    let order = if request.reverse {
        IterOrder::Descending
    } else {
        IterOrder::Ascending
    };

    if !request.key.is_empty() {
        let iter = match order {
            IterOrder::Ascending => store.iter_range(Some(request.key.as_slice()), None, order)?,
            IterOrder::Descending => {
                let end = key_successor(&request.key);
                store.iter_range(None, Some(end.as_slice()), order)?
            }
        };

        let mut count = 0u64;
        let mut next_key = None;
        for item in iter {
            let (key, value) = item?;
            if count == limit {
                next_key = Some(key);
                break;
            }
            on_result(&key, &value)?;
            count += 1;
        }

        return Ok(PageResponse {
            next_key,
            total: None,
        });
    }

    let end = request.offset.saturating_add(limit);
    let mut count = 0u64;
    let mut next_key = None;

    for item in store.iter_range(None, None, order)? {
        let (key, value) = item?;
        count += 1;

        if count <= request.offset {
            continue;
        }
        if count <= end {
            on_result(&key, &value)?;
        } else if next_key.is_none() {
            next_key = Some(key);
            if !request.count_total {
                break;
            }
        }
    }

    Ok(PageResponse {
        next_key,
        total: request.count_total.then_some(count),
    })
}
