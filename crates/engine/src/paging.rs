//! Request paging helpers
//!
//! Transport-free versions of the two read endpoints an application usually
//! builds on top of the engine: a paged listing driven by `limit` /
//! `pageToken` request parameters, and a single-instance fetch that tolerates
//! entities which were never stored.
//!
//! Errors keep their kind. `Error::is_client_error` tells a transport layer
//! whether to answer 400 or 500.

use persist_core::{Cursor, Entity, Error, Query, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::access::EntityAccess;
use crate::config::EngineConfig;

/// Raw paging parameters of a request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Requested page size, unparsed
    #[serde(default)]
    pub limit: Option<String>,
    /// Token returned with the previous page
    #[serde(default, rename = "pageToken")]
    pub page_token: Option<String>,
}

impl PageRequest {
    /// Request for the first page of `limit` entities
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit.to_string()),
            page_token: None,
        }
    }

    /// Same request continuing from `token`
    pub fn next(mut self, token: impl Into<String>) -> Self {
        self.page_token = Some(token.into());
        self
    }

    /// Effective page size
    ///
    /// Absent or empty limits use `default_page_size`; larger limits are
    /// clamped to `max_page_size`.
    ///
    /// # Errors
    ///
    /// `Error::InvalidArgument` when the limit is not a non-negative integer.
    pub fn page_size(&self, config: &EngineConfig) -> Result<usize> {
        match self.limit.as_deref().map(str::trim) {
            None | Some("") => Ok(config.default_page_size),
            Some(raw) => raw
                .parse::<usize>()
                .map(|n| n.min(config.max_page_size))
                .map_err(|e| Error::invalid_argument(format!("invalid limit '{}': {}", raw, e))),
        }
    }

    /// Resume cursor, if the request carries one
    pub fn cursor(&self) -> Result<Option<Cursor>> {
        match self.page_token.as_deref() {
            None | Some("") => Ok(None),
            Some(token) => token.parse().map(Some),
        }
    }
}

/// One page of results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResponse<E> {
    /// Token for the next page
    #[serde(rename = "PageToken")]
    pub page_token: String,
    /// Entities on this page
    #[serde(rename = "Response")]
    pub response: Vec<E>,
}

/// Fetch the page of `query` described by `request`
pub fn fetch_page<A, E>(
    access: &A,
    query: &Query,
    request: &PageRequest,
    config: &EngineConfig,
) -> Result<PageResponse<E>>
where
    A: EntityAccess + ?Sized,
    E: Entity + DeserializeOwned,
{
    let size = request.page_size(config)?;
    let query = match request.cursor()? {
        Some(cursor) => query.clone().start(cursor),
        None => query.clone(),
    };

    let mut response = Vec::new();
    let page = access.fetch_n(&query, &mut response, size)?;
    Ok(PageResponse {
        page_token: page.cursor.into_string(),
        response,
    })
}

/// Load `entity` if it names a stored entity
///
/// An entity whose derived key is incomplete was never stored and is returned
/// as is. `Putter` hooks run during key derivation either way.
pub fn get_instance<A, E>(access: &A, mut entity: E) -> Result<E>
where
    A: EntityAccess + ?Sized,
    E: Entity + DeserializeOwned,
{
    let key = access.key_for(&mut entity)?;
    if key.is_incomplete() {
        return Ok(entity);
    }
    access.get(&key, &mut entity)?;
    Ok(entity)
}
