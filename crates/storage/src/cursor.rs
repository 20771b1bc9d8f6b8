//! Cursor tokens
//!
//! A token records where a query's iteration stopped: the sort values and key
//! of the last result handed out, or nothing when no result was handed out
//! yet. Resuming skips every result that sorts at or before that anchor, so
//! consecutive pages never overlap or leave gaps even when entities are added
//! between fetches.
//!
//! The token also carries a fingerprint of the query shape (kind, ancestor,
//! filters, orders). Presenting a token to a different query fails with
//! `Error::InvalidCursor`.
//!
//! Encoding: URL-safe base64 (no padding) of the JSON-serialized position.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use persist_core::{Cursor, Error, Key, Query, Result};
use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64;

/// Last result handed out by an iterator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    /// Values of the query's order properties, most significant first
    pub values: Vec<serde_json::Value>,
    /// Key of the result
    pub key: Key,
}

/// Decoded cursor token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CursorPosition {
    fingerprint: u64,
    after: Option<Anchor>,
}

impl CursorPosition {
    /// Position before the first result of `query`
    pub fn start_of(query: &Query) -> Result<Self> {
        Ok(Self {
            fingerprint: fingerprint(query)?,
            after: None,
        })
    }

    /// Position just after `anchor` in `query`
    pub fn after(query: &Query, anchor: Anchor) -> Result<Self> {
        Ok(Self {
            fingerprint: fingerprint(query)?,
            after: Some(anchor),
        })
    }

    /// Anchor to resume after, `None` for the start of the results
    pub fn anchor(&self) -> Option<&Anchor> {
        self.after.as_ref()
    }

    /// Encode into an opaque token
    pub fn encode(&self) -> Result<Cursor> {
        let json = serde_json::to_vec(self)?;
        Ok(Cursor::new(URL_SAFE_NO_PAD.encode(json)))
    }

    /// Decode a token and check it belongs to `query`
    pub fn decode(cursor: &Cursor, query: &Query) -> Result<Self> {
        let bytes = URL_SAFE_NO_PAD
            .decode(cursor.as_str())
            .map_err(|e| Error::invalid_cursor(format!("not a cursor token: {}", e)))?;
        let position: CursorPosition = serde_json::from_slice(&bytes)
            .map_err(|e| Error::invalid_cursor(format!("not a cursor token: {}", e)))?;
        if position.fingerprint != fingerprint(query)? {
            return Err(Error::invalid_cursor(
                "cursor was produced by a different query",
            ));
        }
        if let Some(anchor) = &position.after {
            if anchor.values.len() != query.orders().len() {
                return Err(Error::invalid_cursor("cursor does not match query orders"));
            }
        }
        Ok(position)
    }
}

/// Hash of everything that determines a query's result order
///
/// Start cursor and limit are excluded: they select a window, not an order.
fn fingerprint(query: &Query) -> Result<u64> {
    let shape = serde_json::to_vec(&(
        query.kind(),
        query.ancestor_key(),
        query.filters(),
        query.orders(),
    ))?;
    Ok(xxh3_64(&shape))
}
