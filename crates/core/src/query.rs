//! Query objects and cursor tokens
//!
//! A `Query` is prepared by the caller and handed to the store unchanged; the
//! engine never interprets it beyond forwarding. Orders use the familiar
//! `"name"` / `"-name"` (descending) notation.
//!
//! A `Cursor` is an opaque resume position produced by the store. It is only
//! meaningful for the query that produced it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::key::Key;

/// Opaque resume position within one query's ordered results
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    /// Wrap a store-encoded token
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Token text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the token text
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Cursor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(Error::invalid_cursor("empty cursor token"));
        }
        Ok(Cursor(s.to_string()))
    }
}

/// Comparison operator of a property filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterOp {
    /// `=`
    Eq,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl FilterOp {
    /// Whether `ordering` (property compared to operand) satisfies this operator
    pub fn accepts(&self, ordering: std::cmp::Ordering) -> bool {
        use std::cmp::Ordering::*;
        match self {
            FilterOp::Eq => ordering == Equal,
            FilterOp::Lt => ordering == Less,
            FilterOp::Le => ordering != Greater,
            FilterOp::Gt => ordering == Greater,
            FilterOp::Ge => ordering != Less,
        }
    }
}

/// Property filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    /// Property name
    pub property: String,
    /// Operator
    pub op: FilterOp,
    /// Operand
    pub value: serde_json::Value,
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Smallest first
    Ascending,
    /// Largest first
    Descending,
}

/// Sort order on one property
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Order {
    /// Property name
    pub property: String,
    /// Direction
    pub direction: Direction,
}

impl Order {
    /// Parse `"name"` (ascending) or `"-name"` (descending)
    pub fn parse(raw: &str) -> Self {
        match raw.strip_prefix('-') {
            Some(property) => Order {
                property: property.to_string(),
                direction: Direction::Descending,
            },
            None => Order {
                property: raw.to_string(),
                direction: Direction::Ascending,
            },
        }
    }
}

/// Query over one entity kind
///
/// # Example
///
/// ```
/// use persist_core::{FilterOp, Key, Query};
///
/// let parent = Key::new("Board", 1, None);
/// let query = Query::new("Post")
///     .ancestor(parent)
///     .filter("votes", FilterOp::Ge, 10)
///     .order("-votes")
///     .order("title")
///     .limit(20);
/// assert_eq!(query.orders().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    kind: String,
    ancestor: Option<Key>,
    filters: Vec<Filter>,
    orders: Vec<Order>,
    start: Option<Cursor>,
    limit: Option<usize>,
}

impl Query {
    /// Query entities of `kind`
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ancestor: None,
            filters: Vec::new(),
            orders: Vec::new(),
            start: None,
            limit: None,
        }
    }

    /// Restrict to descendants of `ancestor` (inclusive)
    pub fn ancestor(mut self, ancestor: Key) -> Self {
        self.ancestor = Some(ancestor);
        self
    }

    /// Add a property filter
    pub fn filter(
        mut self,
        property: impl Into<String>,
        op: FilterOp,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.filters.push(Filter {
            property: property.into(),
            op,
            value: value.into(),
        });
        self
    }

    /// Add a sort order, `"-name"` for descending
    pub fn order(mut self, raw: &str) -> Self {
        self.orders.push(Order::parse(raw));
        self
    }

    /// Resume after `cursor`
    pub fn start(mut self, cursor: Cursor) -> Self {
        self.start = Some(cursor);
        self
    }

    /// Return at most `limit` results
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Kind filter
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Ancestor filter
    pub fn ancestor_key(&self) -> Option<&Key> {
        self.ancestor.as_ref()
    }

    /// Property filters
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// Sort orders, most significant first
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Start cursor
    pub fn start_cursor(&self) -> Option<&Cursor> {
        self.start.as_ref()
    }

    /// Result limit
    pub fn result_limit(&self) -> Option<usize> {
        self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cmp::Ordering;

    #[test]
    fn test_order_parse() {
        assert_eq!(
            Order::parse("name"),
            Order { property: "name".into(), direction: Direction::Ascending }
        );
        assert_eq!(
            Order::parse("-name"),
            Order { property: "name".into(), direction: Direction::Descending }
        );
    }

    #[test]
    fn test_filter_op_accepts() {
        assert!(FilterOp::Eq.accepts(Ordering::Equal));
        assert!(!FilterOp::Eq.accepts(Ordering::Less));
        assert!(FilterOp::Le.accepts(Ordering::Less));
        assert!(FilterOp::Le.accepts(Ordering::Equal));
        assert!(!FilterOp::Gt.accepts(Ordering::Equal));
        assert!(FilterOp::Ge.accepts(Ordering::Greater));
    }

    #[test]
    fn test_builder_accumulates() {
        let parent = Key::new("P", 1, None);
        let cursor: Cursor = "abc".parse().unwrap();
        let query = Query::new("E")
            .ancestor(parent.clone())
            .filter("name", FilterOp::Eq, "a")
            .order("name")
            .start(cursor.clone())
            .limit(4);

        assert_eq!(query.kind(), "E");
        assert_eq!(query.ancestor_key(), Some(&parent));
        assert_eq!(query.filters().len(), 1);
        assert_eq!(query.filters()[0].value, serde_json::json!("a"));
        assert_eq!(query.start_cursor(), Some(&cursor));
        assert_eq!(query.result_limit(), Some(4));
    }

    #[test]
    fn test_empty_cursor_rejected() {
        assert!(matches!("".parse::<Cursor>(), Err(Error::InvalidCursor(_))));
    }
}
