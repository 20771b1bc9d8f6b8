//! Query evaluation for `MemoryStore`
//!
//! Results are materialized when the query is run: kind and ancestor
//! (inclusive) select candidates, filters are checked against the decoded
//! properties, entities missing an order property are dropped, and the rest
//! are sorted by the query's orders with the key as the final tie-breaker.
//! The tie-breaker makes the order total, which is what lets a cursor anchor
//! identify a unique position.

use std::cmp::Ordering;
use std::collections::{BTreeMap, VecDeque};

use persist_core::{Codec, Cursor, Direction, Key, Order, Query, QueryIterator, Record, Result};
use serde_json::Value;

use crate::cursor::{Anchor, CursorPosition};
use crate::stored_record::StoredRecord;

/// A query result with its sort values
#[derive(Debug, Clone)]
pub(crate) struct Candidate {
    pub key: Key,
    pub record: Record,
    pub values: Vec<Value>,
}

/// Total order over JSON property values
///
/// Values of different types order by type: null, bool, number, string,
/// array, object.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }

    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => match (x.as_u64(), y.as_u64()) {
                (Some(x), Some(y)) => x.cmp(&y),
                _ => {
                    let x = x.as_f64().unwrap_or(f64::NAN);
                    let y = y.as_f64().unwrap_or(f64::NAN);
                    x.partial_cmp(&y).unwrap_or(Ordering::Equal)
                }
            },
        },
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => {
            for (l, r) in x.iter().zip(y.iter()) {
                let ord = compare_values(l, r);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            x.len().cmp(&y.len())
        }
        (Value::Object(x), Value::Object(y)) => x.len().cmp(&y.len()).then_with(|| {
            Value::Object(x.clone())
                .to_string()
                .cmp(&Value::Object(y.clone()).to_string())
        }),
        _ => rank(a).cmp(&rank(b)),
    }
}

/// Property lookup; `.` separates nested fields
fn property<'a>(props: &'a Value, name: &str) -> Option<&'a Value> {
    name.split('.').try_fold(props, |v, segment| v.get(segment))
}

/// Compare two positions in a query's result order
fn compare_positions(orders: &[Order], a: (&[Value], &Key), b: (&[Value], &Key)) -> Ordering {
    for (i, order) in orders.iter().enumerate() {
        let ord = compare_values(&a.0[i], &b.0[i]);
        let ord = match order.direction {
            Direction::Ascending => ord,
            Direction::Descending => ord.reverse(),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.1.cmp(b.1)
}

/// Select, filter and sort the results of `query`
pub(crate) fn evaluate(
    query: &Query,
    codec: Codec,
    data: &BTreeMap<Key, StoredRecord>,
) -> Result<Vec<Candidate>> {
    let needs_properties = !query.filters().is_empty() || !query.orders().is_empty();
    let mut candidates = Vec::new();

    'entities: for (key, stored) in data {
        if key.kind() != query.kind() {
            continue;
        }
        if let Some(ancestor) = query.ancestor_key() {
            if !key.has_ancestor(ancestor) {
                continue;
            }
        }

        let mut values = Vec::with_capacity(query.orders().len());
        if needs_properties {
            let props = codec.decode_properties(stored.record())?;

            for filter in query.filters() {
                match property(&props, &filter.property) {
                    Some(v) if filter.op.accepts(compare_values(v, &filter.value)) => {}
                    _ => continue 'entities,
                }
            }

            for order in query.orders() {
                match property(&props, &order.property) {
                    Some(v) => values.push(v.clone()),
                    None => continue 'entities,
                }
            }
        }

        candidates.push(Candidate {
            key: key.clone(),
            record: stored.record().clone(),
            values,
        });
    }

    let orders = query.orders();
    candidates.sort_by(|a, b| compare_positions(orders, (&a.values, &a.key), (&b.values, &b.key)));
    Ok(candidates)
}

/// Iterator over materialized query results
pub(crate) struct MemoryQueryIter {
    query: Query,
    pending: VecDeque<Candidate>,
    position: CursorPosition,
}

impl MemoryQueryIter {
    /// Apply the start cursor and limit of `query` to `candidates`
    pub(crate) fn new(query: &Query, candidates: Vec<Candidate>) -> Result<Self> {
        let position = match query.start_cursor() {
            Some(cursor) => CursorPosition::decode(cursor, query)?,
            None => CursorPosition::start_of(query)?,
        };

        let orders = query.orders();
        let mut pending: VecDeque<Candidate> = match position.anchor() {
            Some(anchor) => candidates
                .into_iter()
                .filter(|c| {
                    compare_positions(orders, (&c.values, &c.key), (&anchor.values, &anchor.key))
                        == Ordering::Greater
                })
                .collect(),
            None => candidates.into(),
        };
        if let Some(limit) = query.result_limit() {
            pending.truncate(limit);
        }

        Ok(Self {
            query: query.clone(),
            pending,
            position,
        })
    }
}

impl QueryIterator for MemoryQueryIter {
    fn next_record(&mut self) -> Result<Option<(Key, Record)>> {
        let Some(candidate) = self.pending.pop_front() else {
            return Ok(None);
        };
        let anchor = Anchor {
            values: candidate.values,
            key: candidate.key.clone(),
        };
        self.position = CursorPosition::after(&self.query, anchor)?;
        Ok(Some((candidate.key, candidate.record)))
    }

    fn cursor(&self) -> Result<Cursor> {
        self.position.encode()
    }
}
