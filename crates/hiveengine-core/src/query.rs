//! Query builders for contract table lookups.
//!
//! Hive Engine tables are queried with Mongo-style documents:
//! `{"account": "hive-engine", "_id": {"$gt": 10}}`.

use serde_json::{Map, Value};

/// Comparison operators.
pub struct Cond;

impl Cond {
    pub fn gt(value: impl Into<Value>) -> Value {
        op("$gt", value.into())
    }

    pub fn gte(value: impl Into<Value>) -> Value {
        op("$gte", value.into())
    }

    pub fn lt(value: impl Into<Value>) -> Value {
        op("$lt", value.into())
    }

    pub fn lte(value: impl Into<Value>) -> Value {
        op("$lte", value.into())
    }

    pub fn ne(value: impl Into<Value>) -> Value {
        op("$ne", value.into())
    }

    pub fn in_list<I, V>(values: I) -> Value
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        op("$in", Value::Array(values.into_iter().map(Into::into).collect()))
    }

    pub fn nin<I, V>(values: I) -> Value
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        op("$nin", Value::Array(values.into_iter().map(Into::into).collect()))
    }
}

fn op(name: &str, value: Value) -> Value {
    let mut m = Map::new();
    m.insert(name.to_string(), value);
    Value::Object(m)
}

/// Builder for a query document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    fields: Map<String, Value>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Match `field` against `value`; `value` may be a [`Cond`] document.
    pub fn field(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Build a query from `(field, value)` pairs.
    pub fn match_fields<K, V, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        pairs
            .into_iter()
            .fold(Self::new(), |q, (k, v)| q.field(k, v))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

impl From<Query> for Value {
    fn from(q: Query) -> Self {
        q.into_value()
    }
}

/// Restrict `query` to rows after the cursor `last_id`.
///
/// An existing `_id` operator document is kept and gets `$gt` added; a plain
/// `_id` equality (or no `_id`) is replaced by `{"$gt": last_id}`. A
/// non-object query is treated as empty.
pub fn with_last_id(query: Value, last_id: Value) -> Value {
    let mut fields = match query {
        Value::Object(m) => m,
        _ => Map::new(),
    };
    match fields.get_mut("_id") {
        Some(Value::Object(existing)) => {
            existing.insert("$gt".into(), last_id);
        }
        _ => {
            fields.insert("_id".into(), Cond::gt(last_id));
        }
    }
    Value::Object(fields)
}
