//! Record types and the JSON payloads exchanged with the Grist API.
//!
//! # Design
//! Column values are left as `serde_json::Value`; the client does not model
//! a table's schema. The `*Body` / `New*` types exist only to give the wire
//! format a single definition shared by request building and parsing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Column name to cell value for one row.
pub type Fields = serde_json::Map<String, Value>;

/// One row of a Grist table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Record {
    pub id: i64,
    pub fields: Fields,
}

/// Restricts `get_records` to rows whose column values are in an allow-list.
///
/// Values within one column are OR-ed; columns are AND-ed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Filter(BTreeMap<String, Vec<Value>>);

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept rows whose `column` equals any of `values`.
    pub fn column<I, V>(mut self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.0
            .insert(column.to_string(), values.into_iter().map(Into::into).collect());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &[Value])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

impl From<BTreeMap<String, Vec<Value>>> for Filter {
    fn from(map: BTreeMap<String, Vec<Value>>) -> Self {
        Filter(map)
    }
}

/// `{"records": [...]}` envelope used by the records endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordsBody<T> {
    pub records: Vec<T>,
}

/// Row sent by `patch_records`.
#[derive(Debug, Clone, Serialize)]
pub struct RecordUpdate<'a> {
    pub id: i64,
    pub fields: &'a Fields,
}

/// Row sent by `add_records`; the server assigns the id.
#[derive(Debug, Clone, Serialize)]
pub struct NewRecord<'a> {
    pub fields: &'a Fields,
}

/// Row returned by `add_records`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RecordId {
    pub id: i64,
}

/// Row returned by the SQL endpoint; only `fields` is kept.
#[derive(Debug, Clone, Deserialize)]
pub struct SqlRecord {
    pub fields: Fields,
}

/// Body of `POST /docs/{doc_id}/sql`.
#[derive(Debug, Clone, Serialize)]
pub struct SqlRequest<'a> {
    pub sql: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<&'a Value>,
    /// Milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}
