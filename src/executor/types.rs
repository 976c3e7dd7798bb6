use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// The kind of data-parallel operation applied to a chunk.
///
/// Serialized as `"map"`, `"filter"` or `"reduce"`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum OpKind {
    Map,
    Filter,
    Reduce,
}

impl OpKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpKind::Map => "map",
            OpKind::Filter => "filter",
            OpKind::Reduce => "reduce",
        }
    }

    /// Checks that a worker's answer for a chunk of `chunk_len` elements has the
    /// shape this operation produces.
    ///
    /// Map keeps the length, filter can only shrink it, reduce yields one value.
    pub fn accepts(&self, chunk_len: usize, result: &Value) -> bool {
        match (self, result) {
            (OpKind::Map, Value::Array(items)) => items.len() == chunk_len,
            (OpKind::Filter, Value::Array(items)) => items.len() <= chunk_len,
            (OpKind::Reduce, _) => true,
            _ => false,
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One chunk of work sent to a worker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecuteRequest {
    pub op: OpKind,
    /// Name of a function registered on the worker.
    pub function: String,
    pub chunk: Vec<Value>,
}

/// A worker's answer. Exactly one of the two fields is set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecuteResponse {
    pub result: Option<Value>,
    pub error: Option<String>,
}

impl ExecuteResponse {
    pub fn ok(result: Value) -> Self {
        Self {
            result: Some(result),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            result: None,
            error: Some(error.into()),
        }
    }
}
