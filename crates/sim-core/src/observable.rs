//! Read-only state inspection.
//!
//! A model answers queries about its internal state by dotted path. Queries
//! never change model state, so a test can inspect a model between any two
//! clock edges without perturbing the run.

use std::collections::BTreeMap;
use std::fmt;

/// A state value returned from a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Single signal or flag.
    Bool(bool),
    /// Narrow bus field (opcode, param, size, source, mask).
    U8(u8),
    /// Counter or beat count.
    U32(u32),
    /// Address or counter.
    U64(u64),
    /// Data word; formatted as a full-width hex word.
    Word(u64),
    /// Symbolic value (decoded opcode names and similar).
    Text(String),
}

impl Value {
    /// Numeric view of the value, if it has one.
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Value::Bool(v) => Some(u64::from(v)),
            Value::U8(v) => Some(u64::from(v)),
            Value::U32(v) => Some(u64::from(v)),
            Value::U64(v) | Value::Word(v) => Some(v),
            Value::Text(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{}", u8::from(*v)),
            Value::U8(v) => write!(f, "{v:#04x}"),
            Value::U32(v) => write!(f, "{v}"),
            Value::U64(v) => write!(f, "{v:#x}"),
            Value::Word(v) => write!(f, "{v:#018x}"),
            Value::Text(v) => f.write_str(v),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Value::U8(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::U32(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::U64(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_owned())
    }
}

/// A model whose state can be inspected by path.
pub trait Observable {
    /// Query one property, e.g. `beats_remaining` or `d.data`.
    ///
    /// Returns `None` for paths the model does not recognise.
    fn query(&self, path: &str) -> Option<Value>;

    /// The fixed set of paths accepted by [`Observable::query`].
    ///
    /// Models may accept further dynamic paths (such as memory reads) that
    /// are not listed here.
    fn query_paths(&self) -> &'static [&'static str];

    /// Every fixed path with its current value, in path order.
    fn snapshot(&self) -> BTreeMap<&'static str, Value> {
        self.query_paths()
            .iter()
            .filter_map(|&path| self.query(path).map(|v| (path, v)))
            .collect()
    }
}
