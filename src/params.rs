//! Captured path parameters.
//!
//! The matcher produces a fresh [`Params`] map per request. It travels with
//! the [`Request`](crate::Request) as a plain value: no globals, no
//! thread-locals, nothing shared between requests but the route tree.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::pattern::Kind;

/// A coerced parameter value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Int(i64),
    Uint(u64),
    Float(f64),
    Str(String),
}

impl Value {
    /// Parses `raw` as `kind`. `None` if the text is not a valid base-10
    /// value of that width. Unsigned values take no sign at all, not even `+`.
    pub(crate) fn coerce(kind: Kind, raw: &str) -> Option<Self> {
        match kind {
            Kind::Static | Kind::String | Kind::Path => Some(Self::Str(raw.to_owned())),
            Kind::Int   => raw.parse().ok().map(Self::Int),
            Kind::Uint if raw.starts_with('+') => None,
            Kind::Uint  => raw.parse().ok().map(Self::Uint),
            Kind::Float => raw.parse().ok().map(Self::Float),
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Uint(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v)   => write!(f, "{v}"),
            Self::Uint(v)  => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Str(v)   => f.write_str(v),
        }
    }
}

/// One captured parameter.
#[derive(Clone, Debug, PartialEq)]
pub struct ParamInfo {
    pub(crate) value: Value,
    pub(crate) raw: String,
    pub(crate) name: String,
    pub(crate) kind: Kind,
    pub(crate) offset: usize,
}

impl ParamInfo {
    pub fn value(&self) -> &Value { &self.value }

    /// The path text the value was parsed from.
    pub fn raw(&self) -> &str { &self.raw }

    pub fn name(&self) -> &str { &self.name }
    pub fn kind(&self) -> Kind { self.kind }

    /// Zero-based index of the path segment the capture starts at. For
    /// `/users/{id uint}` matched against `/users/42` this is `1`.
    pub fn offset(&self) -> usize { self.offset }
}

/// Read-only parameters of one request, keyed by capture name.
///
/// Cloning is one `Arc` increment; [`Params::shadow`] copies the map so the
/// original is never touched.
#[derive(Clone, Debug, Default)]
pub struct Params(Arc<HashMap<String, ParamInfo>>);

impl Params {
    pub fn get(&self, name: &str) -> Option<&ParamInfo> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize { self.0.len() }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = &ParamInfo> {
        self.0.values()
    }

    /// A copy of `self` where `name` is replaced by the string `value`.
    /// Returns `None` if `name` was never captured.
    pub(crate) fn shadow(&self, name: &str, value: &str) -> Option<Self> {
        let offset = self.0.get(name)?.offset;
        let mut map = HashMap::clone(&self.0);
        map.insert(name.to_owned(), ParamInfo {
            value: Value::Str(value.to_owned()),
            raw: value.to_owned(),
            name: name.to_owned(),
            kind: Kind::String,
            offset,
        });
        Some(Self(Arc::new(map)))
    }
}

/// Accumulates captures during a single match.
#[derive(Default)]
pub(crate) struct ParamsBuilder(HashMap<String, ParamInfo>);

impl ParamsBuilder {
    pub(crate) fn push(&mut self, name: &str, kind: Kind, raw: &str, offset: usize, value: Value) {
        self.0.insert(name.to_owned(), ParamInfo {
            value,
            raw: raw.to_owned(),
            name: name.to_owned(),
            kind,
            offset,
        });
    }

    pub(crate) fn finish(self) -> Params {
        Params(Arc::new(self.0))
    }
}
