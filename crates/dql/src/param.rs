//! Parameter table bound alongside the DQL text.

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::{self, Display};

/// Parameter key: positional (`?1`) or named (`:name`).
///
/// Positional indices are `u32`. Integer literals passed where an
/// `Into<ParamKey>` is expected need the suffix (`1u32`), since several
/// conversions are in scope; `ParamKey::Positional(1)` also works.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ParamKey {
    Positional(u32),
    Named(String),
}

impl Display for ParamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamKey::Positional(idx) => write!(f, "?{}", idx),
            ParamKey::Named(name) => write!(f, ":{}", name),
        }
    }
}

impl From<u32> for ParamKey {
    fn from(idx: u32) -> Self {
        ParamKey::Positional(idx)
    }
}

impl From<&str> for ParamKey {
    fn from(name: &str) -> Self {
        ParamKey::Named(name.to_string())
    }
}

impl From<String> for ParamKey {
    fn from(name: String) -> Self {
        ParamKey::Named(name)
    }
}

impl From<&ParamKey> for ParamKey {
    fn from(key: &ParamKey) -> Self {
        key.clone()
    }
}

/// Parameter values keyed by [`ParamKey`].
///
/// Setting an existing key overwrites its value. A stored `Value::Null` is
/// still present: `get` returns `Some(&Value::Null)` for it and `None` only
/// for keys that were never set.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Parameters {
    values: BTreeMap<ParamKey, Value>,
}

impl Parameters {
    /// Create an empty parameter table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store or overwrite a parameter.
    pub fn set(&mut self, key: impl Into<ParamKey>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// Look up a parameter.
    pub fn get(&self, key: impl Into<ParamKey>) -> Option<&Value> {
        self.values.get(&key.into())
    }

    /// Check if a key has been set.
    pub fn contains(&self, key: impl Into<ParamKey>) -> bool {
        self.values.contains_key(&key.into())
    }

    /// Remove a parameter, returning its value if it was set.
    pub fn remove(&mut self, key: impl Into<ParamKey>) -> Option<Value> {
        self.values.remove(&key.into())
    }

    /// Number of stored parameters.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate parameters in key order (positional first, then named).
    pub fn iter(&self) -> impl Iterator<Item = (&ParamKey, &Value)> {
        self.values.iter()
    }

    /// Return a copy merged with `overrides`; overrides win on collision.
    pub fn merged(&self, overrides: &Parameters) -> Parameters {
        let mut merged = self.clone();
        merged.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged
    }

    /// Clear all parameters.
    pub fn clear(&mut self) {
        self.values.clear();
    }
}

impl<K: Into<ParamKey>, V: Into<Value>> Extend<(K, V)> for Parameters {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.set(key, value);
        }
    }
}

impl<K: Into<ParamKey>, V: Into<Value>> FromIterator<(K, V)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Parameters::new();
        params.extend(iter);
        params
    }
}
