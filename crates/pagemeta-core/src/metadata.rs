use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{value_kind, MetaError};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata(BTreeMap<String, Value>);

impl Metadata {
    #[must_use]
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Shallow union with `other`'s keys winning on collision.
    #[must_use]
    pub fn union(mut self, other: Self) -> Self {
        self.0.extend(other.0);
        self
    }

    pub fn from_value(value: Value) -> Result<Self, MetaError> {
        match value {
            Value::Object(map) => Ok(Self(map.into_iter().collect())),
            other => Err(MetaError::InvalidMetadata {
                actual: value_kind(&other),
            }),
        }
    }
}

impl From<BTreeMap<String, Value>> for Metadata {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, Value)> for Metadata {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MetaUpdate {
    Suppress,
    Values(Metadata),
}

impl MetaUpdate {
    pub fn from_value(value: Value) -> Result<Self, MetaError> {
        match value {
            Value::Bool(false) => Ok(Self::Suppress),
            Value::Object(map) => Ok(Self::Values(Metadata(map.into_iter().collect()))),
            other => Err(MetaError::InvalidMetadata {
                actual: value_kind(&other),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum PageMeta {
    #[default]
    Unset,
    Suppressed,
    Values(Metadata),
}

impl PageMeta {
    /// Suppression replaces wholesale; values accumulate last-call-wins per
    /// key. A prior sentinel counts as no prior mapping.
    pub fn apply(&mut self, update: MetaUpdate) {
        match update {
            MetaUpdate::Suppress => *self = Self::Suppressed,
            MetaUpdate::Values(new) => {
                let merged = match std::mem::take(self) {
                    Self::Values(prev) => prev.union(new),
                    Self::Unset | Self::Suppressed => new,
                };
                *self = Self::Values(merged);
            }
        }
    }
}
