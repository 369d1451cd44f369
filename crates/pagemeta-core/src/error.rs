use std::fmt;

use crate::defaults::BoxError;

#[derive(Debug)]
#[non_exhaustive]
pub enum MetaError {
    InvalidMetadata { actual: &'static str },
    DefaultsNotObject { actual: &'static str },
    DefaultsFailed(BoxError),
}

impl MetaError {
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidMetadata { .. } => "InvalidMetadata",
            Self::DefaultsNotObject { .. } => "DefaultsNotObject",
            Self::DefaultsFailed(_) => "DefaultsFailed",
        }
    }
}

impl fmt::Display for MetaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidMetadata { actual } => {
                write!(f, "data must be an object or false, got {actual}")
            }
            Self::DefaultsNotObject { actual } => {
                write!(f, "defaults function must return an object, got {actual}")
            }
            Self::DefaultsFailed(source) => write!(f, "defaults function failed: {source}"),
        }
    }
}

impl std::error::Error for MetaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::DefaultsFailed(source) => Some(source.as_ref()),
            _ => None,
        }
    }
}

#[must_use]
pub(crate) fn value_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
