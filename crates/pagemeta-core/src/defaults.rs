use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{value_kind, MetaError};
use crate::metadata::Metadata;
use crate::RequestContext;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub type DefaultsFn = dyn Fn(&RequestContext) -> Result<Value, BoxError> + Send + Sync;

#[derive(Clone)]
pub enum Defaults {
    Static(Metadata),
    Compute(Arc<DefaultsFn>),
}

impl Defaults {
    #[must_use]
    pub fn compute<F>(f: F) -> Self
    where
        F: Fn(&RequestContext) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        Self::Compute(Arc::new(f))
    }

    /// Invoked exactly once per request. Never yields the suppression
    /// sentinel; any non-mapping outcome is fatal for the request.
    pub fn resolve(&self, ctx: &RequestContext) -> Result<Metadata, MetaError> {
        match self {
            Self::Static(meta) => Ok(meta.clone()),
            Self::Compute(f) => match f(ctx).map_err(MetaError::DefaultsFailed)? {
                Value::Object(map) => Ok(map.into_iter().collect()),
                other => Err(MetaError::DefaultsNotObject {
                    actual: value_kind(&other),
                }),
            },
        }
    }
}

impl Default for Defaults {
    fn default() -> Self {
        Self::Static(Metadata::new())
    }
}

impl fmt::Debug for Defaults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(meta) => f.debug_tuple("Static").field(meta).finish(),
            Self::Compute(_) => f.write_str("Compute(..)"),
        }
    }
}
