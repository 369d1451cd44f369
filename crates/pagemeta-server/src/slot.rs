// SPDX-License-Identifier: Apache-2.0

use std::sync::{Arc, Mutex, PoisonError};

use pagemeta_core::{MetaError, MetaUpdate, PageMeta};
use serde_json::Value;

/// Per-request metadata slot. The middleware inserts a fresh handle into the
/// request's extensions before the downstream chain runs; the typed extension
/// key keeps the slot isolated from unrelated integrations' state.
#[derive(Debug, Clone, Default)]
pub struct MetaSlot {
    inner: Arc<Mutex<PageMeta>>,
}

impl MetaSlot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, update: MetaUpdate) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .apply(update);
    }

    /// Dynamic entry point: accepts a mapping or `false`, anything else is a
    /// caller contract violation returned to the call site.
    pub fn set_value(&self, value: Value) -> Result<(), MetaError> {
        self.set(MetaUpdate::from_value(value)?);
        Ok(())
    }

    pub fn suppress(&self) {
        self.set(MetaUpdate::Suppress);
    }

    #[must_use]
    pub fn snapshot(&self) -> PageMeta {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
