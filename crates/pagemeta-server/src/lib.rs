// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

use std::sync::Arc;

use axum::Router;

pub const CRATE_NAME: &str = "pagemeta-server";

mod classify;
mod middleware;
mod slot;

pub use classify::{
    route_table, Classifier, ClassifyError, RouteDefinition, RouteKind, RoutePublisher, RouteTable,
};
pub use pagemeta_core::{
    resolve, BoxError, Defaults, DefaultsFn, MetaError, MetaUpdate, Metadata, PageMeta,
    RequestContext, Resolution,
};
pub use pagemeta_rewrite::{HeadRewrite, RewriteError, TagRewriter};
pub use slot::MetaSlot;

#[derive(Clone)]
pub struct PagemetaState {
    pub(crate) defaults: Defaults,
    pub(crate) classifier: Classifier,
    pub(crate) rewriter: Arc<dyn HeadRewrite>,
}

impl PagemetaState {
    #[must_use]
    pub fn new(defaults: Defaults, classifier: Classifier) -> Self {
        Self {
            defaults,
            classifier,
            rewriter: Arc::new(TagRewriter),
        }
    }

    #[must_use]
    pub fn with_rewriter(mut self, rewriter: Arc<dyn HeadRewrite>) -> Self {
        self.rewriter = rewriter;
        self
    }
}

/// Layers the response-interception middleware outermost ("post" order): it
/// sees the final response of the downstream chain and establishes the
/// per-request metadata slot on the way in.
#[must_use]
pub fn attach(router: Router, state: PagemetaState) -> Router {
    router.layer(axum::middleware::from_fn_with_state(
        state,
        middleware::pagemeta_middleware,
    ))
}
