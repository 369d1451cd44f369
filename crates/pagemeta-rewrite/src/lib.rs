// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

use async_trait::async_trait;
use pagemeta_core::Metadata;

pub const CRATE_NAME: &str = "pagemeta-rewrite";

mod rewriter;
mod tags;

pub use rewriter::TagRewriter;

#[derive(Debug)]
pub struct RewriteError(pub String);

impl std::fmt::Display for RewriteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for RewriteError {}

/// The head-rewrite seam. Given a serialized HTML document and the merged
/// metadata, returns the document with head tags inserted or updated.
/// Unknown keys are ignored, non-string scalars are coerced to text, and
/// keys the rewriter is not handed leave the template's tags untouched.
#[async_trait]
pub trait HeadRewrite: Send + Sync {
    async fn rewrite(&self, html: &str, metadata: &Metadata) -> Result<String, RewriteError>;
}
