#![forbid(unsafe_code)]

pub const CRATE_NAME: &str = "pagemeta-core";

mod defaults;
mod error;
mod metadata;
mod resolve;

pub use defaults::{BoxError, Defaults, DefaultsFn};
pub use error::MetaError;
pub use metadata::{MetaUpdate, Metadata, PageMeta};
pub use resolve::{resolve, Resolution};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub route_pattern: Option<String>,
}

impl RequestContext {
    #[must_use]
    pub fn for_path(path: &str) -> Self {
        Self {
            method: "GET".to_string(),
            path: path.to_string(),
            query: None,
            route_pattern: None,
        }
    }
}
