// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::sync::Arc;

use axum::http::{header, HeaderMap};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteKind {
    Page,
    Fallback,
    Endpoint,
    Redirect,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteDefinition {
    pub kind: RouteKind,
    pub pattern: String,
}

impl RouteDefinition {
    #[must_use]
    pub fn new(kind: RouteKind, pattern: &str) -> Self {
        Self {
            kind,
            pattern: pattern.to_string(),
        }
    }
}

#[derive(Debug)]
#[non_exhaustive]
pub enum ClassifyError {
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },
    Unavailable,
}

impl fmt::Display for ClassifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPattern { pattern, source } => {
                write!(f, "invalid route pattern {pattern}: {source}")
            }
            Self::Unavailable => write!(f, "route table was never published"),
        }
    }
}

impl std::error::Error for ClassifyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidPattern { source, .. } => Some(source),
            Self::Unavailable => None,
        }
    }
}

#[derive(Debug)]
struct CompiledRoutes {
    patterns: Vec<Regex>,
}

impl CompiledRoutes {
    fn matched(&self, path: &str) -> Option<&str> {
        self.patterns
            .iter()
            .find(|regex| regex.is_match(path))
            .map(Regex::as_str)
    }
}

type Shared = Option<Arc<CompiledRoutes>>;

/// Single-producer, many-consumer cell for the route table. The table
/// becomes available once routes are finalized; requests arriving earlier
/// suspend on it.
#[must_use]
pub fn route_table() -> (RoutePublisher, RouteTable) {
    let (tx, rx) = watch::channel(None);
    (RoutePublisher { tx }, RouteTable { rx })
}

#[derive(Debug)]
pub struct RoutePublisher {
    tx: watch::Sender<Shared>,
}

impl RoutePublisher {
    /// Write-once: consumes the publisher. Only page and fallback routes are
    /// kept; endpoints and redirects never become eligible.
    pub fn publish(self, routes: &[RouteDefinition]) -> Result<(), ClassifyError> {
        let mut patterns = Vec::new();
        for route in routes {
            if !matches!(route.kind, RouteKind::Page | RouteKind::Fallback) {
                continue;
            }
            let regex =
                Regex::new(&route.pattern).map_err(|source| ClassifyError::InvalidPattern {
                    pattern: route.pattern.clone(),
                    source,
                })?;
            patterns.push(regex);
        }
        let _ = self.tx.send(Some(Arc::new(CompiledRoutes { patterns })));
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct RouteTable {
    rx: watch::Receiver<Shared>,
}

impl RouteTable {
    /// Suspends until the table is published. A publisher dropped without
    /// publishing surfaces as an error rather than a silent deadlock.
    pub async fn matched(&self, path: &str) -> Result<Option<String>, ClassifyError> {
        let mut rx = self.rx.clone();
        let table = rx
            .wait_for(Option::is_some)
            .await
            .map_err(|_| ClassifyError::Unavailable)?
            .clone();
        let table = table.ok_or(ClassifyError::Unavailable)?;
        Ok(table.matched(path).map(str::to_string))
    }
}

#[derive(Debug, Clone)]
pub enum Classifier {
    Routes(RouteTable),
    ContentType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Eligibility {
    Skip,
    Page { route_pattern: Option<String> },
}

impl Classifier {
    pub(crate) async fn classify(
        &self,
        path: &str,
        headers: &HeaderMap,
    ) -> Result<Eligibility, ClassifyError> {
        match self {
            Self::Routes(table) => Ok(match table.matched(path).await? {
                Some(pattern) => Eligibility::Page {
                    route_pattern: Some(pattern),
                },
                None => Eligibility::Skip,
            }),
            Self::ContentType => Ok(if is_html(headers) {
                Eligibility::Page {
                    route_pattern: None,
                }
            } else {
                Eligibility::Skip
            }),
        }
    }
}

fn is_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|media| media.trim().eq_ignore_ascii_case("text/html"))
}
