//! Per-route outcomes and the aggregate build report.

use std::path::PathBuf;

use thiserror::Error;

use crate::route::TemplateRoute;

/// Why a single route was not written.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("request failed")]
    Fetch(#[source] reqwest::Error),

    #[error("render server answered {0}")]
    Status(reqwest::StatusCode),

    #[error("failed to create `{}`", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write `{}`", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    Written { bytes: usize },
    Failed { reason: String },
}

impl RouteOutcome {
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }

    /// Flatten an error chain into a one-line reason.
    pub fn from_error(err: &TaskError) -> Self {
        let mut reason = err.to_string();
        let mut source = std::error::Error::source(err);
        while let Some(cause) = source {
            reason.push_str(": ");
            reason.push_str(&cause.to_string());
            source = cause.source();
        }
        Self::Failed { reason }
    }

    pub const fn is_written(&self) -> bool {
        matches!(self, Self::Written { .. })
    }
}

#[derive(Debug, Clone)]
pub struct RouteReport {
    pub route: TemplateRoute,
    pub outcome: RouteOutcome,
}

/// Outcome of every route in the crawl, in route order.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub routes: Vec<RouteReport>,
}

impl BuildReport {
    pub fn written(&self) -> impl Iterator<Item = &RouteReport> {
        self.routes.iter().filter(|r| r.outcome.is_written())
    }

    pub fn failed(&self) -> impl Iterator<Item = &RouteReport> {
        self.routes.iter().filter(|r| !r.outcome.is_written())
    }

    pub fn written_count(&self) -> usize {
        self.written().count()
    }

    pub fn failed_count(&self) -> usize {
        self.failed().count()
    }

    pub fn has_failures(&self) -> bool {
        self.failed().next().is_some()
    }

    pub fn total_bytes(&self) -> usize {
        self.routes
            .iter()
            .map(|r| match r.outcome {
                RouteOutcome::Written { bytes } => bytes,
                RouteOutcome::Failed { .. } => 0,
            })
            .sum()
    }
}
