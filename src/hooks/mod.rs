//! Asset pipeline hook.
//!
//! The pipeline starts right after the workspace reset and runs as its own
//! task. [`AssetOrdering`] decides where the build waits for it:
//!
//! | Ordering         | Waited on                        |
//! |------------------|----------------------------------|
//! | `before-crawl`   | before the first route is fetched|
//! | `before-archive` | after the crawl, before packaging|
//! | `detached`       | never                            |

mod runner;

pub use runner::{ARCHIVE_VAR, HookInvocation, build_prerender_vars, resolve_args, run_command};

use anyhow::Result;
use tokio::task::JoinHandle;

use crate::config::{AssetOrdering, SiteConfig};
use crate::log;

/// Result of the asset pipeline as seen by the build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetStatus {
    /// No pipeline configured.
    Inactive,
    Succeeded,
    Failed(String),
    /// Detached and not finished when the build ended.
    Running,
}

/// Handle to the running asset pipeline.
pub struct AssetTask {
    name: String,
    ordering: AssetOrdering,
    handle: Option<JoinHandle<Result<()>>>,
    status: Option<AssetStatus>,
}

impl AssetTask {
    /// Start the configured pipeline on the current runtime.
    pub fn spawn(config: &SiteConfig) -> Self {
        let hook = &config.hooks.assets;
        let ordering = config.hooks.ordering;
        let name = hook.display_name().to_owned();

        if !hook.is_active() {
            return Self {
                name,
                ordering,
                handle: None,
                status: Some(AssetStatus::Inactive),
            };
        }

        let invocation = HookInvocation::new(hook, config);
        let handle = tokio::spawn(async move { invocation.run("assets").await });

        Self {
            name,
            ordering,
            handle: Some(handle),
            status: None,
        }
    }

    /// Wait for the pipeline if `point` is where the ordering says to.
    pub async fn wait_at(&mut self, point: AssetOrdering) -> Option<AssetStatus> {
        if self.ordering != point || point == AssetOrdering::Detached {
            return None;
        }
        Some(self.wait().await)
    }

    /// Wait for the pipeline to exit. Failures are logged, never returned.
    pub async fn wait(&mut self) -> AssetStatus {
        if let Some(status) = &self.status {
            return status.clone();
        }
        let Some(handle) = self.handle.take() else {
            return AssetStatus::Inactive;
        };

        let status = match handle.await {
            Ok(Ok(())) => AssetStatus::Succeeded,
            Ok(Err(e)) => AssetStatus::Failed(format!("{e:#}")),
            Err(e) => AssetStatus::Failed(e.to_string()),
        };
        if let AssetStatus::Failed(reason) = &status {
            log!("assets"; "`{}` failed: {}", self.name, reason);
        }
        self.status = Some(status.clone());
        status
    }

    /// Status without waiting.
    pub async fn status(&mut self) -> AssetStatus {
        match &self.handle {
            Some(handle) if !handle.is_finished() => AssetStatus::Running,
            _ => self.wait().await,
        }
    }
}
