//! `[hooks]` section configuration.
//!
//! The asset pipeline (scripts, styles, images) is an external command that
//! starts right after the workspace reset and runs alongside the crawl.
//!
//! # Example
//!
//! ```toml
//! [hooks]
//! ordering = "before-archive"   # before-crawl | before-archive | detached
//!
//! [hooks.assets]
//! command = ["npm", "run", "build-assets"]
//! quiet = false
//! ```
//!
//! Commands support `$PRERENDER_*` variable substitution.

use serde::{Deserialize, Serialize};

/// When the build waits for the asset pipeline.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum AssetOrdering {
    /// Wait before the crawl starts.
    BeforeCrawl,
    /// Crawl alongside the pipeline, wait before packaging.
    #[default]
    BeforeArchive,
    /// Never wait: assets may or may not make it into the package.
    Detached,
}

/// Hooks configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HooksConfig {
    /// Asset pipeline command.
    pub assets: HookConfig,
    /// Ordering between the asset pipeline and the build.
    pub ordering: AssetOrdering,
}

/// Configuration for a single external command.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HookConfig {
    /// Whether this hook is enabled (default: true).
    pub enable: bool,

    /// Display name for logging (defaults to command[0]).
    pub name: Option<String>,

    /// Command and arguments to execute.
    pub command: Vec<String>,

    /// Suppress output (default: true).
    pub quiet: bool,
}

impl Default for HookConfig {
    fn default() -> Self {
        Self {
            enable: true,
            name: None,
            command: Vec::new(),
            quiet: true,
        }
    }
}

impl HookConfig {
    /// Get the display name for this hook.
    ///
    /// Returns `name` if set, otherwise falls back to `command[0]`.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .unwrap_or_else(|| self.command.first().map(String::as_str).unwrap_or("hook"))
    }

    /// Enabled with a command to run.
    pub fn is_active(&self) -> bool {
        self.enable && !self.command.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_hooks_defaults() {
        let config = test_parse_config("");
        assert!(!config.hooks.assets.is_active());
        assert_eq!(config.hooks.ordering, AssetOrdering::BeforeArchive);
    }

    #[test]
    fn test_assets_hook() {
        let config = test_parse_config(
            r#"
[hooks]
ordering = "detached"

[hooks.assets]
command = ["npm", "run", "build-assets"]
"#,
        );
        let hook = &config.hooks.assets;
        assert!(hook.is_active());
        assert_eq!(hook.display_name(), "npm");
        assert!(hook.quiet);
        assert_eq!(config.hooks.ordering, AssetOrdering::Detached);
    }

    #[test]
    fn test_disabled_hook_is_inactive() {
        let config = test_parse_config(
            r#"
[hooks.assets]
enable = false
name = "assets"
command = ["gulp"]
"#,
        );
        assert!(!config.hooks.assets.is_active());
        assert_eq!(config.hooks.assets.display_name(), "assets");
    }
}
