//! `[build]` section configuration.
//!
//! Contains route discovery, output and failure-policy settings.
//!
//! # Example
//!
//! ```toml
//! [build]
//! output = "build"                    # Static output tree (relative to project root)
//! templates = ["site-sections"]       # Template roots scanned for routes
//! extension = "html"                  # Template file extension
//! exclude = ["**/layouts/**", "**/partials/**", "**/error.*"]
//! policy = "best-effort"              # best-effort | fail-fast
//!
//! [build.mapping]
//! strategy = "multi-site"             # multi-site | legacy
//! markers = ["site-sections", "views", "index"]
//! root_alias = "root"
//! ```
//!
//! See [`mapping`] for the path mapping options.

mod mapping;

pub use mapping::{MappingConfig, MappingKind};

use crate::config::{ConfigDiagnostics, FieldPath};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How per-route failures affect the rest of the crawl.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Failed routes are logged and skipped; siblings and packaging proceed.
    #[default]
    BestEffort,
    /// The first failed route aborts the remaining routes and the build.
    FailFast,
}

impl FailurePolicy {
    pub const fn is_fail_fast(self) -> bool {
        matches!(self, Self::FailFast)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSectionConfig {
    /// Static output tree.
    pub output: PathBuf,

    /// Template roots scanned for route templates.
    pub templates: Vec<PathBuf>,

    /// Template file extension (without leading dot).
    pub extension: String,

    /// Glob patterns (relative to project root) excluded from routing.
    pub exclude: Vec<String>,

    /// Batch failure policy.
    pub policy: FailurePolicy,

    /// Template location to URL mapping.
    pub mapping: MappingConfig,
}

impl Default for BuildSectionConfig {
    fn default() -> Self {
        Self {
            output: "build".into(),
            templates: vec!["site-sections".into()],
            extension: "html".into(),
            exclude: vec![
                "**/layouts/**".into(),
                "**/partials/**".into(),
                "**/error.*".into(),
            ],
            policy: FailurePolicy::default(),
            mapping: MappingConfig::default(),
        }
    }
}

impl BuildSectionConfig {
    pub const FIELD_TEMPLATES: FieldPath = FieldPath::new("build.templates");
    pub const FIELD_EXTENSION: FieldPath = FieldPath::new("build.extension");
    pub const FIELD_OUTPUT: FieldPath = FieldPath::new("build.output");

    /// Extension with any leading dot removed.
    pub fn extension(&self) -> &str {
        self.extension.trim_start_matches('.')
    }

    /// Validate build configuration.
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.templates.is_empty() {
            diag.error_with_hint(
                Self::FIELD_TEMPLATES,
                "at least one template root is required",
                "templates = [\"site-sections\"]",
            );
        }
        if self.extension().is_empty() {
            diag.error(Self::FIELD_EXTENSION, "template extension must not be empty");
        }
        if self.output.as_os_str().is_empty() {
            diag.error(Self::FIELD_OUTPUT, "output directory must not be empty");
        }
        self.mapping.validate(diag);
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;

    use super::*;

    #[test]
    fn test_build_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.build.output, PathBuf::from("build"));
        assert_eq!(config.build.templates, vec![PathBuf::from("site-sections")]);
        assert_eq!(config.build.extension(), "html");
        assert_eq!(config.build.policy, FailurePolicy::BestEffort);
        assert_eq!(config.build.exclude.len(), 3);
    }

    #[test]
    fn test_build_overrides() {
        let config = test_parse_config(
            r#"
[build]
output = "dist"
templates = ["base", "sections"]
extension = ".hbs"
exclude = ["**/_*"]
policy = "fail-fast"
"#,
        );
        assert_eq!(config.build.output, PathBuf::from("dist"));
        assert_eq!(config.build.templates.len(), 2);
        assert_eq!(config.build.extension(), "hbs");
        assert_eq!(config.build.exclude, vec!["**/_*"]);
        assert!(config.build.policy.is_fail_fast());
    }

    #[test]
    fn test_build_validate_empty_fields() {
        let mut config = test_parse_config("");
        config.build.templates.clear();
        config.build.extension = ".".into();

        let mut diag = ConfigDiagnostics::new();
        config.build.validate(&mut diag);
        assert_eq!(diag.len(), 2);
    }
}
