//! `[package]` section configuration.
//!
//! Controls how the output tree is archived once the crawl completes.
//!
//! # Example
//!
//! ```toml
//! [package]
//! enable = true
//! metadata = "deployment.json"    # JSON file whose `name` field names the package
//! default_name = "project"        # used when `name` is missing
//! extension = "zip"
//! command = ["zip", "-r", "-q", "$PRERENDER_ARCHIVE", "$PRERENDER_OUTPUT_DIR"]
//! ```
//!
//! The archive is written to the project root as
//! `<name>_build_<month>_<day>_<year>_<unix>.<extension>`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::{ConfigDiagnostics, FieldPath};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageConfig {
    /// Produce an archive at all.
    pub enable: bool,

    /// Project metadata file (relative to project root, `~` expanded).
    pub metadata: PathBuf,

    /// Project identifier when metadata has no name.
    pub default_name: String,

    /// Archive file extension.
    pub extension: String,

    /// Archival command.
    pub command: Vec<String>,
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            enable: true,
            metadata: "deployment.json".into(),
            default_name: "project".into(),
            extension: "zip".into(),
            command: vec![
                "zip".into(),
                "-r".into(),
                "-q".into(),
                "$PRERENDER_ARCHIVE".into(),
                "$PRERENDER_OUTPUT_DIR".into(),
            ],
        }
    }
}

impl PackageConfig {
    pub const FIELD_COMMAND: FieldPath = FieldPath::new("package.command");
    pub const FIELD_EXTENSION: FieldPath = FieldPath::new("package.extension");
    pub const FIELD_DEFAULT_NAME: FieldPath = FieldPath::new("package.default_name");

    /// Extension with any leading dot removed.
    pub fn extension(&self) -> &str {
        self.extension.trim_start_matches('.')
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.extension().is_empty() {
            diag.error(Self::FIELD_EXTENSION, "archive extension must not be empty");
        }
        if self.default_name.trim().is_empty() {
            diag.error(Self::FIELD_DEFAULT_NAME, "default name must not be empty");
        }
        if self.enable && self.command.is_empty() {
            diag.error_with_hint(
                Self::FIELD_COMMAND,
                "archival command must not be empty",
                "set `package.enable = false` to skip packaging",
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_package_defaults() {
        let config = test_parse_config("");
        assert!(config.package.enable);
        assert_eq!(config.package.metadata, PathBuf::from("deployment.json"));
        assert_eq!(config.package.default_name, "project");
        assert_eq!(config.package.extension(), "zip");
        assert_eq!(config.package.command[0], "zip");
    }

    #[test]
    fn test_package_custom() {
        let config = test_parse_config(
            r#"
[package]
extension = ".tar.gz"
command = ["tar", "-czf", "$PRERENDER_ARCHIVE", "$PRERENDER_OUTPUT_DIR"]
"#,
        );
        assert_eq!(config.package.extension(), "tar.gz");
        assert_eq!(config.package.command[0], "tar");
    }

    #[test]
    fn test_package_validate() {
        let mut config = test_parse_config("");
        config.package.command.clear();
        config.package.default_name = " ".into();

        let mut diag = ConfigDiagnostics::new();
        config.package.validate(&mut diag);
        assert_eq!(diag.len(), 2);

        config.package.enable = false;
        let mut diag = ConfigDiagnostics::new();
        config.package.validate(&mut diag);
        assert_eq!(diag.len(), 1);
    }
}
