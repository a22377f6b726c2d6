//! `[build.mapping]` configuration.
//!
//! # Example
//!
//! ```toml
//! [build.mapping]
//! strategy = "legacy"     # multi-site (default) | legacy
//! markers = ["site-sections", "views", "index"]
//! root_alias = "root"     # segment served at `/` instead of `/root`
//! index_view = "index"    # view name when no segment remains
//! site = "root"           # site name reported by legacy mapping
//! ```

use crate::config::{ConfigDiagnostics, FieldPath};
use serde::{Deserialize, Serialize};

/// Which mapping variant converts template locations to URLs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MappingKind {
    /// First segment names the site; it prefixes request and output paths.
    #[default]
    MultiSite,
    /// One fixed site; `root_alias` maps to `/`, `_` becomes `-` in URLs.
    Legacy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingConfig {
    pub strategy: MappingKind,

    /// Path segments dropped before mapping.
    pub markers: Vec<String>,

    /// Segment aliased to the site root.
    pub root_alias: Option<String>,

    /// View name substituted when no segment remains.
    pub index_view: String,

    /// Site name used by the legacy strategy.
    pub site: String,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            strategy: MappingKind::default(),
            markers: vec!["site-sections".into(), "views".into(), "index".into()],
            root_alias: Some("root".into()),
            index_view: "index".into(),
            site: "root".into(),
        }
    }
}

impl MappingConfig {
    pub const FIELD_MARKERS: FieldPath = FieldPath::new("build.mapping.markers");
    pub const FIELD_ROOT_ALIAS: FieldPath = FieldPath::new("build.mapping.root_alias");
    pub const FIELD_INDEX_VIEW: FieldPath = FieldPath::new("build.mapping.index_view");

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.markers.iter().any(|m| m.is_empty() || m.contains('/')) {
            diag.error(
                Self::FIELD_MARKERS,
                "markers must be single, non-empty path segments",
            );
        }
        if let Some(alias) = &self.root_alias
            && (alias.is_empty() || alias.contains('/'))
        {
            diag.error(
                Self::FIELD_ROOT_ALIAS,
                "root alias must be a single, non-empty path segment",
            );
        }
        if self.index_view.is_empty() {
            diag.error(Self::FIELD_INDEX_VIEW, "index view must not be empty");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_mapping_defaults() {
        let config = test_parse_config("");
        let mapping = &config.build.mapping;
        assert_eq!(mapping.strategy, MappingKind::MultiSite);
        assert_eq!(mapping.markers, vec!["site-sections", "views", "index"]);
        assert_eq!(mapping.root_alias.as_deref(), Some("root"));
        assert_eq!(mapping.index_view, "index");
    }

    #[test]
    fn test_mapping_legacy() {
        let config = test_parse_config(
            r#"
[build.mapping]
strategy = "legacy"
site = "main"
"#,
        );
        assert_eq!(config.build.mapping.strategy, MappingKind::Legacy);
        assert_eq!(config.build.mapping.site, "main");
    }

    #[test]
    fn test_mapping_validate() {
        let mapping = MappingConfig {
            markers: vec!["views".into(), "a/b".into()],
            root_alias: Some(String::new()),
            index_view: String::new(),
            ..MappingConfig::default()
        };
        let mut diag = ConfigDiagnostics::new();
        mapping.validate(&mut diag);
        assert_eq!(diag.len(), 3);
    }
}
