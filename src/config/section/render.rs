//! `[render]` section configuration.
//!
//! Tells the templating engine where layouts and partials live.
//!
//! # Example
//!
//! ```toml
//! [render]
//! layouts = "base/base-views/layouts"
//! layout = "default"                   # wrap every view; "" renders views bare
//! partials = ["base/base-views/partials", "site-sections/*/views/partials"]
//! data_extension = "json"              # per-view data sidecar: `pricing.json` next to `pricing.html`
//! ```
//!
//! Partial directories under a site section are also registered under
//! `<site>/<partial>` so templates can include them by short name.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::{ConfigDiagnostics, FieldPath};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Layout templates directory.
    pub layouts: PathBuf,

    /// Default layout name (file stem under `layouts`); empty disables layouts.
    pub layout: String,

    /// Partial directories; a single `*` segment matches one directory level.
    pub partials: Vec<String>,

    /// Extension of the JSON data file bound to each view.
    pub data_extension: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            layouts: "base/base-views/layouts".into(),
            layout: "default".into(),
            partials: vec![
                "base/base-views/partials".into(),
                "site-sections/*/views/partials".into(),
            ],
            data_extension: "json".into(),
        }
    }
}

impl RenderConfig {
    pub const FIELD_LAYOUT: FieldPath = FieldPath::new("render.layout");
    pub const FIELD_DATA_EXTENSION: FieldPath = FieldPath::new("render.data_extension");

    /// Default layout, if views are wrapped in one.
    pub fn layout(&self) -> Option<&str> {
        let layout = self.layout.trim();
        (!layout.is_empty()).then_some(layout)
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.layout.contains('/') {
            diag.error_with_hint(
                Self::FIELD_LAYOUT,
                "layout must be a file stem, not a path",
                "put the layout file directly under `render.layouts`",
            );
        }
        if self.data_extension.trim_start_matches('.').is_empty() {
            diag.error(Self::FIELD_DATA_EXTENSION, "data extension must not be empty");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_render_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.render.layout(), Some("default"));
        assert_eq!(config.render.partials.len(), 2);
        assert_eq!(config.render.data_extension, "json");
    }

    #[test]
    fn test_render_without_layout() {
        let config = test_parse_config(
            r#"
[render]
layouts = "layouts"
layout = ""
partials = []
"#,
        );
        assert_eq!(config.render.layouts, PathBuf::from("layouts"));
        assert_eq!(config.render.layout(), None);
        assert!(config.render.partials.is_empty());
    }

    #[test]
    fn test_render_validate_layout_path() {
        let mut config = test_parse_config("");
        config.render.layout = "nested/default".into();
        let mut diag = ConfigDiagnostics::new();
        config.render.validate(&mut diag);
        assert_eq!(diag.len(), 1);
    }
}
