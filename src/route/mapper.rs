//! Template location to route mapping.
//!
//! Pure and deterministic: no filesystem access. Both variants share the
//! same first steps:
//!
//! 1. strip the template extension
//! 2. split into path segments
//! 3. drop marker segments (`site-sections`, `views`, `index`)
//!
//! Mapping works on the path below the template root the file was found
//! under, so the root's own directory names never reach the URL.
//!
//! | Template (relative to template root) | Multi-site           | Legacy               |
//! |--------------------------------------|----------------------|----------------------|
//! | `root/views/index.html`              | `/`                  | `/`                  |
//! | `marketing/views/pricing/index.html` | `/marketing/pricing` | `/marketing/pricing` |
//! | `root/views/about_us.html`           | `/about_us`          | `/about-us`          |
//!
//! The output path always mirrors the request path under the output root
//! and ends in `index.html`, so distinct request paths give distinct files.

use std::path::{Component, Path, PathBuf};

use crate::config::{BuildSectionConfig, MappingConfig, MappingKind};

use super::TemplateRoute;
use super::scan::TemplateFile;

/// File written for every request path.
pub const INDEX_FILE: &str = "index.html";

/// Mapping variant, selected once per build.
#[derive(Debug, Clone)]
pub struct MappingStrategy {
    kind: MappingKind,
    markers: Vec<String>,
    root_alias: Option<String>,
    index_view: String,
    site: String,
}

impl MappingStrategy {
    pub fn new(mapping: &MappingConfig) -> Self {
        Self {
            kind: mapping.strategy,
            markers: mapping.markers.clone(),
            root_alias: mapping.root_alias.clone(),
            index_view: mapping.index_view.clone(),
            site: mapping.site.clone(),
        }
    }

    pub fn from_build(build: &BuildSectionConfig) -> Self {
        Self::new(&build.mapping)
    }

    /// Map an enumerated file; the route keeps its project-relative source.
    pub fn map_file(&self, file: &TemplateFile, output_root: &Path) -> TemplateRoute {
        TemplateRoute {
            source: file.source.clone(),
            ..self.map_template(&file.relative, output_root)
        }
    }

    /// Map a template path (relative to its template root) to its route.
    pub fn map_template(&self, source: &Path, output_root: &Path) -> TemplateRoute {
        let segments = self.segments(source);

        let (site, url_segments, view_segments) = match self.kind {
            MappingKind::MultiSite => self.multi_site(segments),
            MappingKind::Legacy => self.legacy(segments),
        };

        let view = if view_segments.is_empty() {
            self.index_view.clone()
        } else {
            view_segments.join("/")
        };

        let request_path = format!("/{}", url_segments.join("/"));
        let output_path = output_path(output_root, &url_segments);

        TemplateRoute {
            source: source.to_path_buf(),
            request_path,
            output_path,
            site,
            view,
        }
    }

    /// Extension-stripped segments with markers removed.
    fn segments(&self, source: &Path) -> Vec<String> {
        source
            .with_extension("")
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                _ => None,
            })
            .filter(|s| !self.markers.iter().any(|m| m == s))
            .collect()
    }

    fn is_root_alias(&self, segment: &str) -> bool {
        self.root_alias.as_deref() == Some(segment)
    }

    fn root_site(&self) -> String {
        self.root_alias.clone().unwrap_or_else(|| self.site.clone())
    }

    /// First segment names the site and prefixes the URL, unless it is the
    /// root alias, which serves from `/`.
    fn multi_site(&self, segments: Vec<String>) -> (String, Vec<String>, Vec<String>) {
        let Some((first, rest)) = segments.split_first() else {
            return (self.root_site(), Vec::new(), Vec::new());
        };

        if self.is_root_alias(first) {
            return (first.clone(), rest.to_vec(), rest.to_vec());
        }

        let (site, view) = (first.clone(), rest.to_vec());
        (site, segments, view)
    }

    /// Fixed site; a leading root alias is dropped and `_` becomes `-` in
    /// the URL only.
    fn legacy(&self, mut segments: Vec<String>) -> (String, Vec<String>, Vec<String>) {
        if segments.first().is_some_and(|s| self.is_root_alias(s)) {
            segments.remove(0);
        }

        let url = segments.iter().map(|s| s.replace('_', "-")).collect();
        (self.site.clone(), url, segments)
    }
}

fn output_path(output_root: &Path, url_segments: &[String]) -> PathBuf {
    let mut path = output_root.to_path_buf();
    path.extend(url_segments);
    path.push(INDEX_FILE);
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strategy(kind: MappingKind) -> MappingStrategy {
        MappingStrategy::new(&MappingConfig {
            strategy: kind,
            ..MappingConfig::default()
        })
    }

    fn map(kind: MappingKind, source: &str) -> TemplateRoute {
        strategy(kind).map_template(Path::new(source), Path::new("/out"))
    }

    #[test]
    fn test_root_index_maps_to_slash() {
        for kind in [MappingKind::MultiSite, MappingKind::Legacy] {
            let route = map(kind, "root/index.html");
            assert_eq!(route.request_path, "/");
            assert_eq!(route.output_path, PathBuf::from("/out/index.html"));
            assert_eq!(route.site, "root");
            assert_eq!(route.view, "index");
        }
    }

    #[test]
    fn test_site_prefix_and_nested_index() {
        let route = map(MappingKind::MultiSite, "marketing/pricing/index.html");
        assert_eq!(route.request_path, "/marketing/pricing");
        assert_eq!(
            route.output_path,
            PathBuf::from("/out/marketing/pricing/index.html")
        );
        assert_eq!(route.site, "marketing");
        assert_eq!(route.view, "pricing");
    }

    #[test]
    fn test_markers_dropped_from_full_path() {
        let route = map(
            MappingKind::MultiSite,
            "site-sections/marketing/views/pricing/index.html",
        );
        assert_eq!(route.request_path, "/marketing/pricing");
        assert_eq!(route.source, PathBuf::from("site-sections/marketing/views/pricing/index.html"));

        let route = map(MappingKind::MultiSite, "site-sections/blog/views/index.html");
        assert_eq!(route.request_path, "/blog");
        assert_eq!(route.site, "blog");
        assert_eq!(route.view, "index");
    }

    #[test]
    fn test_multi_site_root_alias_serves_from_slash() {
        let route = map(MappingKind::MultiSite, "site-sections/root/views/about_us.html");
        assert_eq!(route.request_path, "/about_us");
        assert_eq!(route.output_path, PathBuf::from("/out/about_us/index.html"));
        assert_eq!(route.site, "root");
        assert_eq!(route.view, "about_us");
    }

    #[test]
    fn test_legacy_underscores_in_url_only() {
        let route = map(MappingKind::Legacy, "site-sections/root/views/about_us/team_page.html");
        assert_eq!(route.request_path, "/about-us/team-page");
        assert_eq!(
            route.output_path,
            PathBuf::from("/out/about-us/team-page/index.html")
        );
        assert_eq!(route.view, "about_us/team_page");
        assert_eq!(route.site, "root");
    }

    #[test]
    fn test_legacy_keeps_non_alias_first_segment() {
        let route = map(MappingKind::Legacy, "site-sections/careers/views/open_roles.html");
        assert_eq!(route.request_path, "/careers/open-roles");
        assert_eq!(route.site, "root");
        assert_eq!(route.view, "careers/open_roles");
    }

    #[test]
    fn test_everything_dropped_yields_index_view() {
        let route = map(MappingKind::MultiSite, "site-sections/views/index.html");
        assert_eq!(route.request_path, "/");
        assert_eq!(route.view, "index");
        assert_eq!(route.site, "root");
    }

    #[test]
    fn test_without_root_alias() {
        let strategy = MappingStrategy::new(&MappingConfig {
            root_alias: None,
            ..MappingConfig::default()
        });
        let route = strategy.map_template(Path::new("root/index.html"), Path::new("out"));
        assert_eq!(route.request_path, "/root");
        assert_eq!(route.output_path, PathBuf::from("out/root/index.html"));
    }

    #[test]
    fn test_map_file_ignores_template_root() {
        let file = TemplateFile {
            source: PathBuf::from("app/sections/marketing/views/pricing.html"),
            relative: PathBuf::from("marketing/views/pricing.html"),
        };
        let route = strategy(MappingKind::MultiSite).map_file(&file, Path::new("/out"));
        assert_eq!(route.request_path, "/marketing/pricing");
        assert_eq!(route.site, "marketing");
        assert_eq!(route.view, "pricing");
        assert_eq!(route.source, file.source);
    }

    #[test]
    fn test_request_path_always_absolute() {
        let strategy = strategy(MappingKind::MultiSite);
        for source in ["a.html", "a/b/c.html", "views/index.html"] {
            let route = strategy.map_template(Path::new(source), Path::new("out"));
            assert!(route.request_path.starts_with('/'), "{source}");
        }
    }
}
