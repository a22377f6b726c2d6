//! Route discovery: template tree to request and output paths.
//!
//! ```text
//! enumerate (scan) -> map_file (mapper) -> check_collisions (conflict)
//! ```

pub mod conflict;
pub mod mapper;
pub mod pattern;
pub mod scan;

pub use conflict::{CollisionError, check_collisions, print_conflicts};
pub use mapper::MappingStrategy;
pub use scan::{ScanError, TemplateFile, enumerate};

use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;

use crate::config::SiteConfig;

/// One route per template file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateRoute {
    /// Template path relative to the project root.
    pub source: PathBuf,
    /// Path queried against the render server; always starts with `/`.
    pub request_path: String,
    /// File the rendered body is written to.
    pub output_path: PathBuf,
    /// Site section the route belongs to.
    pub site: String,
    /// View name within the site.
    pub view: String,
}

/// Enumerate, map and collision-check every route of the project.
///
/// Nothing here touches the network; any error is fatal for the build.
pub fn discover(config: &SiteConfig) -> Result<Vec<TemplateRoute>> {
    let strategy = MappingStrategy::from_build(&config.build);
    let files = enumerate(config)?;

    let routes: Vec<_> = files
        .iter()
        .map(|file| strategy.map_file(file, config.output_dir()))
        .collect();

    check_collisions(&routes)?;
    Ok(routes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config_at;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &std::path::Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn test_discover_maps_routes() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "site-sections/root/views/index.html");
        touch(dir.path(), "site-sections/marketing/views/pricing/index.html");
        touch(dir.path(), "site-sections/root/views/partials/footer.html");

        let config = test_config_at(dir.path(), "");
        let routes = discover(&config).unwrap();

        let paths: Vec<_> = routes.iter().map(|r| r.request_path.as_str()).collect();
        assert_eq!(paths, vec!["/marketing/pricing", "/"]);
        assert_eq!(
            routes[1].output_path,
            dir.path().join("build").join("index.html")
        );
    }

    #[test]
    fn test_discover_with_custom_template_root() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "sections/marketing/views/pricing.html");
        touch(dir.path(), "sections/root/views/index.html");

        let config = test_config_at(dir.path(), "[build]\ntemplates = [\"sections\"]");
        let routes = discover(&config).unwrap();

        let paths: Vec<_> = routes.iter().map(|r| r.request_path.as_str()).collect();
        assert_eq!(paths, vec!["/marketing/pricing", "/"]);
        assert_eq!(routes[0].site, "marketing");
        assert_eq!(
            routes[0].source,
            std::path::PathBuf::from("sections/marketing/views/pricing.html")
        );
        assert_eq!(
            routes[0].output_path,
            dir.path().join("build/marketing/pricing/index.html")
        );
    }

    #[test]
    fn test_discover_reports_collisions() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "site-sections/root/views/about_us.html");
        touch(dir.path(), "site-sections/root/views/about-us.html");

        let config = test_config_at(dir.path(), "[build.mapping]\nstrategy = \"legacy\"");
        let err = discover(&config).unwrap_err();
        assert!(err.downcast_ref::<CollisionError>().is_some());
    }

    #[test]
    fn test_discover_missing_templates_root() {
        let dir = TempDir::new().unwrap();
        let config = test_config_at(dir.path(), "");
        let err = discover(&config).unwrap_err();
        assert!(err.downcast_ref::<ScanError>().is_some());
    }
}
