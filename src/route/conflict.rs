//! Output path collision detection.
//!
//! Crawl tasks write concurrently, so two templates claiming the same output
//! file would race. Collisions are collected up front and reported together.

use std::fmt;
use std::path::PathBuf;

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::log;
use crate::utils::plural_s;

use super::TemplateRoute;

/// Output path -> template sources claiming it.
pub type OutputSourceMap = FxHashMap<PathBuf, Vec<PathBuf>>;

/// Several templates mapped to one output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConflict {
    pub output: PathBuf,
    pub request_path: String,
    pub sources: Vec<PathBuf>,
}

#[derive(Debug, Error)]
pub struct CollisionError {
    pub conflicts: Vec<OutputConflict>,
}

impl fmt::Display for CollisionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} output path{} claimed by more than one template",
            self.conflicts.len(),
            plural_s(self.conflicts.len())
        )?;
        for conflict in &self.conflicts {
            write!(f, "\n{} ({})", conflict.request_path, conflict.output.display())?;
            for source in &conflict.sources {
                write!(f, "\n  - {}", source.display())?;
            }
        }
        Ok(())
    }
}

/// Group route sources by output path.
pub fn collect_output_sources(routes: &[TemplateRoute]) -> OutputSourceMap {
    let mut output_sources = OutputSourceMap::default();
    for route in routes {
        output_sources
            .entry(route.output_path.clone())
            .or_default()
            .push(route.source.clone());
    }
    output_sources
}

/// Find every output path with more than one source, sorted by path.
pub fn detect_conflicts(routes: &[TemplateRoute]) -> Vec<OutputConflict> {
    let request_paths: FxHashMap<_, _> = routes
        .iter()
        .map(|r| (&r.output_path, r.request_path.as_str()))
        .collect();

    let mut conflicts: Vec<_> = collect_output_sources(routes)
        .into_iter()
        .filter(|(_, sources)| sources.len() > 1)
        .map(|(output, mut sources)| {
            sources.sort();
            OutputConflict {
                request_path: request_paths
                    .get(&output)
                    .map(|s| (*s).to_owned())
                    .unwrap_or_default(),
                output,
                sources,
            }
        })
        .collect();

    conflicts.sort_by(|a, b| a.output.cmp(&b.output));
    conflicts
}

/// Fail if any two routes share an output path.
pub fn check_collisions(routes: &[TemplateRoute]) -> Result<(), CollisionError> {
    let conflicts = detect_conflicts(routes);
    if conflicts.is_empty() {
        Ok(())
    } else {
        Err(CollisionError { conflicts })
    }
}

/// Print conflicts using the standard log format.
///
/// ```text
/// [error] output collisions (1 path, 2 sources)
/// [route] /about-us (3 sources)
///   - site-sections/root/views/about_us.html
///   - site-sections/root/views/about-us.html
/// ```
pub fn print_conflicts(conflicts: &[OutputConflict]) {
    if conflicts.is_empty() {
        return;
    }

    let total_sources: usize = conflicts.iter().map(|c| c.sources.len()).sum();
    log!("error"; "output collisions ({} path{}, {} source{})",
        conflicts.len(), plural_s(conflicts.len()),
        total_sources, plural_s(total_sources));

    for conflict in conflicts {
        eprintln!();
        log!("route"; "{} ({} source{})", conflict.request_path,
            conflict.sources.len(), plural_s(conflict.sources.len()));
        for source in &conflict.sources {
            eprintln!("  - {}", source.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MappingConfig, MappingKind};
    use crate::route::MappingStrategy;
    use std::path::Path;

    fn routes(kind: MappingKind, sources: &[&str]) -> Vec<TemplateRoute> {
        let strategy = MappingStrategy::new(&MappingConfig {
            strategy: kind,
            ..MappingConfig::default()
        });
        sources
            .iter()
            .map(|s| strategy.map_template(Path::new(s), Path::new("build")))
            .collect()
    }

    #[test]
    fn test_no_conflicts() {
        let routes = routes(
            MappingKind::MultiSite,
            &["root/index.html", "marketing/index.html", "marketing/pricing.html"],
        );
        assert!(detect_conflicts(&routes).is_empty());
        assert!(check_collisions(&routes).is_ok());
    }

    #[test]
    fn test_legacy_hyphen_underscore_collision() {
        let routes = routes(
            MappingKind::Legacy,
            &["root/about_us.html", "root/about-us.html", "root/team.html"],
        );
        let err = check_collisions(&routes).unwrap_err();

        assert_eq!(err.conflicts.len(), 1);
        let conflict = &err.conflicts[0];
        assert_eq!(conflict.request_path, "/about-us");
        assert_eq!(conflict.output, PathBuf::from("build/about-us/index.html"));
        assert_eq!(
            conflict.sources,
            vec![
                PathBuf::from("root/about-us.html"),
                PathBuf::from("root/about_us.html")
            ]
        );
        assert!(err.to_string().contains("1 output path claimed"));
    }

    #[test]
    fn test_nested_index_collides_with_flat_view() {
        let routes = routes(
            MappingKind::MultiSite,
            &["marketing/pricing.html", "marketing/pricing/index.html"],
        );
        let conflicts = detect_conflicts(&routes);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].request_path, "/marketing/pricing");
    }
}
