//! Route template discovery.
//!
//! Walks every template root, keeps files with the template extension and
//! drops anything matching an exclusion pattern. The result is sorted and
//! deduplicated so repeated runs see routes in the same order.
//!
//! Each file carries two paths: `source` (relative to the project root,
//! used to load the template) and `relative` (relative to the template root
//! it was found under, used for mapping).

use std::path::{Path, PathBuf};

use jwalk::WalkDir;
use thiserror::Error;

use crate::config::SiteConfig;
use crate::utils::path::to_slash;

use super::pattern::{ExcludeSet, PatternError};

const IGNORED_FILES: &[&str] = &[".DS_Store"];

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("template root `{0}` is not a directory")]
    MissingRoot(PathBuf),

    #[error("failed to list templates under `{root}`")]
    Walk {
        root: PathBuf,
        #[source]
        source: jwalk::Error,
    },

    #[error(transparent)]
    Pattern(#[from] PatternError),
}

/// A template file found under one of the template roots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateFile {
    /// Relative to the project root.
    pub source: PathBuf,
    /// Relative to the template root.
    pub relative: PathBuf,
}

/// Enumerate route templates for the configured project.
pub fn enumerate(config: &SiteConfig) -> Result<Vec<TemplateFile>, ScanError> {
    enumerate_in(
        config.get_root(),
        &config.build.templates,
        config.build.extension(),
        &config.build.exclude,
    )
}

/// Enumerate templates under `roots` (relative to `project_root`).
///
/// A file reachable from several roots is kept once, under the first root
/// listed.
pub fn enumerate_in(
    project_root: &Path,
    roots: &[PathBuf],
    extension: &str,
    exclude: &[String],
) -> Result<Vec<TemplateFile>, ScanError> {
    let exclude = ExcludeSet::new(exclude)?;
    let mut found = Vec::new();

    for root in roots {
        let abs_root = project_root.join(root);
        if !abs_root.is_dir() {
            return Err(ScanError::MissingRoot(abs_root));
        }

        for entry in WalkDir::new(&abs_root).sort(true) {
            let entry = entry.map_err(|source| ScanError::Walk {
                root: abs_root.clone(),
                source,
            })?;

            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if IGNORED_FILES.contains(&name.as_ref()) {
                continue;
            }

            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(extension) {
                continue;
            }

            let source = path.strip_prefix(project_root).unwrap_or(&path).to_path_buf();
            if exclude.is_excluded(&to_slash(&source)) {
                continue;
            }
            let relative = path.strip_prefix(&abs_root).unwrap_or(&path).to_path_buf();
            found.push(TemplateFile { source, relative });
        }
    }

    // Stable sort: among duplicates the first root's entry stays first.
    found.sort_by(|a, b| a.source.cmp(&b.source));
    found.dedup_by(|later, first| later.source == first.source);
    Ok(found)
}
