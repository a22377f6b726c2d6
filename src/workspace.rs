//! Workspace reset before a build.
//!
//! Removes archives left by earlier builds (`*_build_*.<ext>` in the project
//! root) and the whole output tree. Missing targets are not an error, so
//! resetting twice is the same as resetting once.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::SiteConfig;
use crate::debug;
use crate::package::BUILD_MARKER;

/// What a reset removed.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ResetSummary {
    pub archives: Vec<PathBuf>,
    pub output_removed: bool,
}

pub fn reset(config: &SiteConfig) -> Result<ResetSummary> {
    let archives = remove_archives(config.get_root(), config.package.extension())?;
    let output_removed = remove_tree(config.output_dir())?;
    Ok(ResetSummary {
        archives,
        output_removed,
    })
}

/// Delete `*_build_*.<extension>` files directly under `root`.
fn remove_archives(root: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(e).with_context(|| format!("failed to read {}", root.display()));
        }
    };

    let suffix = format!(".{extension}");
    let mut removed = Vec::new();
    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if !is_archive_name(name, &suffix) || !entry.path().is_file() {
            continue;
        }

        let path = entry.path();
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!("reset"; "removed {}", name);
                removed.push(path);
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(e).with_context(|| format!("failed to remove {}", path.display()));
            }
        }
    }
    removed.sort();
    Ok(removed)
}

fn is_archive_name(name: &str, suffix: &str) -> bool {
    name.strip_suffix(suffix)
        .and_then(|stem| stem.find(BUILD_MARKER))
        .is_some_and(|at| at > 0)
}

fn remove_tree(path: &Path) -> Result<bool> {
    match fs::remove_dir_all(path) {
        Ok(()) => {
            debug!("reset"; "cleared {}", path.display());
            Ok(true)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => {
            Err(e).with_context(|| format!("failed to clear output directory: {}", path.display()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config_at;
    use tempfile::TempDir;

    #[test]
    fn test_is_archive_name() {
        assert!(is_archive_name("acme_build_5_15_2024_1718461845.zip", ".zip"));
        assert!(is_archive_name("project_build_0_2_2024_1.tar.gz", ".tar.gz"));
        assert!(!is_archive_name("acme_build_5_15_2024_1718461845.tar", ".zip"));
        assert!(!is_archive_name("_build_.zip", ".zip"));
        assert!(!is_archive_name("release.zip", ".zip"));
    }

    #[test]
    fn test_reset_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("build/marketing")).unwrap();
        fs::write(root.join("build/marketing/index.html"), "old").unwrap();
        fs::write(root.join("site_build_0_1_1970_0.zip"), "").unwrap();
        fs::write(root.join("keep.zip"), "").unwrap();
        fs::write(root.join("site_build_notes.txt"), "").unwrap();
        let config = test_config_at(root, "");

        let first = reset(&config).unwrap();
        assert!(first.output_removed);
        assert_eq!(first.archives, vec![root.join("site_build_0_1_1970_0.zip")]);
        assert!(!root.join("build").exists());
        assert!(root.join("keep.zip").exists());
        assert!(root.join("site_build_notes.txt").exists());

        let second = reset(&config).unwrap();
        assert_eq!(second, ResetSummary::default());
    }
}
