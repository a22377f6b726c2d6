//! Build finalizer: archive the output tree.
//!
//! The archive lands in the project root as
//!
//! ```text
//! <project>_build_<month>_<day>_<year>_<unix>.<ext>
//! ```
//!
//! where `<month>` counts from 0 (January is `0`) and the date is UTC.
//! `<project>` comes from the metadata file's `name` field, read once.

mod metadata;

pub use metadata::read_project_name;

use std::fmt;
use std::path::PathBuf;

use anyhow::Result;
use thiserror::Error;

use crate::config::{HookConfig, SiteConfig};
use crate::hooks::{ARCHIVE_VAR, build_prerender_vars, run_command};
use crate::log;
use crate::utils::date::DateTimeUtc;

/// Marker between project name and date in archive names.
pub const BUILD_MARKER: &str = "_build_";

#[derive(Debug, Error)]
pub enum FinalizeError {
    #[error("archival command `{command}` failed")]
    Archive {
        command: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Timestamped archive file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveName {
    pub project: String,
    pub date: DateTimeUtc,
    pub extension: String,
}

impl ArchiveName {
    pub fn new(project: impl Into<String>, date: DateTimeUtc, extension: &str) -> Self {
        Self {
            project: project.into(),
            date,
            extension: extension.trim_start_matches('.').to_owned(),
        }
    }
}

impl fmt::Display for ArchiveName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{BUILD_MARKER}{}_{}_{}_{}.{}",
            self.project,
            self.date.month.saturating_sub(1),
            self.date.day,
            self.date.year,
            self.date.unix,
            self.extension
        )
    }
}

/// Archive the output tree. Returns the archive path.
pub async fn archive(config: &SiteConfig, name: &ArchiveName) -> Result<PathBuf, FinalizeError> {
    let file_name = name.to_string();
    let archive_path = config.root_join(&file_name);

    let mut vars = build_prerender_vars(config);
    vars.insert(ARCHIVE_VAR.into(), file_name.clone());

    let hook = HookConfig {
        enable: true,
        name: None,
        command: config.package.command.clone(),
        quiet: true,
    };

    log!("package"; "{}", file_name);
    run_command(&hook, config.get_root(), &vars, "package")
        .await
        .map_err(|e| FinalizeError::Archive {
            command: hook.display_name().to_owned(),
            source: e.into(),
        })?;

    Ok(archive_path)
}

/// Name the archive for a build finishing now.
pub fn archive_name_now(config: &SiteConfig) -> ArchiveName {
    let metadata = config.root_join(&config.package.metadata);
    let project = read_project_name(&metadata, &config.package.default_name);
    ArchiveName::new(project, DateTimeUtc::now(), config.package.extension())
}
