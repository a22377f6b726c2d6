//! Project configuration management for `prerender.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── build/     # [build] and [build.mapping]
//! │   ├── hooks      # [hooks]
//! │   ├── package    # [package]
//! │   ├── render     # [render]
//! │   └── serve      # [serve]
//! ├── types/         # ConfigError, ConfigDiagnostics, FieldPath
//! └── mod.rs         # SiteConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section            | Purpose                                         |
//! |--------------------|-------------------------------------------------|
//! | `[build]`          | Template roots, exclusions, output, policy      |
//! | `[build.mapping]`  | Multi-site vs legacy URL mapping                |
//! | `[serve]`          | Render server interface and port policy         |
//! | `[render]`         | Layouts, partials, view data sidecars           |
//! | `[hooks]`          | Asset pipeline command and ordering             |
//! | `[package]`        | Archive naming and archival command             |

pub mod section;
pub mod types;
mod util;

use util::find_config_file;
pub use util::resolve_against;

pub use section::{
    AssetOrdering, BuildSectionConfig, FailurePolicy, HookConfig, HooksConfig, MappingConfig,
    MappingKind, PackageConfig, PortPolicy, RenderConfig, ServeConfig,
};
pub use types::{ConfigDiagnostics, ConfigError, FieldPath};

use crate::{
    cli::{BuildArgs, Cli, Commands},
    debug, log,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing prerender.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Route discovery and output settings
    #[serde(default)]
    pub build: BuildSectionConfig,

    /// Render server settings
    #[serde(default)]
    pub serve: ServeConfig,

    /// Templating engine settings
    #[serde(default)]
    pub render: RenderConfig,

    /// External asset pipeline
    #[serde(default)]
    pub hooks: HooksConfig,

    /// Packaging settings
    #[serde(default)]
    pub package: PackageConfig,
}

impl SiteConfig {
    /// Load configuration for the given CLI invocation.
    ///
    /// Searches upward from cwd for the config file. Without one, defaults
    /// apply and the current directory is the project root.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let mut config = match find_config_file(&cli.config, &cwd) {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                config.config_path = crate::utils::path::normalize_path(&path);
                config
            }
            None => {
                debug!("config"; "{} not found, using defaults", cli.config.display());
                Self::default()
            }
        };

        let root = config
            .config_path
            .parent()
            .map_or_else(|| cwd.clone(), Path::to_path_buf);

        config.finalize(&root, cli);
        config.validate()?;
        Ok(config)
    }

    /// Resolve paths against the project root and apply CLI overrides.
    fn finalize(&mut self, root: &Path, cli: &Cli) {
        let root = crate::utils::path::normalize_path(root);

        Self::update_option(&mut self.build.output, cli.output.as_ref());
        self.set_root(&root);
        self.build.output = resolve_against(&self.build.output, &root);
        self.package.metadata = resolve_against(&self.package.metadata, &root);

        match &cli.command {
            Commands::Build { build_args } => self.apply_build_args(build_args),
            Commands::Routes { mapping, .. } => {
                if mapping.legacy {
                    self.build.mapping.strategy = MappingKind::Legacy;
                }
            }
        }
    }

    /// Apply build arguments from CLI.
    fn apply_build_args(&mut self, args: &BuildArgs) {
        crate::logger::set_verbose(args.verbose);

        if args.mapping.legacy {
            self.build.mapping.strategy = MappingKind::Legacy;
        }
        if args.fail_fast {
            self.build.policy = FailurePolicy::FailFast;
        }
        if args.no_archive {
            self.package.enable = false;
        }
        if args.port.is_some() {
            self.serve.port = args.port;
        }
        Self::update_option(&mut self.hooks.ordering, args.assets.as_ref());
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Toml)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::Toml)?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        &self.root
    }

    /// Set the root directory path
    pub fn set_root(&mut self, path: &Path) {
        self.root = path.to_path_buf();
    }

    /// Join a path with the root directory.
    pub fn root_join(&self, path: impl AsRef<Path>) -> PathBuf {
        self.root.join(path)
    }

    /// Get path relative to the project root
    pub fn root_relative(&self, path: impl AsRef<Path>) -> PathBuf {
        path.as_ref()
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.as_ref().to_path_buf())
    }

    /// Absolute output tree.
    pub fn output_dir(&self) -> &Path {
        &self.build.output
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate configuration.
    ///
    /// Collects all validation errors and returns them at once.
    pub fn validate(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();

        self.build.validate(&mut diag);
        self.serve.validate(&mut diag);
        self.render.validate(&mut diag);
        self.package.validate(&mut diag);

        if !self.root.as_os_str().is_empty() && self.build.output == self.root {
            diag.error_with_hint(
                BuildSectionConfig::FIELD_OUTPUT,
                "output directory must not be the project root",
                "the output tree is deleted before every build",
            );
        }

        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config, panicking on unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> SiteConfig {
    let (parsed, ignored) = SiteConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

/// Config rooted at `root` with the output tree at `root/build`.
#[cfg(test)]
pub fn test_config_at(root: &Path, content: &str) -> SiteConfig {
    let mut config = test_parse_config(content);
    config.set_root(root);
    config.build.output = resolve_against(&config.build.output, root);
    config
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_from_str_invalid_toml() {
        let result = SiteConfig::from_str("[build\noutput = \"dist\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_site_config_default() {
        let config = SiteConfig::default();
        assert_eq!(config.get_root(), Path::new(""));
        assert_eq!(config.build.output, PathBuf::from("build"));
        assert_eq!(config.serve.port_policy(), PortPolicy::Free);
        assert_eq!(config.package.default_name, "project");
    }

    #[test]
    fn test_unknown_fields_detected() {
        let content = "[build]\noutput = \"dist\"\n[unknown_section]\nfield = \"value\"";
        let (config, ignored) = SiteConfig::parse_with_ignored(content).unwrap();

        assert_eq!(config.build.output, PathBuf::from("dist"));
        assert!(ignored.iter().any(|f| f.contains("unknown_section")));
    }

    #[test]
    fn test_finalize_applies_build_args() {
        let cli = Cli::try_parse_from([
            "prerender",
            "build",
            "--legacy",
            "--fail-fast",
            "--no-archive",
            "--port",
            "4100",
            "-o",
            "dist",
        ])
        .unwrap();

        let mut config = SiteConfig::default();
        config.finalize(Path::new("/project"), &cli);

        assert!(config.output_dir().ends_with("dist"));
        assert!(config.output_dir().is_absolute());
        assert_eq!(config.build.mapping.strategy, MappingKind::Legacy);
        assert!(config.build.policy.is_fail_fast());
        assert!(!config.package.enable);
        assert_eq!(config.serve.port_policy(), PortPolicy::Fixed(4100));
    }

    #[test]
    fn test_validate_rejects_output_at_root() {
        let mut config = SiteConfig::default();
        config.set_root(Path::new("/project"));
        config.build.output = PathBuf::from("/project");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_root_relative() {
        let mut config = SiteConfig::default();
        config.set_root(Path::new("/project"));
        assert_eq!(
            config.root_relative("/project/site-sections/a.html"),
            PathBuf::from("site-sections/a.html")
        );
        assert_eq!(config.root_join("build"), PathBuf::from("/project/build"));
    }
}
