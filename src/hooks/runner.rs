//! Hook execution utilities.
//!
//! Provides environment variable building and command execution for the
//! asset pipeline and the archival command.

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use rustc_hash::FxHashMap;

use crate::config::{HookConfig, SiteConfig};
use crate::utils::exec::{Cmd, EMPTY_FILTER, SILENT_FILTER};

/// Archive variable, only set while packaging.
pub const ARCHIVE_VAR: &str = "PRERENDER_ARCHIVE";

// ============================================================================
// Environment Variables
// ============================================================================

/// Build `$PRERENDER_*` environment variables for external commands
///
/// Commands run from the project root, so the output directory is given
/// relative to it when possible.
pub fn build_prerender_vars(config: &SiteConfig) -> FxHashMap<String, String> {
    let mut vars = FxHashMap::default();

    vars.insert(
        "PRERENDER_ROOT".into(),
        config.get_root().display().to_string(),
    );
    vars.insert(
        "PRERENDER_OUTPUT_DIR".into(),
        config.root_relative(config.output_dir()).display().to_string(),
    );

    vars
}

// ============================================================================
// Command Argument Resolution
// ============================================================================

/// Resolve `$PRERENDER_*` variables in command arguments
///
/// Replaces occurrences of `$PRERENDER_XXX` with actual values from the vars map
pub fn resolve_args(args: &[String], vars: &FxHashMap<String, String>) -> Vec<String> {
    args.iter()
        .map(|arg| {
            let mut result = arg.clone();
            for (key, value) in vars {
                let pattern = format!("${}", key);
                result = result.replace(&pattern, value);
            }
            result
        })
        .collect()
}

// ============================================================================
// Hook Execution
// ============================================================================

/// Everything a hook needs to run detached from the config.
#[derive(Debug, Clone)]
pub struct HookInvocation {
    pub hook: HookConfig,
    pub root: PathBuf,
    pub vars: FxHashMap<String, String>,
}

impl HookInvocation {
    pub fn new(hook: &HookConfig, config: &SiteConfig) -> Self {
        Self {
            hook: hook.clone(),
            root: config.get_root().to_path_buf(),
            vars: build_prerender_vars(config),
        }
    }

    /// Execute the hook; `phase` is the log prefix.
    pub async fn run(&self, phase: &str) -> Result<()> {
        run_command(&self.hook, &self.root, &self.vars, phase).await
    }
}

/// Run a configured command with variables substituted and exported.
pub async fn run_command(
    hook: &HookConfig,
    root: &Path,
    vars: &FxHashMap<String, String>,
    phase: &str,
) -> Result<()> {
    if !hook.is_active() {
        return Ok(());
    }

    let resolved = resolve_args(&hook.command, vars);
    let program = &resolved[0];
    if which::which(program).is_err() && !root.join(program).is_file() {
        bail!("`{program}` not found");
    }

    if !hook.quiet {
        crate::log!(phase; "`{}` running", hook.display_name());
    }

    let output = Cmd::from_slice(&resolved)
        .cwd(root)
        .envs(vars)
        .filter(if hook.quiet { &SILENT_FILTER } else { &EMPTY_FILTER })
        .run()
        .await?;

    // Print output directly without prefix (unless quiet)
    if !hook.quiet {
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stdout = stdout.trim();
        if !stdout.is_empty() {
            println!("{stdout}");
        }
    }

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
