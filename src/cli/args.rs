//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::AssetOrdering;

/// Render-and-crawl static exporter CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Output directory path (relative to project root)
    #[arg(short, long, global = true, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Config file path (default: prerender.toml)
    #[arg(short = 'C', long, global = true, default_value = "prerender.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Render every template route and package the static mirror
    #[command(visible_alias = "b")]
    Build {
        #[command(flatten)]
        build_args: BuildArgs,
    },

    /// Print the route table (source, request path, output path) without building
    #[command(visible_alias = "r")]
    Routes {
        #[command(flatten)]
        mapping: MappingArgs,

        /// Print routes as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Mapping arguments shared by Build and Routes
#[derive(clap::Args, Debug, Clone, Default)]
pub struct MappingArgs {
    /// Use the single-site legacy mapping (root alias, `_` to `-` in URLs)
    #[arg(short = 'L', long)]
    pub legacy: bool,
}

/// Build command arguments
#[derive(clap::Args, Debug, Clone, Default)]
pub struct BuildArgs {
    #[command(flatten)]
    pub mapping: MappingArgs,

    /// Bind the render server to a fixed port instead of a free one
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Abort the crawl on the first failed route
    #[arg(long)]
    pub fail_fast: bool,

    /// Skip packaging the output tree
    #[arg(long)]
    pub no_archive: bool,

    /// When to wait for the asset pipeline (before-crawl, before-archive, detached)
    #[arg(long, value_enum)]
    pub assets: Option<AssetOrdering>,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long)]
    pub verbose: bool,
}
