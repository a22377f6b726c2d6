//! Prerender - render a templated multi-site app and package a static mirror.

mod cli;
mod config;
mod crawl;
mod hooks;
mod logger;
mod package;
mod render;
mod route;
mod serve;
mod utils;
mod workspace;

use anyhow::{Context, Result};
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::SiteConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = SiteConfig::load(&cli)?;

    match &cli.command {
        Commands::Build { .. } => {
            // The crawl runs on one event loop; the render server has its own threads.
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .context("failed to create tokio runtime")?;
            rt.block_on(cli::build::build_site(&config)).map(|_| ())
        }
        Commands::Routes { json, .. } => cli::routes::list_routes(&config, *json),
    }
}
