//! Build pipeline.
//!
//! ```text
//! reset -> assets (spawned) -> discover -> serve -> crawl -> archive -> close
//! ```
//!
//! The render server is owned here from `serve` to `close`; the crawl only
//! sees its base URL. Where the asset pipeline is awaited depends on
//! `hooks.ordering`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};

use crate::config::{AssetOrdering, SiteConfig};
use crate::crawl::{self, BuildReport};
use crate::hooks::{AssetStatus, AssetTask};
use crate::package::{self, FinalizeError};
use crate::render::{ConventionRoutes, TeraEngine};
use crate::route::{self, CollisionError, TemplateRoute, print_conflicts};
use crate::utils::plural_count;
use crate::{debug, log, serve, workspace};

/// Everything a finished build produced.
#[derive(Debug)]
pub struct BuildOutcome {
    pub report: BuildReport,
    pub archive: Option<PathBuf>,
    pub archive_error: Option<String>,
    pub assets: AssetStatus,
}

impl BuildOutcome {
    /// Whether the build counts as failed under `fail-fast`.
    pub fn is_failure(&self) -> bool {
        self.report.has_failures() || self.archive_error.is_some()
    }
}

/// Run a full build and apply the failure policy to its outcome.
pub async fn build_site(config: &SiteConfig) -> Result<BuildOutcome> {
    let outcome = run_pipeline(config).await?;
    log_summary(&outcome);

    if config.build.policy.is_fail_fast() && outcome.is_failure() {
        if let Some(reason) = &outcome.archive_error {
            bail!("packaging failed: {reason}");
        }
        bail!(
            "{} failed to render",
            plural_count(outcome.report.failed_count(), "route")
        );
    }
    Ok(outcome)
}

async fn run_pipeline(config: &SiteConfig) -> Result<BuildOutcome> {
    let reset = workspace::reset(config)?;
    debug!("reset"; "{} removed, previous output {}",
        plural_count(reset.archives.len(), "archive"),
        if reset.output_removed { "cleared" } else { "absent" });

    let mut assets = AssetTask::spawn(config);

    let routes = discover_routes(config)?;
    log!("build"; "{}", plural_count(routes.len(), "route"));

    let output = config.output_dir();
    tokio::fs::create_dir_all(output)
        .await
        .with_context(|| format!("failed to create {}", output.display()))?;

    let engine = TeraEngine::load(config, &routes)?;
    let table = ConventionRoutes::new(&routes, config)?;
    debug!("render"; "{} loaded", plural_count(engine.template_count(), "template"));

    let server = serve::start(&config.serve, Arc::new(table), Arc::new(engine))?;

    assets.wait_at(AssetOrdering::BeforeCrawl).await;
    let report = crawl::crawl(&server.base_url(), &routes, config.build.policy).await?;
    assets.wait_at(AssetOrdering::BeforeArchive).await;

    let (archive, archive_error) = if !config.package.enable {
        debug!("package"; "disabled");
        (None, None)
    } else if config.build.policy.is_fail_fast() && report.has_failures() {
        log!("package"; "skipped after failed routes");
        (None, None)
    } else {
        match package_output(config).await {
            Ok(path) => (Some(path), None),
            Err(e) => {
                let reason = format!("{:#}", anyhow::Error::from(e));
                log!("package"; "{}", reason);
                (None, Some(reason))
            }
        }
    };

    server.close();

    Ok(BuildOutcome {
        report,
        archive,
        archive_error,
        assets: assets.status().await,
    })
}

fn discover_routes(config: &SiteConfig) -> Result<Vec<TemplateRoute>> {
    route::discover(config).map_err(|e| {
        if let Some(collision) = e.downcast_ref::<CollisionError>() {
            print_conflicts(&collision.conflicts);
            return anyhow::anyhow!(
                "{} claimed by more than one template",
                plural_count(collision.conflicts.len(), "output path")
            );
        }
        e
    })
}

async fn package_output(config: &SiteConfig) -> Result<PathBuf, FinalizeError> {
    let name = package::archive_name_now(config);
    package::archive(config, &name).await
}

fn log_summary(outcome: &BuildOutcome) {
    let report = &outcome.report;
    if report.has_failures() {
        let failed: Vec<_> = report.failed().map(|r| r.route.request_path.as_str()).collect();
        log!("build"; "{} written, {} failed: {}",
            plural_count(report.written_count(), "page"),
            failed.len(),
            failed.join(", "));
    } else {
        log!("build"; "{} written ({} bytes)",
            plural_count(report.written_count(), "page"),
            report.total_bytes());
    }

    match &outcome.assets {
        AssetStatus::Running => log!("assets"; "still running, may be missing from the package"),
        AssetStatus::Failed(_) => log!("assets"; "failed, the package may be incomplete"),
        AssetStatus::Inactive | AssetStatus::Succeeded => {}
    }

    if let Some(path) = &outcome.archive {
        log!("package"; "{}", path.display());
    }
}
