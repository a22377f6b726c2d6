//! Crawl: fetch every route from the render server and persist it.
//!
//! Every route is dispatched at once on the current event loop; the batch
//! ends when all tasks are joined. Each task runs
//!
//! ```text
//! GET request_path -> buffer body -> create parent dir -> write output_path
//! ```
//!
//! Output paths are disjoint (checked before the crawl), so tasks never
//! write the same file.

mod report;

pub use report::{BuildReport, RouteOutcome, RouteReport, TaskError};

use std::path::Path;

use anyhow::{Context, Result};
use tokio::task::JoinSet;

use crate::config::FailurePolicy;
use crate::logger::ProgressLine;
use crate::route::TemplateRoute;
use crate::{debug, log};

/// Fetch and write every route against `base_url`.
///
/// Under [`FailurePolicy::FailFast`] the first failure aborts the tasks
/// still running; they are reported as cancelled.
pub async fn crawl(
    base_url: &str,
    routes: &[TemplateRoute],
    policy: FailurePolicy,
) -> Result<BuildReport> {
    let client = reqwest::Client::builder()
        .no_proxy()
        .build()
        .context("failed to create http client")?;

    let mut tasks = JoinSet::new();
    for (index, route) in routes.iter().enumerate() {
        let client = client.clone();
        let url = format!("{}{}", base_url.trim_end_matches('/'), route.request_path);
        let output = route.output_path.clone();
        tasks.spawn(async move { (index, export_route(&client, &url, &output).await) });
    }

    let progress = ProgressLine::new("crawl", &[("pages", routes.len()), ("failed", routes.len())]);
    let mut outcomes: Vec<Option<RouteOutcome>> = vec![None; routes.len()];
    let mut aborted = false;

    while let Some(joined) = tasks.join_next().await {
        let (index, result) = match joined {
            Ok(done) => done,
            Err(e) if e.is_cancelled() => continue,
            Err(e) => {
                log!("error"; "crawl task panicked: {}", e);
                continue;
            }
        };

        progress.inc("pages");
        let route = &routes[index];
        let outcome = match result {
            Ok(bytes) => {
                debug!("write"; "{} -> {}", route.request_path, route.output_path.display());
                RouteOutcome::Written { bytes }
            }
            Err(e) => {
                progress.inc("failed");
                let outcome = RouteOutcome::from_error(&e);
                if let RouteOutcome::Failed { reason } = &outcome {
                    log!("failed"; "{}: {}", route.request_path, reason);
                }
                if policy.is_fail_fast() && !aborted {
                    aborted = true;
                    tasks.abort_all();
                }
                outcome
            }
        };
        outcomes[index] = Some(outcome);
    }
    progress.finish();

    let routes = routes
        .iter()
        .zip(outcomes)
        .map(|(route, outcome)| RouteReport {
            route: route.clone(),
            outcome: outcome.unwrap_or_else(|| {
                RouteOutcome::failed(if aborted { "cancelled" } else { "task panicked" })
            }),
        })
        .collect();

    Ok(BuildReport { routes })
}

/// One route: fetch, then write. Returns the number of bytes written.
async fn export_route(
    client: &reqwest::Client,
    url: &str,
    output: &Path,
) -> Result<usize, TaskError> {
    let response = client.get(url).send().await.map_err(TaskError::Fetch)?;

    let status = response.status();
    if !status.is_success() {
        return Err(TaskError::Status(status));
    }

    let body = response.bytes().await.map_err(TaskError::Fetch)?;

    if let Some(parent) = output.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| TaskError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    tokio::fs::write(output, &body)
        .await
        .map_err(|source| TaskError::Write {
            path: output.to_path_buf(),
            source,
        })?;

    Ok(body.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MappingConfig, ServeConfig};
    use crate::render::{Render, RouteBinding, RouteTable};
    use crate::route::MappingStrategy;
    use crate::serve::{self, ServerHandle};
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    /// Serves every path except `/missing`.
    struct AnyRoute;

    impl RouteTable for AnyRoute {
        fn resolve(&self, request_path: &str) -> Option<RouteBinding> {
            (request_path != "/missing").then(|| RouteBinding {
                site: "root".into(),
                view: request_path.into(),
                template: request_path.into(),
                request_path: request_path.into(),
                data: serde_json::Value::Null,
            })
        }

        fn len(&self) -> usize {
            0
        }
    }

    struct PathPage;

    impl Render for PathPage {
        fn render(&self, binding: &RouteBinding) -> Result<String> {
            Ok(format!("<main>{}</main>", binding.request_path))
        }
    }

    fn start_server() -> ServerHandle {
        serve::start(&ServeConfig::default(), Arc::new(AnyRoute), Arc::new(PathPage)).unwrap()
    }

    fn routes(output: &Path, sources: &[&str]) -> Vec<TemplateRoute> {
        let strategy = MappingStrategy::new(&MappingConfig::default());
        sources
            .iter()
            .map(|s| strategy.map_template(Path::new(s), output))
            .collect()
    }

    #[tokio::test]
    async fn test_round_trip_bytes() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("build");
        let server = start_server();
        let routes = routes(&output, &["root/index.html", "marketing/pricing/index.html"]);

        let report = crawl(&server.base_url(), &routes, FailurePolicy::BestEffort)
            .await
            .unwrap();

        assert_eq!(report.written_count(), 2);
        for route in &routes {
            let served = reqwest::get(format!("{}{}", server.base_url(), route.request_path))
                .await
                .unwrap()
                .bytes()
                .await
                .unwrap();
            assert_eq!(fs::read(&route.output_path).unwrap(), served.as_ref());
        }
        assert_eq!(
            fs::read_to_string(output.join("marketing/pricing/index.html")).unwrap(),
            "<main>/marketing/pricing</main>"
        );
        server.close();
    }

    #[tokio::test]
    async fn test_failed_route_is_isolated() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("build");
        let server = start_server();
        let routes = routes(&output, &["a.html", "missing.html", "b.html", "c/d.html"]);

        let report = crawl(&server.base_url(), &routes, FailurePolicy::BestEffort)
            .await
            .unwrap();
        server.close();

        assert_eq!(report.routes.len(), 4);
        assert_eq!(report.written_count(), 3);
        let failed: Vec<_> = report.failed().collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].route.request_path, "/missing");
        assert_eq!(
            failed[0].outcome,
            RouteOutcome::failed("render server answered 404 Not Found")
        );
        assert!(!output.join("missing/index.html").exists());
        assert!(output.join("c/d/index.html").is_file());
    }

    #[tokio::test]
    async fn test_write_failure_is_isolated() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("build");
        fs::create_dir_all(&output).unwrap();
        // A file where the route's directory should go.
        fs::write(output.join("blocked"), "").unwrap();

        let server = start_server();
        let routes = routes(&output, &["blocked.html", "open.html"]);
        let report = crawl(&server.base_url(), &routes, FailurePolicy::BestEffort)
            .await
            .unwrap();
        server.close();

        assert_eq!(report.written_count(), 1);
        let RouteOutcome::Failed { reason } = &report.routes[0].outcome else {
            panic!("expected failure");
        };
        assert!(reason.starts_with("failed to create"), "{reason}");
    }

    #[tokio::test]
    async fn test_fail_fast_reports_failure() {
        let dir = TempDir::new().unwrap();
        let server = start_server();
        let sources: Vec<String> = (0..20).map(|i| format!("p{i}.html")).collect();
        let mut sources: Vec<&str> = sources.iter().map(String::as_str).collect();
        sources.insert(0, "missing.html");
        let routes = routes(&dir.path().join("build"), &sources);

        let report = crawl(&server.base_url(), &routes, FailurePolicy::FailFast)
            .await
            .unwrap();
        server.close();

        assert_eq!(report.routes.len(), 21);
        assert!(report.has_failures());
        assert!(
            report
                .failed()
                .all(|r| r.route.request_path == "/missing"
                    || r.outcome == RouteOutcome::failed("cancelled"))
        );
    }

    #[tokio::test]
    async fn test_empty_route_set() {
        let report = crawl("http://127.0.0.1:9", &[], FailurePolicy::BestEffort)
            .await
            .unwrap();
        assert!(report.routes.is_empty());
    }
}
