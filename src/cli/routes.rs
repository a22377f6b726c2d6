//! `routes` command: print the route table without building.

use anyhow::{Result, bail};

use crate::config::SiteConfig;
use crate::log;
use crate::route::conflict::detect_conflicts;
use crate::route::{MappingStrategy, TemplateRoute, enumerate, print_conflicts};
use crate::utils::{path::to_slash, plural_count};

/// Map every template and print the table; collisions fail the command.
pub fn list_routes(config: &SiteConfig, json: bool) -> Result<()> {
    let routes = map_routes(config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&routes)?);
    } else {
        for line in format_table(config, &routes) {
            println!("{line}");
        }
    }

    let conflicts = detect_conflicts(&routes);
    if !conflicts.is_empty() {
        print_conflicts(&conflicts);
        bail!(
            "{} claimed by more than one template",
            plural_count(conflicts.len(), "output path")
        );
    }

    log!("routes"; "{}", plural_count(routes.len(), "route"));
    Ok(())
}

fn map_routes(config: &SiteConfig) -> Result<Vec<TemplateRoute>> {
    let strategy = MappingStrategy::from_build(&config.build);
    let routes = enumerate(config)?
        .iter()
        .map(|file| strategy.map_file(file, config.output_dir()))
        .collect();
    Ok(routes)
}

/// `source → request → output`, columns aligned.
fn format_table(config: &SiteConfig, routes: &[TemplateRoute]) -> Vec<String> {
    let rows: Vec<_> = routes
        .iter()
        .map(|r| {
            (
                to_slash(&r.source),
                r.request_path.as_str(),
                to_slash(&config.root_relative(&r.output_path)),
            )
        })
        .collect();

    let source_width = rows.iter().map(|r| r.0.len()).max().unwrap_or(0);
    let request_width = rows.iter().map(|r| r.1.len()).max().unwrap_or(0);

    rows.iter()
        .map(|(source, request, output)| {
            format!("{source:<source_width$} → {request:<request_width$} → {output}")
        })
        .collect()
}
