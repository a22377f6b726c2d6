//! Convention route table: one binding per discovered template.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rustc_hash::FxHashMap;
use serde_json::Value;

use crate::config::SiteConfig;
use crate::route::TemplateRoute;
use crate::utils::path::to_slash;

use super::{RouteBinding, RouteTable};

#[derive(Debug, Default)]
pub struct ConventionRoutes {
    bindings: FxHashMap<String, RouteBinding>,
}

impl ConventionRoutes {
    /// Bind every route, loading its data sidecar if one exists.
    ///
    /// A sidecar that exists but is not valid JSON is an error.
    pub fn new(routes: &[TemplateRoute], config: &SiteConfig) -> Result<Self> {
        let data_extension = config.render.data_extension.trim_start_matches('.');
        let mut bindings = FxHashMap::default();

        for route in routes {
            let sidecar = config.root_join(&route.source).with_extension(data_extension);
            let data = read_sidecar(&sidecar)?;

            bindings.insert(
                route.request_path.clone(),
                RouteBinding {
                    site: route.site.clone(),
                    view: route.view.clone(),
                    template: to_slash(&route.source),
                    request_path: route.request_path.clone(),
                    data,
                },
            );
        }

        Ok(Self { bindings })
    }
}

fn read_sidecar(path: &Path) -> Result<Value> {
    if !path.is_file() {
        return Ok(Value::Null);
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read view data `{}`", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("invalid view data `{}`", path.display()))
}

impl RouteTable for ConventionRoutes {
    fn resolve(&self, request_path: &str) -> Option<RouteBinding> {
        let trimmed = match request_path.trim_end_matches('/') {
            "" => "/",
            path => path,
        };
        self.bindings.get(trimmed).cloned()
    }

    fn len(&self) -> usize {
        self.bindings.len()
    }
}
