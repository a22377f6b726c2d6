//! Tera-backed template engine.
//!
//! Template names:
//!
//! | Source                                         | Registered as                     |
//! |------------------------------------------------|-----------------------------------|
//! | route template                                 | root-relative path                |
//! | `<layouts>/default.html`                       | `layouts/default.html`            |
//! | `<partials>/nav.html`                          | root-relative path, `nav.html`    |
//! | `site-sections/blog/views/partials/nav.html`   | root-relative path, `blog/nav.html` |
//!
//! A view is rendered first; with a layout its HTML is passed to the layout
//! as `body` (use `{{ body | safe }}`). Every render sees `building = true`.
//!
//! Layouts and partials are shared, so any error in them fails the load.
//! A route template that cannot be read or parsed, or that extends or
//! imports an unknown template, is held back and only its own route fails.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result, bail};
use jwalk::WalkDir;
use rustc_hash::{FxHashMap, FxHashSet};
use serde_json::Value;
use tera::{Context, Template, Tera};

use crate::config::SiteConfig;
use crate::{debug, log};
use crate::route::TemplateRoute;
use crate::utils::path::to_slash;

use super::{Render, RouteBinding};

/// Prefix of registered layout names.
const LAYOUT_PREFIX: &str = "layouts";

/// View data key overriding the layout (`false` renders bare).
const LAYOUT_KEY: &str = "layout";

pub struct TeraEngine {
    tera: Tera,
    layout: Option<String>,
    extension: String,
    /// Route templates held back at load, with the reason.
    broken: FxHashMap<String, String>,
}

impl TeraEngine {
    /// Load route templates, layouts and partials in one batch so includes
    /// and inheritance resolve across all of them.
    pub fn load(config: &SiteConfig, routes: &[TemplateRoute]) -> Result<Self> {
        let extension = config.build.extension().to_owned();
        let mut templates: Vec<(String, String)> = Vec::new();
        let mut broken = FxHashMap::default();

        let mut views = Vec::with_capacity(routes.len());
        for route in routes {
            let name = to_slash(&route.source);
            match read_template(&config.root_join(&route.source)) {
                Ok(content) => views.push((name, content)),
                Err(e) => {
                    let reason = format!("{e:#}");
                    log!("render"; "skipping `{}`: {}", name, reason);
                    broken.insert(name, reason);
                }
            }
        }

        let layouts_dir = config.root_join(&config.render.layouts);
        for (rel, path) in collect_templates(&layouts_dir, &extension) {
            templates.push((format!("{LAYOUT_PREFIX}/{rel}"), read_template(&path)?));
        }

        for pattern in &config.render.partials {
            for (dir, site) in expand_partial_dirs(config.get_root(), pattern) {
                for (rel, path) in collect_templates(&dir, &extension) {
                    let content = read_template(&path)?;
                    let short = match &site {
                        Some(site) => format!("{site}/{rel}"),
                        None => rel,
                    };
                    templates.push((to_slash(&config.root_relative(&path)), content.clone()));
                    templates.push((short, content));
                }
            }
        }

        let known: FxHashSet<&str> = templates
            .iter()
            .chain(&views)
            .map(|(name, _)| name.as_str())
            .collect();
        let mut valid = Vec::with_capacity(views.len());
        for (name, content) in &views {
            match check_template(name, content, &known) {
                Ok(()) => valid.push((name.clone(), content.clone())),
                Err(reason) => {
                    log!("render"; "skipping `{}`: {}", name, reason);
                    broken.insert(name.clone(), reason);
                }
            }
        }
        templates.extend(valid);

        let mut tera = Tera::default();
        tera.add_raw_templates(templates)
            .context("failed to load templates")?;

        let layout = config
            .render
            .layout()
            .map(|name| layout_name(name, &extension))
            .filter(|name| {
                let found = tera.get_template_names().any(|n| n == name.as_str());
                if !found {
                    debug!("render"; "layout `{}` not found, rendering views bare", name);
                }
                found
            });

        Ok(Self {
            tera,
            layout,
            extension,
            broken,
        })
    }

    /// Number of registered templates.
    pub fn template_count(&self) -> usize {
        self.tera.get_template_names().count()
    }

    fn layout_for(&self, data: &Value) -> Option<String> {
        match data.get(LAYOUT_KEY) {
            Some(Value::String(name)) => Some(layout_name(name, &self.extension)),
            Some(Value::Bool(false) | Value::Null) => None,
            _ => self.layout.clone(),
        }
    }
}

impl Render for TeraEngine {
    fn render(&self, binding: &RouteBinding) -> Result<String> {
        if let Some(reason) = self.broken.get(&binding.template) {
            bail!("failed to load `{}`: {reason}", binding.template);
        }

        let mut context = match &binding.data {
            Value::Object(_) => Context::from_serialize(&binding.data)
                .with_context(|| format!("invalid view data for `{}`", binding.template))?,
            Value::Null => Context::new(),
            other => {
                let mut context = Context::new();
                context.insert("data", other);
                context
            }
        };
        context.insert("site", &binding.site);
        context.insert("view", &binding.view);
        context.insert("request_path", &binding.request_path);
        context.insert("building", &true);

        let body = self
            .tera
            .render(&binding.template, &context)
            .with_context(|| format!("failed to render `{}`", binding.template))?;

        let Some(layout) = self.layout_for(&binding.data) else {
            return Ok(body);
        };

        context.insert("body", &body);
        self.tera
            .render(&layout, &context)
            .with_context(|| format!("failed to render layout `{layout}`"))
    }
}

fn layout_name(name: &str, extension: &str) -> String {
    format!("{LAYOUT_PREFIX}/{name}.{extension}")
}

/// Parse `content` and make sure every parent and macro file it names is
/// loaded alongside it.
fn check_template(name: &str, content: &str, known: &FxHashSet<&str>) -> Result<(), String> {
    let template = Template::new(name, None, content)
        .map_err(|e| format!("{:#}", anyhow::Error::new(e)))?;

    let referenced = template
        .parent
        .iter()
        .chain(template.imported_macro_files.iter().map(|(file, _)| file));
    for file in referenced {
        if !known.contains(file.as_str()) {
            return Err(format!("template `{file}` not found"));
        }
    }
    Ok(())
}

fn read_template(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read template `{}`", path.display()))
}

/// Template files under `dir` as (`/`-separated name relative to dir, path).
///
/// A missing directory yields nothing.
fn collect_templates(dir: &Path, extension: &str) -> Vec<(String, PathBuf)> {
    if !dir.is_dir() {
        return Vec::new();
    }
    let mut found: Vec<_> = WalkDir::new(dir)
        .sort(true)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path())
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some(extension))
        .filter_map(|p| {
            let rel = to_slash(p.strip_prefix(dir).ok()?);
            Some((rel, p))
        })
        .collect();
    found.sort();
    found
}

/// Expand a partial directory pattern against the project root.
///
/// Each `*` segment matches one directory level; the first one names the
/// site the partials are namespaced under.
fn expand_partial_dirs(root: &Path, pattern: &str) -> Vec<(PathBuf, Option<String>)> {
    let mut current = vec![(root.to_path_buf(), None::<String>)];

    for segment in pattern.split('/').filter(|s| !s.is_empty()) {
        let mut next = Vec::new();
        for (dir, site) in current {
            if segment == "*" {
                let Ok(entries) = fs::read_dir(&dir) else {
                    continue;
                };
                let mut subdirs: Vec<_> = entries
                    .filter_map(Result::ok)
                    .filter(|e| e.path().is_dir())
                    .collect();
                subdirs.sort_by_key(|e| e.file_name());
                for entry in subdirs {
                    let name = entry.file_name().to_string_lossy().into_owned();
                    let site = site.clone().or_else(|| Some(name.clone()));
                    next.push((entry.path(), site));
                }
            } else {
                let path = dir.join(segment);
                if path.is_dir() {
                    next.push((path, site));
                }
            }
        }
        current = next;
    }

    current
}
