//! Rendering collaborators behind the render server.
//!
//! The server only knows two seams:
//!
//! - [`RouteTable`] resolves a request path to a [`RouteBinding`]
//! - [`Render`] turns a binding into HTML
//!
//! [`ConventionRoutes`] and [`TeraEngine`] are the defaults, built from the
//! same route list the crawl uses.

mod engine;
mod routes;

pub use engine::TeraEngine;
pub use routes::ConventionRoutes;

use anyhow::Result;
use serde::Serialize;

/// Everything needed to render one route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteBinding {
    pub site: String,
    pub view: String,
    /// Template name registered with the engine.
    pub template: String,
    /// Request path this binding was resolved from.
    pub request_path: String,
    /// View data; an object's keys become top-level template variables.
    pub data: serde_json::Value,
}

/// Application route table.
pub trait RouteTable: Send + Sync {
    fn resolve(&self, request_path: &str) -> Option<RouteBinding>;

    fn len(&self) -> usize;
}

/// Templating engine.
pub trait Render: Send + Sync {
    fn render(&self, binding: &RouteBinding) -> Result<String>;
}
