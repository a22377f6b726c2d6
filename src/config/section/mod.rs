//! Configuration section definitions.
//!
//! Each module corresponds to a section in `prerender.toml`:
//!
//! | Module    | TOML Section | Purpose                                   |
//! |-----------|--------------|-------------------------------------------|
//! | `build`   | `[build]`    | Template roots, output, mapping, policy   |
//! | `serve`   | `[serve]`    | Ephemeral render server                   |
//! | `render`  | `[render]`   | Layouts, partials, view data              |
//! | `hooks`   | `[hooks]`    | Asset pipeline command and ordering       |
//! | `package` | `[package]`  | Archive name and archival command         |

pub mod build;
mod hooks;
mod package;
mod render;
mod serve;

pub use build::{BuildSectionConfig, FailurePolicy, MappingConfig, MappingKind};
pub use hooks::{AssetOrdering, HookConfig, HooksConfig};
pub use package::PackageConfig;
pub use render::RenderConfig;
pub use serve::{PortPolicy, ServeConfig};
