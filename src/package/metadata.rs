//! Project metadata (`deployment.json`).

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::debug;

#[derive(Debug, Default, Deserialize)]
struct ProjectMetadata {
    #[serde(default)]
    name: Option<String>,
}

/// Project identifier for archive names.
///
/// Falls back to `default` when the file is missing, is not valid JSON, or
/// has no non-empty string `name`. Path separators become `-`.
pub fn read_project_name(path: &Path, default: &str) -> String {
    let name = match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<ProjectMetadata>(&content) {
            Ok(meta) => meta.name,
            Err(e) => {
                debug!("package"; "ignoring {}: {}", path.display(), e);
                None
            }
        },
        Err(e) => {
            debug!("package"; "no metadata at {}: {}", path.display(), e);
            None
        }
    };

    match name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => sanitize(name),
        _ => default.to_owned(),
    }
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if matches!(c, '/' | '\\') { '-' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn read(content: Option<&str>) -> String {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("deployment.json");
        if let Some(content) = content {
            fs::write(&path, content).unwrap();
        }
        read_project_name(&path, "project")
    }

    #[test]
    fn test_name_present() {
        assert_eq!(read(Some(r#"{"name": "acme-site", "region": "eu"}"#)), "acme-site");
    }

    #[test]
    fn test_fallbacks() {
        assert_eq!(read(None), "project");
        assert_eq!(read(Some(r#"{"region": "eu"}"#)), "project");
        assert_eq!(read(Some(r#"{"name": "  "}"#)), "project");
        assert_eq!(read(Some(r#"{"name": 42}"#)), "project");
        assert_eq!(read(Some("not json")), "project");
    }

    #[test]
    fn test_separators_sanitized() {
        assert_eq!(read(Some(r#"{"name": "team/site\\v2"}"#)), "team-site-v2");
    }
}
