use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

/// Read a file and decode it as UTF-8, replacing invalid sequences.
pub fn read_lossy(path: &Path) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Load a JSON artifact, falling back to `T::default()` when it is missing or malformed.
pub fn load_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "input unavailable, treating as empty");
            return T::default();
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "input malformed, treating as empty");
            T::default()
        }
    }
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    write_text(path, &json)
}

pub fn write_text(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;
    debug!(path = %path.display(), bytes = text.len(), "artifact written");
    Ok(())
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ContentMap, MonolithExtraction};

    #[test]
    fn lossy_read_replaces_invalid_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.html");
        std::fs::write(&path, b"<h2>\xff\xfe\xd0\x9f</h2>").unwrap();
        let text = read_lossy(&path).unwrap();
        assert!(text.starts_with("<h2>"));
        assert!(text.contains('\u{FFFD}'));
        assert!(text.contains('П'));
    }

    #[test]
    fn missing_input_loads_as_default() {
        let map: ContentMap = load_or_default(Path::new("no/such/content_map.json"));
        assert!(map.sections.is_empty());
    }

    #[test]
    fn malformed_input_loads_as_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("monolith_extracted.json");
        std::fs::write(&path, "{ not json").unwrap();
        let m: MonolithExtraction = load_or_default(&path);
        assert!(m.0.is_empty());
    }

    #[test]
    fn write_json_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports/nested/out.json");
        write_json(&path, &serde_json::json!({"ok": "Настройки"})).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("Настройки"));
    }
}
