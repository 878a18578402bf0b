use std::path::Path;

use regex::Regex;
use tracing::info;

use crate::artifacts::read_lossy;
use crate::error::{ContentDiffError, ContentDiffResult};
use crate::model::MonolithExtraction;

/// Check each section pattern against the legacy document.
///
/// A missing document is fatal: without a baseline every section would read
/// as absent, which is a misleading report rather than a result.
pub fn extract(path: &Path, patterns: &[(String, Regex)]) -> ContentDiffResult<MonolithExtraction> {
    if !path.is_file() {
        return Err(ContentDiffError::MonolithMissing(path.to_path_buf()));
    }
    let text = read_lossy(path)?;
    let extraction = detect_sections(&text, patterns);
    let present = extraction.0.values().filter(|&&p| p).count();
    info!(
        path = %path.display(),
        sections = extraction.0.len(),
        present,
        "monolith scanned"
    );
    Ok(extraction)
}

pub fn detect_sections(text: &str, patterns: &[(String, Regex)]) -> MonolithExtraction {
    MonolithExtraction(
        patterns
            .iter()
            .map(|(name, re)| (name.clone(), re.is_match(text)))
            .collect(),
    )
}

// ── Tests ──
