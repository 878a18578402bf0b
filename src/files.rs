use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobMatcher};
use tracing::debug;
use walkdir::WalkDir;

/// Resolve glob patterns under `root` into an ordered, de-duplicated file list.
///
/// Patterns without glob syntax are kept verbatim even when the file does
/// not exist, so the scanner can report and skip them.
pub fn resolve(root: &Path, patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut seen = HashSet::new();
    let mut files = Vec::new();

    for pattern in patterns {
        let matched = if is_glob(pattern) {
            expand(root, pattern)?
        } else {
            vec![root.join(pattern)]
        };
        debug!(pattern = %pattern, matched = matched.len(), "glob resolved");
        for path in matched {
            if seen.insert(path.clone()) {
                files.push(path);
            }
        }
    }

    Ok(files)
}

fn is_glob(pattern: &str) -> bool {
    pattern.contains(['*', '?', '[', '{'])
}

/// `*` and `?` stay within one path component; `**` crosses directories.
fn compile_glob(pattern: &str) -> Result<GlobMatcher> {
    let glob = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .with_context(|| format!("invalid glob: {pattern:?}"))?;
    Ok(glob.compile_matcher())
}

fn expand(root: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let matcher = compile_glob(pattern)?;

    // Walk from the longest glob-free directory prefix.
    let prefix: Vec<&str> = pattern.split('/').take_while(|part| !is_glob(part)).collect();
    let base = prefix.iter().fold(root.to_path_buf(), |acc, part| acc.join(part));
    if !base.is_dir() {
        return Ok(Vec::new());
    }
    let max_depth = if pattern.contains("**") {
        usize::MAX
    } else {
        pattern.split('/').count() - prefix.len()
    };

    let mut matched = Vec::new();
    for entry in WalkDir::new(&base)
        .max_depth(max_depth)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let Ok(rel) = entry.path().strip_prefix(root) else {
            continue;
        };
        let rel = rel.to_string_lossy().replace('\\', "/");
        if matcher.is_match(&rel) {
            matched.push(entry.into_path());
        }
    }
    Ok(matched)
}

// ── Tests ──
