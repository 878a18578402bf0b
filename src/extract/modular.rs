use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use regex::{Captures, Regex};
use tracing::{debug, info, warn};

use crate::artifacts::read_lossy;
use crate::model::{ModularExtraction, SectionKeywords};
use crate::rules::Rules;

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Everything one source file contributes to the extraction.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FileScan {
    pub headings: BTreeSet<String>,
    pub plans: BTreeSet<String>,
    pub markers: BTreeSet<String>,
    /// Section → canonical phrases credited by this file.
    pub hits: BTreeMap<String, BTreeSet<String>>,
}

/// Scan a single decoded file against the rules.
pub fn scan_text(text: &str, rules: &Rules) -> FileScan {
    let mut scan = FileScan::default();

    for caps in rules.heading_pattern.captures_iter(text) {
        let heading = normalize_heading(primary_group(&caps));
        if !heading.is_empty() {
            scan.headings.insert(heading);
        }
    }
    for caps in rules.plan_pattern.captures_iter(text) {
        scan.plans.insert(primary_group(&caps).to_string());
    }
    for m in rules.marker_pattern.find_iter(text) {
        scan.markers.insert(m.as_str().to_string());
    }

    // Plain phrases are checked per section, case-insensitively.
    let lower = text.to_lowercase();
    for (section, words) in &rules.keywords {
        for word in words {
            if lower.contains(&word.to_lowercase()) {
                scan.hits.entry(section.clone()).or_default().insert(word.clone());
            }
        }
    }

    // A variant hit credits every section that lists the canonical phrase.
    for variant in &rules.variants {
        if variant.pattern.is_match(text) {
            for owner in &variant.owners {
                scan.hits
                    .entry(owner.clone())
                    .or_default()
                    .insert(variant.canonical.clone());
            }
        }
    }

    scan
}

fn primary_group<'t>(caps: &Captures<'t>) -> &'t str {
    caps.get(1)
        .or_else(|| caps.get(0))
        .map(|m| m.as_str())
        .unwrap_or_default()
}

fn normalize_heading(raw: &str) -> String {
    WHITESPACE_RE.replace_all(raw, " ").trim().to_string()
}

/// Running totals across scanned files. Merging is a set union, so a phrase
/// once found for a section stays found.
#[derive(Debug)]
pub struct ModularAccumulator {
    found: BTreeMap<String, BTreeSet<String>>,
    plans: BTreeSet<String>,
    markers: BTreeSet<String>,
    headings: BTreeSet<String>,
    files_scanned: usize,
}

impl ModularAccumulator {
    pub fn new(rules: &Rules) -> Self {
        ModularAccumulator {
            found: rules
                .keywords
                .keys()
                .map(|section| (section.clone(), BTreeSet::new()))
                .collect(),
            plans: BTreeSet::new(),
            markers: BTreeSet::new(),
            headings: BTreeSet::new(),
            files_scanned: 0,
        }
    }

    pub fn merge(&mut self, scan: FileScan) {
        self.files_scanned += 1;
        self.headings.extend(scan.headings);
        self.plans.extend(scan.plans);
        self.markers.extend(scan.markers);
        for (section, phrases) in scan.hits {
            self.found.entry(section).or_default().extend(phrases);
        }
    }

    pub fn finish(self, rules: &Rules) -> ModularExtraction {
        let mut found_by_section = self.found;
        let sections = rules
            .keywords
            .iter()
            .map(|(section, words)| {
                let found = found_by_section.remove(section).unwrap_or_default();
                let missing = words
                    .iter()
                    .filter(|w| !found.contains(*w))
                    .cloned()
                    .collect();
                (section.clone(), SectionKeywords { found, missing })
            })
            .collect();

        ModularExtraction {
            sections,
            plan_count_distinct: self.plans.len(),
            plans_detected: self.plans,
            mcp_marker_count: self.markers.len(),
            mcp_markers: self.markers,
            headings: self.headings,
            files_scanned: self.files_scanned,
        }
    }
}

fn scan_file(path: &Path, rules: &Rules) -> Option<FileScan> {
    match read_lossy(path) {
        Ok(text) => {
            debug!(path = %path.display(), bytes = text.len(), "scanning");
            Some(scan_text(&text, rules))
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "skipping unreadable file");
            None
        }
    }
}

#[cfg(feature = "rayon")]
fn scan_all(files: &[PathBuf], rules: &Rules, pb: &ProgressBar) -> Vec<Option<FileScan>> {
    use rayon::prelude::*;

    files
        .par_iter()
        .map(|f| {
            let scan = scan_file(f, rules);
            pb.inc(1);
            scan
        })
        .collect()
}

#[cfg(not(feature = "rayon"))]
fn scan_all(files: &[PathBuf], rules: &Rules, pb: &ProgressBar) -> Vec<Option<FileScan>> {
    files
        .iter()
        .map(|f| {
            let scan = scan_file(f, rules);
            pb.inc(1);
            scan
        })
        .collect()
}

/// Scan every file and fold the results in file order.
pub fn extract(files: &[PathBuf], rules: &Rules) -> Result<ModularExtraction> {
    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} files")?
            .progress_chars("=> "),
    );

    let scans = scan_all(files, rules, &pb);
    pb.finish_and_clear();

    let mut acc = ModularAccumulator::new(rules);
    for scan in scans.into_iter().flatten() {
        acc.merge(scan);
    }
    let extraction = acc.finish(rules);

    info!(
        files = files.len(),
        scanned = extraction.files_scanned,
        plans = extraction.plan_count_distinct,
        markers = extraction.mcp_marker_count,
        headings = extraction.headings.len(),
        "modular sources scanned"
    );
    Ok(extraction)
}

// ── Tests ──
