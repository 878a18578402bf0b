use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

pub const MONOLITH_JSON: &str = "monolith_extracted.json";
pub const MODULAR_JSON: &str = "modular_extracted.json";
pub const DIFF_JSON: &str = "diff_summary.json";
pub const DIFF_MD: &str = "diff_report.md";

/// Default keyword that marks the core bonus category as present.
pub const BONUS_CORE_KEYWORD: &str = "БОНУСНАЯ 1000";

// ── Content map (input) ──

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentMap {
    #[serde(default)]
    pub sections: BTreeMap<String, SectionRule>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionRule {
    #[serde(default)]
    pub required_keywords: Vec<String>,
    #[serde(default)]
    pub optional: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_plan_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_bonus_categories: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bonus_core_keyword: Option<String>,
}

// ── Extractor outputs ──

/// Section name → whether its pattern matched anywhere in the monolith.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonolithExtraction(pub BTreeMap<String, bool>);

impl MonolithExtraction {
    pub fn presence(&self, section: &str) -> Option<bool> {
        self.0.get(section).copied()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionKeywords {
    pub found: BTreeSet<String>,
    pub missing: BTreeSet<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModularExtraction {
    pub sections: BTreeMap<String, SectionKeywords>,
    pub plans_detected: BTreeSet<String>,
    pub plan_count_distinct: usize,
    pub mcp_markers: BTreeSet<String>,
    pub mcp_marker_count: usize,
    pub headings: BTreeSet<String>,
    pub files_scanned: usize,
}

// ── Diff (output) ──

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionDiff {
    pub in_monolith: Option<bool>,
    pub found_required: Vec<String>,
    pub missing_required: Vec<String>,
    pub coverage_pct: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plans_ok: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bonus_core_present: Option<bool>,
    pub optional: bool,
}

impl SectionDiff {
    /// A required section fails as soon as one required keyword is missing.
    pub fn is_failing(&self) -> bool {
        !self.optional && !self.missing_required.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiffSummary {
    pub plan_count_distinct: usize,
    pub mcp_marker_count: usize,
    pub headings_count: usize,
    pub headings_sample: Vec<String>,
    pub failing_sections: Vec<String>,
    pub passed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiffReport {
    pub sections: BTreeMap<String, SectionDiff>,
    pub summary: DiffSummary,
}

// ── Tests ──
