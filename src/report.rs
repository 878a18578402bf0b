use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Utc};
use itertools::Itertools;

use crate::artifacts::{write_json, write_text};
use crate::model::{DiffReport, DIFF_JSON, DIFF_MD};

/// Write `diff_summary.json` and `diff_report.md` into `dir`.
pub fn write(dir: &Path, report: &DiffReport) -> Result<()> {
    write_json(&dir.join(DIFF_JSON), report)?;
    write_text(&dir.join(DIFF_MD), &render_markdown(report, Utc::now()))?;
    Ok(())
}

pub fn render_markdown(report: &DiffReport, generated_at: DateTime<Utc>) -> String {
    let summary = &report.summary;
    let mut out = String::new();
    out.push_str("# Monolith vs modular content coverage\n\n");
    out.push_str(&format!(
        "_Generated {}_\n\n",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    out.push_str("## Summary\n");
    out.push_str(&format!(
        "- Distinct plans: {}\n- MCP markers found: {}\n- Page headings: {}\n",
        summary.plan_count_distinct, summary.mcp_marker_count, summary.headings_count
    ));
    if !summary.headings_sample.is_empty() {
        out.push_str(&format!(
            "- Heading sample: {}\n",
            summary.headings_sample.iter().join(" | ")
        ));
    }
    if summary.passed {
        out.push_str("- Verdict: PASS\n");
    } else {
        out.push_str(&format!(
            "- Verdict: FAIL ({})\n",
            summary.failing_sections.iter().join(", ")
        ));
    }

    for (name, d) in &report.sections {
        out.push_str(&format!("\n## {}\n", name));
        let in_monolith = match d.in_monolith {
            Some(true) => "yes",
            Some(false) => "no",
            None => "unknown",
        };
        out.push_str(&format!("- In monolith: {}\n", in_monolith));
        out.push_str(&format!(
            "- Required found: {}/{}\n",
            d.found_required.len(),
            d.found_required.len() + d.missing_required.len()
        ));
        out.push_str(&format!("- Coverage: {:.1}%\n", d.coverage_pct));
        if !d.missing_required.is_empty() {
            out.push_str(&format!("- Missing: {}\n", d.missing_required.iter().join(", ")));
        }
        if let Some(ok) = d.plans_ok {
            out.push_str(&format!("- Plans covered: {}\n", ok));
        }
        if let Some(present) = d.bonus_core_present {
            out.push_str(&format!("- Core bonus present: {}\n", present));
        }
        out.push_str(&format!("- Optional: {}\n", d.optional));
    }

    out
}

// ── Tests ──
