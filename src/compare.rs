use std::collections::{BTreeMap, BTreeSet};

use tracing::info;

use crate::model::{
    ContentMap, DiffReport, DiffSummary, ModularExtraction, MonolithExtraction, SectionDiff,
    SectionKeywords, SectionRule, BONUS_CORE_KEYWORD,
};

const HEADINGS_SAMPLE: usize = 10;

/// Build the diff for every section named in the content map.
///
/// Sections only present in the extractions are ignored; sections missing
/// from the modular extraction count as having found nothing.
pub fn compare(
    map: &ContentMap,
    monolith: &MonolithExtraction,
    modular: &ModularExtraction,
) -> DiffReport {
    let empty = SectionKeywords::default();

    let sections: BTreeMap<String, SectionDiff> = map
        .sections
        .iter()
        .map(|(name, rule)| {
            let entry = modular.sections.get(name).unwrap_or(&empty);
            let diff = section_diff(rule, monolith.presence(name), entry, modular);
            (name.clone(), diff)
        })
        .collect();

    let failing_sections: Vec<String> = sections
        .iter()
        .filter(|(_, d)| d.is_failing())
        .map(|(name, _)| name.clone())
        .collect();

    let summary = DiffSummary {
        plan_count_distinct: modular.plan_count_distinct,
        mcp_marker_count: modular.mcp_marker_count,
        headings_count: modular.headings.len(),
        headings_sample: modular.headings.iter().take(HEADINGS_SAMPLE).cloned().collect(),
        passed: failing_sections.is_empty(),
        failing_sections,
    };

    info!(
        sections = sections.len(),
        failing = summary.failing_sections.len(),
        "comparison complete"
    );

    DiffReport { sections, summary }
}

fn section_diff(
    rule: &SectionRule,
    in_monolith: Option<bool>,
    entry: &SectionKeywords,
    modular: &ModularExtraction,
) -> SectionDiff {
    let required: BTreeSet<&String> = rule.required_keywords.iter().collect();
    let (found_required, missing_required): (Vec<String>, Vec<String>) = required
        .iter()
        .map(|k| (*k).clone())
        .partition(|k| entry.found.contains(k));

    let plans_ok = rule
        .min_plan_count
        .map(|min| modular.plan_count_distinct >= min);
    let bonus_core_present = rule.min_bonus_categories.map(|_| {
        let core = rule.bonus_core_keyword.as_deref().unwrap_or(BONUS_CORE_KEYWORD);
        entry.found.contains(core)
    });

    SectionDiff {
        in_monolith,
        coverage_pct: coverage_pct(found_required.len(), required.len()),
        found_required,
        missing_required,
        plans_ok,
        bonus_core_present,
        optional: rule.optional,
    }
}

/// Percentage of required keywords found, rounded to one decimal with ties to even.
pub fn coverage_pct(found: usize, required: usize) -> f64 {
    if required == 0 {
        return 100.0;
    }
    let pct = found as f64 / required as f64 * 100.0;
    (pct * 10.0).round_ties_even() / 10.0
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn content_map(json: &str) -> ContentMap {
        serde_json::from_str(json).unwrap()
    }

    fn modular_with(section: &str, found: &[&str]) -> ModularExtraction {
        let mut m = ModularExtraction::default();
        m.sections.insert(
            section.to_string(),
            SectionKeywords {
                found: found.iter().map(|s| s.to_string()).collect(),
                missing: BTreeSet::new(),
            },
        );
        m
    }

    const DASHBOARD: &str = r#"{"sections": {"dashboard": {"required_keywords": ["Investment Portfolio", "Active Deposits"], "optional": false}}}"#;
    const DASHBOARD_OPTIONAL: &str = r#"{"sections": {"dashboard": {"required_keywords": ["Investment Portfolio", "Active Deposits"], "optional": true}}}"#;

    #[test]
    fn full_coverage_passes() {
        let modular = modular_with("dashboard", &["Investment Portfolio", "Active Deposits"]);
        let report = compare(&content_map(DASHBOARD), &MonolithExtraction::default(), &modular);
        let d = &report.sections["dashboard"];
        assert_eq!(d.coverage_pct, 100.0);
        assert!(d.missing_required.is_empty());
        assert!(report.summary.passed);
        assert!(report.summary.failing_sections.is_empty());
    }

    #[test]
    fn partial_coverage_fails_required_section() {
        let modular = modular_with("dashboard", &["Active Deposits"]);
        let report = compare(&content_map(DASHBOARD), &MonolithExtraction::default(), &modular);
        let d = &report.sections["dashboard"];
        assert_eq!(d.coverage_pct, 50.0);
        assert_eq!(d.missing_required, vec!["Investment Portfolio".to_string()]);
        assert!(!report.summary.passed);
        assert_eq!(report.summary.failing_sections, vec!["dashboard".to_string()]);
    }

    #[test]
    fn partial_coverage_of_optional_section_still_passes() {
        let modular = modular_with("dashboard", &["Active Deposits"]);
        let report = compare(&content_map(DASHBOARD_OPTIONAL), &MonolithExtraction::default(), &modular);
        let d = &report.sections["dashboard"];
        assert_eq!(d.coverage_pct, 50.0);
        assert_eq!(d.missing_required, vec!["Investment Portfolio".to_string()]);
        assert!(d.optional);
        assert!(report.summary.passed);
    }

    #[test]
    fn empty_requirements_are_fully_covered() {
        let map = content_map(r#"{"sections": {"settings": {"required_keywords": []}}}"#);
        let mut modular = modular_with("settings", &["Настройки"]);
        modular.sections.get_mut("settings").unwrap().missing.insert("Тема оформления".into());
        let report = compare(&map, &MonolithExtraction::default(), &modular);
        assert_eq!(report.sections["settings"].coverage_pct, 100.0);
        assert!(report.summary.passed);
    }

    #[test]
    fn absent_modular_section_is_all_missing() {
        let report = compare(&content_map(DASHBOARD), &MonolithExtraction::default(), &ModularExtraction::default());
        let d = &report.sections["dashboard"];
        assert_eq!(d.coverage_pct, 0.0);
        assert_eq!(d.missing_required.len(), 2);
        assert_eq!(d.in_monolith, None);
    }

    #[test]
    fn found_and_missing_partition_required() {
        let map = content_map(
            r#"{"sections": {"rank": {"required_keywords": ["C", "A", "B", "A"]}}}"#,
        );
        let modular = modular_with("rank", &["A", "Z"]);
        let d = &compare(&map, &MonolithExtraction::default(), &modular).sections["rank"];
        assert_eq!(d.found_required, vec!["A".to_string()]);
        assert_eq!(d.missing_required, vec!["B".to_string(), "C".to_string()]);
        assert_eq!(d.coverage_pct, 33.3);
    }

    #[test]
    fn extra_extraction_sections_are_ignored() {
        let mut modular = modular_with("dashboard", &["Investment Portfolio", "Active Deposits"]);
        modular.sections.insert("unmapped".into(), SectionKeywords::default());
        let mut monolith = MonolithExtraction::default();
        monolith.0.insert("dashboard".into(), true);
        monolith.0.insert("unmapped".into(), false);
        let report = compare(&content_map(DASHBOARD), &monolith, &modular);
        assert_eq!(report.sections.len(), 1);
        assert_eq!(report.sections["dashboard"].in_monolith, Some(true));
    }

    #[test]
    fn thresholds_only_reported_when_configured() {
        let map = content_map(
            r#"{"sections": {
                "portfolio": {"required_keywords": [], "min_plan_count": 3},
                "bonuses": {"required_keywords": [], "min_bonus_categories": 1},
                "gifts": {"required_keywords": []}
            }}"#,
        );
        let mut modular = modular_with("bonuses", &["БОНУСНАЯ 1000"]);
        modular.plan_count_distinct = 2;

        let report = compare(&map, &MonolithExtraction::default(), &modular);
        assert_eq!(report.sections["portfolio"].plans_ok, Some(false));
        assert_eq!(report.sections["bonuses"].bonus_core_present, Some(true));
        assert_eq!(report.sections["gifts"].plans_ok, None);
        assert_eq!(report.sections["gifts"].bonus_core_present, None);

        let json = serde_json::to_value(&report.sections["gifts"]).unwrap();
        assert!(json.get("plans_ok").is_none());
        assert!(json["in_monolith"].is_null());
    }

    #[test]
    fn custom_bonus_core_keyword() {
        let map = content_map(
            r#"{"sections": {"bonuses": {"min_bonus_categories": 1, "bonus_core_keyword": "Welcome"}}}"#,
        );
        let modular = modular_with("bonuses", &["БОНУСНАЯ 1000"]);
        let report = compare(&map, &MonolithExtraction::default(), &modular);
        assert_eq!(report.sections["bonuses"].bonus_core_present, Some(false));
    }

    #[test]
    fn headings_sample_is_bounded() {
        let mut modular = ModularExtraction::default();
        modular.headings = (0..25).map(|i| format!("Heading {i:02}")).collect();
        let report = compare(&ContentMap::default(), &MonolithExtraction::default(), &modular);
        assert_eq!(report.summary.headings_count, 25);
        assert_eq!(report.summary.headings_sample.len(), 10);
        assert_eq!(report.summary.headings_sample[0], "Heading 00");
    }

    #[test]
    fn coverage_rounding() {
        assert_eq!(coverage_pct(0, 0), 100.0);
        assert_eq!(coverage_pct(2, 3), 66.7);
        assert_eq!(coverage_pct(1, 6), 16.7);
        assert_eq!(coverage_pct(4, 4), 100.0);
        assert_eq!(coverage_pct(1, 16), 6.2);
        assert_eq!(coverage_pct(5, 16), 31.2);
        assert_eq!(coverage_pct(3, 16), 18.8);
    }
}
