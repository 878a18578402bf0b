//! Pattern tables driving both extractors.
//!
//! Every table is compiled once when the rules are loaded. A rules file only
//! needs to name the tables it overrides; the rest fall back to the builtin
//! GENESIS cabinet tables below.

use std::collections::BTreeMap;
use std::path::Path;

use regex::{Regex, RegexBuilder};
use serde::Deserialize;

use crate::error::{ContentDiffError, ContentDiffResult};

const MONOLITH_PATTERNS: &[(&str, &str)] = &[
    ("portfolio", r#"<h2 class="page-title">.*?Портфель.*?</h2>"#),
    ("bonuses", r"Бонусная программа GENESIS"),
    ("multipliers", r"Множители доходности"),
    ("gifts", r"Подарочн"),
    ("referrals", r"Реферальная программа"),
    ("settings", r"Настройки"),
    ("rank", r"Ранговая система"),
    ("experience", r"Стаж.*в системе"),
];

const KEYWORDS: &[(&str, &[&str])] = &[
    ("dashboard", &["Инвестиционный портфель", "Активные депозиты", "Создать депозит"]),
    (
        "portfolio",
        &["Инвестиционный портфель", "Планы депозитов", "STARTER", "ULTIMATE", "Инвестировано", "Доход в день"],
    ),
    ("bonuses", &["Бонусная программа", "БОНУСНАЯ 1000", "Множители доходности", "Активные множители"]),
    ("multipliers", &["Множители доходности", "Эффект множителей", "Активные множители", "Бустер x2"]),
    ("gifts", &["Подарочная система", "Приветственный бонус", "Первый депозит", "Предстоящие подарки"]),
    ("referrals", &["Реферальная программа", "Ваша реферальная ссылка", "Всего рефералов"]),
    ("settings", &["Настройки", "Тема оформления", "Профиль пользователя"]),
    ("rank", &["Ранговая система", "Ранговая лестница", "Бронза", "Бронзовый"]),
    ("experience", &["Стаж в системе", "Дней в системе", "Достижения"]),
];

// Inflected forms that a plain substring search misses.
const VARIANTS: &[(&str, &str)] = &[
    ("Первый депозит", r"Перв(ый|ого) депозит"),
    ("Инвестировано", r"Инвестирован[оа]"),
    ("Доход в день", r"Доход.*день"),
    ("Активные множители", r"Активн(ые|ых) множител"),
    ("Ранговая лестница", r"Ранговая лестниц"),
    ("Дней в системе", r"Дн(ей|я) в системе"),
];

const PLAN_PATTERN: &str =
    r"\b(STARTER|BASIC|STANDARD|ADVANCED|PROFESSIONAL|EXPERT|MASTER|PREMIUM|GOLD|PLATINUM|DIAMOND|ELITE|ULTIMATE)\b";
const MARKER_PATTERN: &str = r#"MCP-MARKER:[^\s"']+"#;
const HEADING_PATTERN: &str = r#"(?is)<h2[^>]*class="[^"]*page-title[^"]*"[^>]*>(.*?)</h2>"#;

/// A canonical phrase, its inflection pattern, and every section listing it.
#[derive(Debug, Clone)]
pub struct VariantRule {
    pub canonical: String,
    pub pattern: Regex,
    pub owners: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Rules {
    pub monolith_patterns: Vec<(String, Regex)>,
    pub keywords: BTreeMap<String, Vec<String>>,
    pub variants: Vec<VariantRule>,
    pub plan_pattern: Regex,
    pub marker_pattern: Regex,
    pub heading_pattern: Regex,
}

/// On-disk shape of a rules file. Absent tables keep their builtin value.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RulesFile {
    monolith_patterns: Option<BTreeMap<String, String>>,
    keywords: Option<BTreeMap<String, Vec<String>>>,
    variants: Option<BTreeMap<String, String>>,
    plan_pattern: Option<String>,
    marker_pattern: Option<String>,
    heading_pattern: Option<String>,
}

impl Rules {
    pub fn builtin() -> ContentDiffResult<Self> {
        Self::compile(RulesFile::default())
    }

    pub fn from_file(path: &Path) -> ContentDiffResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| ContentDiffError::RulesFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let file: RulesFile = serde_json::from_str(&raw).map_err(|e| ContentDiffError::RulesFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::compile(file)
    }

    /// Load `path` when given, the builtin tables otherwise.
    pub fn load(path: Option<&Path>) -> ContentDiffResult<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => Self::builtin(),
        }
    }

    fn compile(file: RulesFile) -> ContentDiffResult<Self> {
        let monolith_src: Vec<(String, String)> = match file.monolith_patterns {
            Some(map) => map.into_iter().collect(),
            None => owned_pairs(MONOLITH_PATTERNS),
        };
        let keywords: BTreeMap<String, Vec<String>> = file.keywords.unwrap_or_else(|| {
            KEYWORDS
                .iter()
                .map(|(section, words)| {
                    (section.to_string(), words.iter().map(|w| w.to_string()).collect())
                })
                .collect()
        });
        let variant_src: Vec<(String, String)> = match file.variants {
            Some(map) => map.into_iter().collect(),
            None => owned_pairs(VARIANTS),
        };

        let monolith_patterns = monolith_src
            .into_iter()
            .map(|(name, src)| {
                let re = compile_pattern(&name, &src, true)?;
                Ok((name, re))
            })
            .collect::<ContentDiffResult<Vec<_>>>()?;

        let mut variants = Vec::with_capacity(variant_src.len());
        for (canonical, src) in variant_src {
            let owners: Vec<String> = keywords
                .iter()
                .filter(|(_, words)| words.contains(&canonical))
                .map(|(section, _)| section.clone())
                .collect();
            if owners.is_empty() {
                return Err(ContentDiffError::OrphanVariant(canonical));
            }
            let pattern = compile_pattern(&canonical, &src, true)?;
            variants.push(VariantRule { canonical, pattern, owners });
        }

        let plan_pattern = compile_pattern(
            "plan_pattern",
            file.plan_pattern.as_deref().unwrap_or(PLAN_PATTERN),
            false,
        )?;
        let marker_pattern = compile_pattern(
            "marker_pattern",
            file.marker_pattern.as_deref().unwrap_or(MARKER_PATTERN),
            false,
        )?;
        let heading_pattern = compile_pattern(
            "heading_pattern",
            file.heading_pattern.as_deref().unwrap_or(HEADING_PATTERN),
            false,
        )?;

        Ok(Rules {
            monolith_patterns,
            keywords,
            variants,
            plan_pattern,
            marker_pattern,
            heading_pattern,
        })
    }
}

fn owned_pairs(table: &[(&str, &str)]) -> Vec<(String, String)> {
    table.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

fn compile_pattern(name: &str, src: &str, case_insensitive: bool) -> ContentDiffResult<Regex> {
    RegexBuilder::new(src)
        .case_insensitive(case_insensitive)
        .build()
        .map_err(|source| ContentDiffError::InvalidPattern {
            name: name.to_string(),
            source,
        })
}

// ── Tests ──
