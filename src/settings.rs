use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;

const DEFAULT_MONOLITH: &str = "../archive/backups/cabinet-backup.html";
const DEFAULT_ROOT: &str = "..";
const DEFAULT_GLOBS: &[&str] = &["js/services/cabinet*.js", "js/services/*.js", "cabinet.html"];
const DEFAULT_CONTENT_MAP: &str = "content_map.json";
const DEFAULT_REPORTS_DIR: &str = "reports";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub monolith_path: PathBuf,
    pub modular_root: PathBuf,
    pub modular_globs: Vec<String>,
    pub content_map_path: PathBuf,
    pub rules_path: Option<PathBuf>,
    pub reports_dir: PathBuf,
}

/// Command-line overrides, applied on top of the settings file.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct Overrides {
    /// Settings file (toml, json or yaml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Legacy monolith HTML snapshot
    #[arg(long, global = true)]
    pub monolith: Option<PathBuf>,
    /// Root directory the modular globs are resolved against
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,
    /// Modular source glob (repeatable, replaces the configured list)
    #[arg(long = "glob", global = true)]
    pub globs: Vec<String>,
    /// Content map JSON
    #[arg(long, global = true)]
    pub content_map: Option<PathBuf>,
    /// Pattern rules JSON (builtin tables when omitted)
    #[arg(long, global = true)]
    pub rules: Option<PathBuf>,
    /// Directory for extraction and diff artifacts
    #[arg(long, global = true)]
    pub reports_dir: Option<PathBuf>,
}

impl Settings {
    /// Layer defaults, the optional settings file, then CLI overrides.
    pub fn load(overrides: &Overrides) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("monolith_path", DEFAULT_MONOLITH)?
            .set_default("modular_root", DEFAULT_ROOT)?
            .set_default(
                "modular_globs",
                DEFAULT_GLOBS.iter().map(|g| g.to_string()).collect::<Vec<_>>(),
            )?
            .set_default("content_map_path", DEFAULT_CONTENT_MAP)?
            .set_default("reports_dir", DEFAULT_REPORTS_DIR)?;

        if let Some(path) = &overrides.config {
            builder = builder.add_source(File::from(path.as_path()).required(true));
        }

        builder = builder
            .set_override_option("monolith_path", path_value(&overrides.monolith))?
            .set_override_option("modular_root", path_value(&overrides.root))?
            .set_override_option("content_map_path", path_value(&overrides.content_map))?
            .set_override_option("rules_path", path_value(&overrides.rules))?
            .set_override_option("reports_dir", path_value(&overrides.reports_dir))?;
        if !overrides.globs.is_empty() {
            builder = builder.set_override("modular_globs", overrides.globs.clone())?;
        }

        builder
            .build()
            .context("Failed to read settings")?
            .try_deserialize()
            .context("Invalid settings")
    }

    pub fn report_path(&self, name: &str) -> PathBuf {
        self.reports_dir.join(name)
    }
}

fn path_value(path: &Option<PathBuf>) -> Option<String> {
    path.as_deref()
        .map(Path::to_string_lossy)
        .map(|p| p.into_owned())
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_legacy_layout() {
        let s = Settings::load(&Overrides::default()).unwrap();
        assert_eq!(s.monolith_path, PathBuf::from(DEFAULT_MONOLITH));
        assert_eq!(s.modular_globs.len(), 3);
        assert_eq!(s.rules_path, None);
        assert_eq!(s.report_path("diff_report.md"), PathBuf::from("reports/diff_report.md"));
    }

    #[test]
    fn file_then_cli_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("content_diff.toml");
        std::fs::write(
            &file,
            "reports_dir = \"out\"\nmodular_root = \"site\"\nmodular_globs = [\"modules/**/*.js\"]\n",
        )
        .unwrap();

        let overrides = Overrides {
            config: Some(file),
            root: Some(PathBuf::from("other")),
            rules: Some(PathBuf::from("rules.json")),
            ..Default::default()
        };
        let s = Settings::load(&overrides).unwrap();
        assert_eq!(s.reports_dir, PathBuf::from("out"));
        assert_eq!(s.modular_root, PathBuf::from("other"));
        assert_eq!(s.modular_globs, vec!["modules/**/*.js".to_string()]);
        assert_eq!(s.rules_path, Some(PathBuf::from("rules.json")));
    }

    #[test]
    fn missing_settings_file_is_an_error() {
        let overrides = Overrides {
            config: Some(PathBuf::from("no/such/settings.toml")),
            ..Default::default()
        };
        assert!(Settings::load(&overrides).is_err());
    }
}
