mod artifacts;
mod compare;
mod error;
mod extract;
mod files;
mod model;
mod report;
mod rules;
mod settings;

use std::process::ExitCode;
use std::time::Instant;

use anyhow::Result;
use clap::{Parser, Subcommand};
use itertools::Itertools;
use tracing::info;

use model::{ContentMap, ModularExtraction, MonolithExtraction, MODULAR_JSON, MONOLITH_JSON};
use rules::Rules;
use settings::{Overrides, Settings};

/// Exit status when a required section lost content.
const EXIT_COVERAGE_FAILED: u8 = 2;

#[derive(Parser)]
#[command(
    name = "content_diff",
    about = "Compare legacy monolith content against the modular cabinet sources"
)]
struct Cli {
    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect section presence in the monolith snapshot
    Monolith,
    /// Collect keywords, plans, markers and headings from the modular sources
    Modular,
    /// Diff both extractions against the content map and write the reports
    Compare,
    /// Monolith + modular + compare in one pipeline
    Run,
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<ExitCode> {
    init_tracing();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load(&cli.overrides)?;
    info!(settings = ?settings, "settings loaded");

    let result = match cli.command {
        Commands::Monolith => {
            let rules = Rules::load(settings.rules_path.as_deref())?;
            run_monolith(&settings, &rules)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Modular => {
            let rules = Rules::load(settings.rules_path.as_deref())?;
            run_modular(&settings, &rules)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Compare => run_compare(&settings),
        Commands::Run => {
            let rules = Rules::load(settings.rules_path.as_deref())?;
            run_monolith(&settings, &rules)?;
            run_modular(&settings, &rules)?;
            run_compare(&settings)
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn run_monolith(settings: &Settings, rules: &Rules) -> Result<()> {
    let extraction = extract::monolith::extract(&settings.monolith_path, &rules.monolith_patterns)?;
    let out = settings.report_path(MONOLITH_JSON);
    artifacts::write_json(&out, &extraction)?;
    println!("Monolith sections presence saved -> {}", out.display());
    Ok(())
}

fn run_modular(settings: &Settings, rules: &Rules) -> Result<()> {
    let files = files::resolve(&settings.modular_root, &settings.modular_globs)?;
    if files.is_empty() {
        println!("No modular sources matched; every keyword will be reported missing.");
    }
    let extraction = extract::modular::extract(&files, rules)?;
    let out = settings.report_path(MODULAR_JSON);
    artifacts::write_json(&out, &extraction)?;
    println!(
        "Modular content extracted ({} of {} files) -> {}",
        extraction.files_scanned,
        files.len(),
        out.display()
    );
    Ok(())
}

fn run_compare(settings: &Settings) -> Result<ExitCode> {
    let monolith: MonolithExtraction = artifacts::load_or_default(&settings.report_path(MONOLITH_JSON));
    let modular: ModularExtraction = artifacts::load_or_default(&settings.report_path(MODULAR_JSON));
    let content_map: ContentMap = artifacts::load_or_default(&settings.content_map_path);
    if content_map.sections.is_empty() {
        println!(
            "WARNING: content map {} has no sections; nothing will be compared.",
            settings.content_map_path.display()
        );
    }

    let diff = compare::compare(&content_map, &monolith, &modular);
    report::write(&settings.reports_dir, &diff)?;
    println!(
        "Diff generated -> {}",
        settings.reports_dir.display()
    );

    if diff.summary.passed {
        println!("All required sections covered ({} checked).", diff.sections.len());
        Ok(ExitCode::SUCCESS)
    } else {
        println!("FAILED SECTIONS: {}", diff.summary.failing_sections.iter().join(", "));
        Ok(ExitCode::from(EXIT_COVERAGE_FAILED))
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}
