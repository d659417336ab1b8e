//! The `epiclass compare` command.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use comfy_table::{Cell, Table};

use epiclass_core::config::load_config_from;
use epiclass_core::parser;
use epiclass_core::report::ComparisonReport;
use epiclass_core::scenario::{ProgressReporter, ScenarioRunner, ScenarioSummary};

/// Console progress reporter.
struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn on_scenario_start(&self, name: &str) {
        eprintln!("  Starting: {name}");
    }

    fn on_scenario_complete(&self, summary: &ScenarioSummary, elapsed: Duration) {
        eprintln!(
            "  Done: {} peak {:.1} exposures {:.1} ({}ms)",
            summary.name,
            summary.peak_infectious,
            summary.total_exposures,
            elapsed.as_millis()
        );
    }

    fn on_scenario_error(&self, name: &str, error: &str) {
        eprintln!("  ERROR: {name}: {error}");
    }

    fn on_set_complete(&self, total: usize, failed: usize, elapsed: Duration) {
        eprintln!(
            "\nComplete: {}/{total} succeeded, {failed} failed ({:.2}s)",
            total - failed,
            elapsed.as_secs_f64()
        );
    }
}

pub async fn execute(
    scenarios_path: PathBuf,
    output: Option<PathBuf>,
    format: String,
    parallelism: Option<usize>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    anyhow::ensure!(
        matches!(format.as_str(), "text" | "json" | "markdown"),
        "unknown format '{format}', expected text, json, or markdown"
    );
    let config = load_config_from(config_path.as_deref())?;
    let parallelism = parallelism.unwrap_or(config.parallelism);
    anyhow::ensure!(parallelism >= 1, "parallelism must be at least 1");

    let set = parser::parse_scenario_set(&scenarios_path)?;
    for w in parser::validate_scenario_set(&set) {
        let prefix = w.item.map(|n| format!("[{n}] ")).unwrap_or_default();
        eprintln!("Warning: {prefix}{}", w.message);
    }

    eprintln!(
        "Comparing {} scenario(s) from '{}'\n",
        set.scenarios.len(),
        set.name
    );

    let runner = ScenarioRunner::new(parallelism);
    let report = runner.compare(&set, &ConsoleReporter).await?;

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        "markdown" => print!("{}", report.to_markdown()),
        _ => print_text(&report),
    }

    if let Some(path) = output {
        report.save_json(&path)?;
        eprintln!("Report saved to: {}", path.display());
    }

    Ok(())
}

fn print_text(report: &ComparisonReport) {
    println!("{} (baseline: {})", report.set_name, report.baseline);

    let mut table = Table::new();
    table.set_header(vec![
        "Scenario",
        "Peak infectious",
        "Peak date",
        "Total exposures",
        "Deaths",
        "Attack rate",
    ]);
    for s in &report.summaries {
        let peak_date = s
            .peak_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".into());
        table.add_row(vec![
            Cell::new(&s.name),
            Cell::new(format!("{:.1}", s.peak_infectious)),
            Cell::new(peak_date),
            Cell::new(format!("{:.1}", s.total_exposures)),
            Cell::new(format!("{:.1}", s.total_deaths)),
            Cell::new(format!("{:.1}%", s.attack_rate * 100.0)),
        ]);
    }
    println!("{table}");

    for d in &report.deltas {
        println!(
            "  {}: {:.1} exposures averted, peak {:.1}% lower",
            d.name,
            d.exposures_averted,
            d.peak_reduction * 100.0
        );
    }
    if let Some(best) = report.best_scenario() {
        println!("\nFewest exposures: {}", best.name);
    }
}
