//! The `epiclass simulate` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Args;
use comfy_table::{Cell, Table};

use epiclass_core::config::load_config_from;
use epiclass_core::model::{DaySnapshot, Intervention};
use epiclass_core::scenario::summarize;
use epiclass_core::simulation::{check_params, simulate};

#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Population size
    #[arg(long)]
    population: Option<f64>,

    /// Infectious individuals on day zero
    #[arg(long)]
    infectious: Option<f64>,

    /// Exposed individuals on day zero
    #[arg(long)]
    exposed: Option<f64>,

    /// Basic reproduction number
    #[arg(long)]
    r0: Option<f64>,

    /// Daily E -> I rate (1 / mean incubation period)
    #[arg(long)]
    incubation_rate: Option<f64>,

    /// Daily I -> R rate (1 / mean infectious period)
    #[arg(long)]
    recovery_rate: Option<f64>,

    /// Fraction of removals that are deaths
    #[arg(long)]
    fatality: Option<f64>,

    /// Number of days to simulate
    #[arg(long)]
    days: Option<u32>,

    /// Transmission reduction as DAY:REDUCTION (repeatable), e.g. 14:0.4
    #[arg(long = "intervention", value_parser = crate::parse_intervention)]
    interventions: Vec<Intervention>,

    /// Calendar date of day zero (YYYY-MM-DD, default: today)
    #[arg(long)]
    start_date: Option<NaiveDate>,

    /// Print every Nth day in the table
    #[arg(long, default_value = "7")]
    every: u32,

    /// Write the full time series as JSON
    #[arg(long)]
    output: Option<PathBuf>,
}

pub fn execute(args: SimulateArgs, config_path: Option<PathBuf>) -> Result<()> {
    anyhow::ensure!(args.every >= 1, "--every must be at least 1");
    let config = load_config_from(config_path.as_deref())?;

    let mut params = config.simulation.to_params();
    if let Some(v) = args.population {
        params.population_size = v;
    }
    if let Some(v) = args.infectious {
        params.initial_infectious = v;
    }
    if let Some(v) = args.exposed {
        params.initial_exposed = v;
    }
    if let Some(v) = args.r0 {
        params.r0 = v;
    }
    if let Some(v) = args.incubation_rate {
        params.incubation_rate = v;
    }
    if let Some(v) = args.recovery_rate {
        params.recovery_rate = v;
    }
    if let Some(v) = args.fatality {
        params.fatality_fraction = v;
    }
    if let Some(v) = args.days {
        params.horizon_days = v;
    }
    params.interventions = args.interventions;
    params.start_date = args
        .start_date
        .unwrap_or_else(|| chrono::Utc::now().date_naive());

    for warning in check_params(&params) {
        eprintln!("Warning: {warning}");
    }

    let snapshots = simulate(&params)?;
    let summary = summarize("run", &params, &snapshots);

    print_table(&snapshots, args.every);

    println!(
        "Peak infectious: {:.1}{}",
        summary.peak_infectious,
        summary
            .peak_day
            .zip(summary.peak_date)
            .map(|(day, date)| format!(" on day {day} ({date})"))
            .unwrap_or_default()
    );
    println!(
        "Total exposures: {:.1} (attack rate {:.1}%)",
        summary.total_exposures,
        summary.attack_rate * 100.0
    );
    println!("Total deaths: {:.1}", summary.total_deaths);

    if let Some(path) = &args.output {
        let json = serde_json::to_string_pretty(&snapshots)
            .context("failed to serialize time series")?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write {}", path.display()))?;
        eprintln!("Time series saved to: {}", path.display());
    }

    Ok(())
}

fn print_table(snapshots: &[DaySnapshot], every: u32) {
    if snapshots.is_empty() {
        println!("No days simulated.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec![
        "Day",
        "Date",
        "Susceptible",
        "Exposed",
        "Infectious",
        "Removed",
        "New exposures",
        "Beta",
    ]);

    let last_day = snapshots.len() as u32 - 1;
    for s in snapshots
        .iter()
        .filter(|s| s.day % every == 0 || s.day == last_day)
    {
        table.add_row(vec![
            Cell::new(s.day),
            Cell::new(s.date),
            Cell::new(format!("{:.1}", s.susceptible)),
            Cell::new(format!("{:.1}", s.exposed)),
            Cell::new(format!("{:.1}", s.infectious)),
            Cell::new(format!("{:.1}", s.removed)),
            Cell::new(format!("{:.2}", s.new_exposures)),
            Cell::new(format!("{:.3}", s.effective_rate)),
        ]);
    }

    println!("{table}");
}
