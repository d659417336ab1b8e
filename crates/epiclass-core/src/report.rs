//! Scenario comparison reports with JSON persistence and Markdown rendering.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::scenario::ScenarioSummary;

/// A complete comparison of one scenario set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    pub set_id: String,
    pub set_name: String,
    /// Name of the reference scenario.
    pub baseline: String,
    /// One summary per scenario that ran, in declaration order.
    pub summaries: Vec<ScenarioSummary>,
    /// Every non-baseline scenario against the baseline.
    pub deltas: Vec<ScenarioDelta>,
    /// Total wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

/// Difference between one scenario and the baseline. Positive means better.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioDelta {
    pub name: String,
    pub exposures_averted: f64,
    pub deaths_averted: f64,
    /// Relative reduction of the infectious peak, in `[0, 1]` when the peak drops.
    pub peak_reduction: f64,
    /// Days by which the peak moved later (negative: earlier).
    pub peak_delay_days: Option<i64>,
}

impl ScenarioDelta {
    pub fn between(baseline: &ScenarioSummary, scenario: &ScenarioSummary) -> Self {
        let peak_reduction = if baseline.peak_infectious > 0.0 {
            1.0 - scenario.peak_infectious / baseline.peak_infectious
        } else {
            0.0
        };
        let peak_delay_days = match (baseline.peak_day, scenario.peak_day) {
            (Some(b), Some(s)) => Some(i64::from(s) - i64::from(b)),
            _ => None,
        };

        Self {
            name: scenario.name.clone(),
            exposures_averted: baseline.total_exposures - scenario.total_exposures,
            deaths_averted: baseline.total_deaths - scenario.total_deaths,
            peak_reduction,
            peak_delay_days,
        }
    }
}

impl ComparisonReport {
    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: ComparisonReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    pub fn summary(&self, name: &str) -> Option<&ScenarioSummary> {
        self.summaries.iter().find(|s| s.name == name)
    }

    /// The scenario with the fewest cumulative exposures.
    pub fn best_scenario(&self) -> Option<&ScenarioSummary> {
        self.summaries
            .iter()
            .min_by(|a, b| a.total_exposures.total_cmp(&b.total_exposures))
    }

    /// Render as a Markdown document.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();
        let _ = writeln!(md, "# Scenario comparison: {}\n", self.set_name);
        let _ = writeln!(md, "Baseline: **{}**\n", self.baseline);
        let _ = writeln!(
            md,
            "| Scenario | Peak infectious | Peak day | Total exposures | Deaths | Attack rate |"
        );
        let _ = writeln!(md, "|---|---:|---:|---:|---:|---:|");
        for s in &self.summaries {
            let peak_day = s
                .peak_day
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".into());
            let _ = writeln!(
                md,
                "| {} | {:.1} | {} | {:.1} | {:.1} | {:.1}% |",
                s.name,
                s.peak_infectious,
                peak_day,
                s.total_exposures,
                s.total_deaths,
                s.attack_rate * 100.0
            );
        }

        if !self.deltas.is_empty() {
            let _ = writeln!(md, "\n## Against baseline\n");
            for d in &self.deltas {
                let delay = d
                    .peak_delay_days
                    .map(|days| format!(", peak moved {days:+} days"))
                    .unwrap_or_default();
                let _ = writeln!(
                    md,
                    "- **{}**: {:.1} exposures averted, {:.1} deaths averted, peak {:.1}% lower{}",
                    d.name,
                    d.exposures_averted,
                    d.deaths_averted,
                    d.peak_reduction * 100.0,
                    delay
                );
            }
        }

        md
    }
}
