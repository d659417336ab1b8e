//! Scenario comparison.
//!
//! A scenario set holds a base parameter set and several named scenarios
//! (intervention lists plus optional parameter overrides). Runs are
//! independent, so the runner executes them with bounded parallelism on
//! tokio's blocking pool.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::NaiveDate;
use futures::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::model::{DaySnapshot, Intervention, SimulationParams};
use crate::report::{ComparisonReport, ScenarioDelta};
use crate::simulation::simulate;

/// Per-scenario replacements for base parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamOverrides {
    #[serde(default)]
    pub population_size: Option<f64>,
    #[serde(default)]
    pub initial_infectious: Option<f64>,
    #[serde(default)]
    pub initial_exposed: Option<f64>,
    #[serde(default)]
    pub r0: Option<f64>,
    #[serde(default)]
    pub incubation_rate: Option<f64>,
    #[serde(default)]
    pub recovery_rate: Option<f64>,
    #[serde(default)]
    pub fatality_fraction: Option<f64>,
    #[serde(default)]
    pub horizon_days: Option<u32>,
}

/// One named what-if run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub interventions: Vec<Intervention>,
    #[serde(default)]
    pub overrides: ParamOverrides,
}

impl Scenario {
    /// Parameters for this scenario: the base with overrides and interventions applied.
    pub fn params(&self, base: &SimulationParams) -> SimulationParams {
        let o = &self.overrides;
        SimulationParams {
            population_size: o.population_size.unwrap_or(base.population_size),
            initial_infectious: o.initial_infectious.unwrap_or(base.initial_infectious),
            initial_exposed: o.initial_exposed.unwrap_or(base.initial_exposed),
            r0: o.r0.unwrap_or(base.r0),
            incubation_rate: o.incubation_rate.unwrap_or(base.incubation_rate),
            recovery_rate: o.recovery_rate.unwrap_or(base.recovery_rate),
            fatality_fraction: o.fatality_fraction.unwrap_or(base.fatality_fraction),
            horizon_days: o.horizon_days.unwrap_or(base.horizon_days),
            interventions: base
                .interventions
                .iter()
                .chain(&self.interventions)
                .copied()
                .collect(),
            start_date: base.start_date,
        }
    }
}

/// A collection of scenarios sharing base parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSet {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Name of the reference scenario; the first scenario when unset.
    #[serde(default)]
    pub baseline: Option<String>,
    pub base: SimulationParams,
    pub scenarios: Vec<Scenario>,
}

impl ScenarioSet {
    /// The scenario other runs are compared against: the named baseline, or
    /// the first scenario. `None` only for a set with no scenarios.
    pub fn baseline_scenario(&self) -> Option<&Scenario> {
        self.baseline
            .as_ref()
            .and_then(|name| self.scenarios.iter().find(|s| &s.name == name))
            .or_else(|| self.scenarios.first())
    }
}

/// Headline numbers of a single run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSummary {
    pub name: String,
    pub days: u32,
    pub peak_infectious: f64,
    pub peak_day: Option<u32>,
    pub peak_date: Option<NaiveDate>,
    pub total_exposures: f64,
    pub total_deaths: f64,
    pub final_susceptible: f64,
    pub final_removed: f64,
    /// Cumulative exposures as a fraction of the population.
    pub attack_rate: f64,
}

/// Reduce a run to its headline numbers.
pub fn summarize(
    name: &str,
    params: &SimulationParams,
    snapshots: &[DaySnapshot],
) -> ScenarioSummary {
    let peak = snapshots
        .iter()
        .max_by(|a, b| a.infectious.total_cmp(&b.infectious));
    let total_exposures: f64 = snapshots.iter().map(|s| s.new_exposures).sum();
    let total_deaths: f64 = snapshots.iter().map(|s| s.new_deaths).sum();
    let last = snapshots.last();
    let initial_susceptible =
        (params.population_size - params.initial_infectious - params.initial_exposed).max(0.0);

    ScenarioSummary {
        name: name.to_string(),
        days: snapshots.len() as u32,
        peak_infectious: peak.map(|s| s.infectious).unwrap_or(params.initial_infectious),
        peak_day: peak.map(|s| s.day),
        peak_date: peak.map(|s| s.date),
        total_exposures,
        total_deaths,
        final_susceptible: last.map(|s| s.susceptible).unwrap_or(initial_susceptible),
        final_removed: last.map(|s| s.removed).unwrap_or(0.0),
        attack_rate: if params.population_size > 0.0 {
            total_exposures / params.population_size
        } else {
            0.0
        },
    }
}

/// A finished scenario run.
#[derive(Debug, Clone)]
pub struct ScenarioOutcome {
    pub scenario: Scenario,
    pub params: SimulationParams,
    pub snapshots: Vec<DaySnapshot>,
    pub summary: ScenarioSummary,
}

/// Progress reporting trait.
pub trait ProgressReporter: Send + Sync {
    fn on_scenario_start(&self, name: &str);
    fn on_scenario_complete(&self, summary: &ScenarioSummary, elapsed: Duration);
    fn on_scenario_error(&self, name: &str, error: &str);
    fn on_set_complete(&self, total: usize, failed: usize, elapsed: Duration);
}

/// No-op progress reporter.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_scenario_start(&self, _: &str) {}
    fn on_scenario_complete(&self, _: &ScenarioSummary, _: Duration) {}
    fn on_scenario_error(&self, _: &str, _: &str) {}
    fn on_set_complete(&self, _: usize, _: usize, _: Duration) {}
}

/// Runs every scenario of a set and compares them against the baseline.
pub struct ScenarioRunner {
    parallelism: usize,
}

impl Default for ScenarioRunner {
    fn default() -> Self {
        Self { parallelism: 4 }
    }
}

impl ScenarioRunner {
    pub fn new(parallelism: usize) -> Self {
        Self {
            parallelism: parallelism.max(1),
        }
    }

    /// Run all scenarios and return their outcomes in declaration order.
    ///
    /// Scenarios that fail to simulate are reported and left out.
    pub async fn run_all(
        &self,
        set: &ScenarioSet,
        progress: &dyn ProgressReporter,
    ) -> Result<Vec<ScenarioOutcome>> {
        let start = Instant::now();
        let semaphore = Arc::new(Semaphore::new(self.parallelism));
        let mut futures = FuturesUnordered::new();

        for (index, scenario) in set.scenarios.iter().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            let scenario = scenario.clone();
            let params = scenario.params(&set.base);
            progress.on_scenario_start(&scenario.name);

            futures.push(async move {
                let name = scenario.name.clone();
                let inner = async move {
                    let _permit = semaphore
                        .acquire_owned()
                        .await
                        .map_err(|_| anyhow::anyhow!("semaphore closed"))?;

                    let run_start = Instant::now();
                    let outcome = tokio::task::spawn_blocking(move || {
                        let snapshots = simulate(&params)?;
                        let summary = summarize(&scenario.name, &params, &snapshots);
                        Ok::<_, anyhow::Error>(ScenarioOutcome {
                            scenario,
                            params,
                            snapshots,
                            summary,
                        })
                    })
                    .await??;
                    Ok::<_, anyhow::Error>((outcome, run_start.elapsed()))
                };
                (index, name, inner.await)
            });
        }

        let total = futures.len();
        let mut outcomes = Vec::with_capacity(total);
        let mut failed = 0usize;

        while let Some((index, name, result)) = futures.next().await {
            match result {
                Ok((outcome, elapsed)) => {
                    progress.on_scenario_complete(&outcome.summary, elapsed);
                    outcomes.push((index, outcome));
                }
                Err(e) => {
                    tracing::error!("scenario '{name}' failed: {e:#}");
                    progress.on_scenario_error(&name, &e.to_string());
                    failed += 1;
                }
            }
        }

        outcomes.sort_by_key(|(index, _)| *index);
        let elapsed = start.elapsed();
        progress.on_set_complete(total, failed, elapsed);
        tracing::info!(
            set = %set.id,
            scenarios = total,
            failed,
            "scenario set finished in {:.2}s",
            elapsed.as_secs_f64()
        );

        Ok(outcomes.into_iter().map(|(_, o)| o).collect())
    }

    /// Run all scenarios and build a comparison against the baseline.
    pub async fn compare(
        &self,
        set: &ScenarioSet,
        progress: &dyn ProgressReporter,
    ) -> Result<ComparisonReport> {
        let Some(baseline) = set.baseline_scenario() else {
            anyhow::bail!("scenario set {} defines no scenarios", set.id);
        };
        let baseline_name = baseline.name.clone();

        let start = Instant::now();
        let outcomes = self.run_all(set, progress).await?;

        let baseline = outcomes
            .iter()
            .find(|o| o.scenario.name == baseline_name)
            .map(|o| o.summary.clone())
            .ok_or_else(|| anyhow::anyhow!("baseline scenario '{baseline_name}' did not run"))?;

        let summaries: Vec<ScenarioSummary> = outcomes.into_iter().map(|o| o.summary).collect();
        let deltas = summaries
            .iter()
            .filter(|s| s.name != baseline.name)
            .map(|s| ScenarioDelta::between(&baseline, s))
            .collect();

        Ok(ComparisonReport {
            id: Uuid::new_v4(),
            created_at: chrono::Utc::now(),
            set_id: set.id.clone(),
            set_name: set.name.clone(),
            baseline: baseline.name.clone(),
            summaries,
            deltas,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }
}
