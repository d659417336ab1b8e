//! TOML loaders for question banks and scenario sets.
//!
//! Files are parsed into intermediate structs first, then checked and
//! converted into the strongly typed model, so schema problems surface at
//! load time with the offending file and question named.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::model::{Intervention, Question, QuestionBank, SimulationParams, Tier};
use crate::scenario::{ParamOverrides, Scenario, ScenarioSet};
use crate::traits::QuestionPool;

// ---------------------------------------------------------------------------
// Question banks
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TomlBankFile {
    bank: TomlBankHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlBankHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    default_tier: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    text: String,
    options: Vec<String>,
    answer: String,
    #[serde(default)]
    tier: Option<String>,
    #[serde(default)]
    explanation: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
}

/// Parse a single TOML file into a `QuestionBank`.
pub fn parse_question_bank(path: &Path) -> Result<QuestionBank> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read question bank: {}", path.display()))?;

    parse_question_bank_str(&content, path)
}

/// Parse a TOML string into a `QuestionBank` (useful for testing).
pub fn parse_question_bank_str(content: &str, source_path: &Path) -> Result<QuestionBank> {
    let parsed: TomlBankFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let default_tier: Option<Tier> = parsed
        .bank
        .default_tier
        .map(|t| t.parse().map_err(|e: String| anyhow::anyhow!("{}", e)))
        .transpose()?;

    let questions = parsed
        .questions
        .into_iter()
        .enumerate()
        .map(|(i, q)| {
            let tier = match q.tier {
                Some(t) => t
                    .parse()
                    .map_err(|e: String| anyhow::anyhow!("question {}: {}", i + 1, e))?,
                None => default_tier.ok_or_else(|| {
                    anyhow::anyhow!(
                        "question {} has no tier and the bank sets no default_tier",
                        i + 1
                    )
                })?,
            };

            if !q.options.iter().any(|o| o.trim() == q.answer.trim()) {
                anyhow::bail!(
                    "question {} (\"{}\"): answer \"{}\" is not one of its options",
                    i + 1,
                    q.text.trim(),
                    q.answer
                );
            }

            Ok(Question {
                text: q.text.trim().to_string(),
                options: q.options,
                answer: q.answer,
                tier,
                explanation: q.explanation,
                tags: q.tags,
            })
        })
        .collect::<Result<Vec<_>>>()
        .with_context(|| format!("invalid question bank: {}", source_path.display()))?;

    Ok(QuestionBank {
        id: parsed.bank.id,
        name: parsed.bank.name,
        description: parsed.bank.description,
        questions,
    })
}

/// Recursively load all `.toml` question banks from a directory.
pub fn load_bank_directory(dir: &Path) -> Result<Vec<QuestionBank>> {
    let mut banks = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();

        if path.is_dir() {
            banks.extend(load_bank_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_question_bank(&path) {
                Ok(bank) => banks.push(bank),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(banks)
}

/// Load a bank from a file, or merge every bank found in a directory.
pub fn load_question_pool(path: &Path) -> Result<QuestionBank> {
    if path.is_dir() {
        let banks = load_bank_directory(path)?;
        QuestionBank::merge(banks)
            .with_context(|| format!("no question banks found in {}", path.display()))
    } else {
        parse_question_bank(path)
    }
}

/// A warning from question bank or scenario validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question text or scenario name, if applicable.
    pub item: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Validate a question bank for common issues.
pub fn validate_question_bank(bank: &QuestionBank) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    // Question text is the identity used to avoid repeats
    let mut seen = HashSet::new();
    for q in &bank.questions {
        if !seen.insert(q.text.as_str()) {
            warnings.push(ValidationWarning {
                item: Some(q.text.clone()),
                message: "duplicate question text; only one copy can ever be asked".into(),
            });
        }
    }

    for q in &bank.questions {
        if q.text.trim().is_empty() {
            warnings.push(ValidationWarning {
                item: None,
                message: "question text is empty".into(),
            });
        }
        if q.options.len() < 2 {
            warnings.push(ValidationWarning {
                item: Some(q.text.clone()),
                message: format!("only {} option(s)", q.options.len()),
            });
        }
        let distinct: HashSet<&str> = q.options.iter().map(|o| o.trim()).collect();
        if distinct.len() != q.options.len() {
            warnings.push(ValidationWarning {
                item: Some(q.text.clone()),
                message: "duplicate answer options".into(),
            });
        }
    }

    for tier in Tier::ALL {
        if bank.tier_size(tier) == 0 {
            warnings.push(ValidationWarning {
                item: None,
                message: format!("no {tier} questions; quizzes reaching this tier end early"),
            });
        }
    }

    warnings
}

// ---------------------------------------------------------------------------
// Scenario sets
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TomlScenarioFile {
    scenario_set: TomlScenarioHeader,
    #[serde(default)]
    scenarios: Vec<TomlScenario>,
}

#[derive(Debug, Deserialize)]
struct TomlScenarioHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    baseline: Option<String>,
    #[serde(default)]
    start_date: Option<String>,
    params: TomlParams,
}

#[derive(Debug, Deserialize)]
struct TomlParams {
    population_size: f64,
    initial_infectious: f64,
    #[serde(default)]
    initial_exposed: f64,
    r0: f64,
    #[serde(default)]
    incubation_period_days: Option<f64>,
    #[serde(default)]
    incubation_rate: Option<f64>,
    #[serde(default)]
    infectious_period_days: Option<f64>,
    #[serde(default)]
    recovery_rate: Option<f64>,
    #[serde(default)]
    fatality_fraction: f64,
    horizon_days: u32,
}

#[derive(Debug, Deserialize)]
struct TomlScenario {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    interventions: Vec<Intervention>,
    #[serde(default)]
    overrides: ParamOverrides,
}

/// Rate from either an explicit rate or a mean period in days. The key
/// names are used verbatim in error messages.
fn rate_or_period(
    rate_key: &str,
    rate: Option<f64>,
    period_key: &str,
    period_days: Option<f64>,
) -> Result<f64> {
    match (rate, period_days) {
        (Some(_), Some(_)) => {
            anyhow::bail!("set either {rate_key} or {period_key}, not both")
        }
        (Some(r), None) => Ok(r),
        (None, Some(days)) => {
            anyhow::ensure!(days > 0.0, "{period_key} must be positive");
            Ok(1.0 / days)
        }
        (None, None) => anyhow::bail!("missing {rate_key} or {period_key}"),
    }
}

/// Parse a scenario set file.
pub fn parse_scenario_set(path: &Path) -> Result<ScenarioSet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read scenario set: {}", path.display()))?;

    parse_scenario_set_str(&content, path)
}

/// Parse a TOML string into a `ScenarioSet`.
pub fn parse_scenario_set_str(content: &str, source_path: &Path) -> Result<ScenarioSet> {
    let parsed: TomlScenarioFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;
    let header = parsed.scenario_set;

    let start_date = match header.start_date {
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .with_context(|| format!("invalid start_date '{s}', expected YYYY-MM-DD"))?,
        None => SimulationParams::default().start_date,
    };

    let p = header.params;
    let base = SimulationParams {
        population_size: p.population_size,
        initial_infectious: p.initial_infectious,
        initial_exposed: p.initial_exposed,
        r0: p.r0,
        incubation_rate: rate_or_period(
            "incubation_rate",
            p.incubation_rate,
            "incubation_period_days",
            p.incubation_period_days,
        )
        .with_context(|| format!("in {}", source_path.display()))?,
        recovery_rate: rate_or_period(
            "recovery_rate",
            p.recovery_rate,
            "infectious_period_days",
            p.infectious_period_days,
        )
        .with_context(|| format!("in {}", source_path.display()))?,
        fatality_fraction: p.fatality_fraction,
        horizon_days: p.horizon_days,
        interventions: Vec::new(),
        start_date,
    };

    let scenarios: Vec<Scenario> = parsed
        .scenarios
        .into_iter()
        .map(|s| Scenario {
            name: s.name,
            description: s.description,
            interventions: s.interventions,
            overrides: s.overrides,
        })
        .collect();

    anyhow::ensure!(
        !scenarios.is_empty(),
        "scenario set {} defines no scenarios",
        source_path.display()
    );
    if let Some(baseline) = &header.baseline {
        anyhow::ensure!(
            scenarios.iter().any(|s| &s.name == baseline),
            "baseline scenario '{baseline}' not found in {}",
            source_path.display()
        );
    }

    Ok(ScenarioSet {
        id: header.id,
        name: header.name,
        description: header.description,
        baseline: header.baseline,
        base,
        scenarios,
    })
}

/// Validate a scenario set for common issues.
pub fn validate_scenario_set(set: &ScenarioSet) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    let mut seen = HashSet::new();
    for s in &set.scenarios {
        if !seen.insert(s.name.as_str()) {
            warnings.push(ValidationWarning {
                item: Some(s.name.clone()),
                message: "duplicate scenario name".into(),
            });
        }
    }

    for s in &set.scenarios {
        let params = s.params(&set.base);
        for message in crate::simulation::check_params(&params) {
            warnings.push(ValidationWarning {
                item: Some(s.name.clone()),
                message,
            });
        }
        for iv in &s.interventions {
            if iv.trigger_day >= params.horizon_days {
                warnings.push(ValidationWarning {
                    item: Some(s.name.clone()),
                    message: format!(
                        "intervention on day {} never takes effect within {} days",
                        iv.trigger_day, params.horizon_days
                    ),
                });
            }
        }
    }

    warnings
}
