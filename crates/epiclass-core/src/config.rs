//! epiclass configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::SimulationParams;
use crate::quiz::DEFAULT_MAX_QUESTIONS;

/// Default simulation parameters used when a flag is not given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationDefaults {
    #[serde(default = "default_population")]
    pub population_size: f64,
    #[serde(default = "default_initial_infectious")]
    pub initial_infectious: f64,
    #[serde(default)]
    pub initial_exposed: f64,
    #[serde(default = "default_r0")]
    pub r0: f64,
    #[serde(default = "default_incubation_rate")]
    pub incubation_rate: f64,
    #[serde(default = "default_recovery_rate")]
    pub recovery_rate: f64,
    #[serde(default)]
    pub fatality_fraction: f64,
    #[serde(default = "default_horizon")]
    pub horizon_days: u32,
}

fn default_population() -> f64 {
    1000.0
}
fn default_initial_infectious() -> f64 {
    10.0
}
fn default_r0() -> f64 {
    2.0
}
fn default_incubation_rate() -> f64 {
    0.2
}
fn default_recovery_rate() -> f64 {
    0.143
}
fn default_horizon() -> u32 {
    120
}

impl Default for SimulationDefaults {
    fn default() -> Self {
        Self {
            population_size: default_population(),
            initial_infectious: default_initial_infectious(),
            initial_exposed: 0.0,
            r0: default_r0(),
            incubation_rate: default_incubation_rate(),
            recovery_rate: default_recovery_rate(),
            fatality_fraction: 0.0,
            horizon_days: default_horizon(),
        }
    }
}

impl SimulationDefaults {
    pub fn to_params(&self) -> SimulationParams {
        SimulationParams {
            population_size: self.population_size,
            initial_infectious: self.initial_infectious,
            initial_exposed: self.initial_exposed,
            r0: self.r0,
            incubation_rate: self.incubation_rate,
            recovery_rate: self.recovery_rate,
            fatality_fraction: self.fatality_fraction,
            horizon_days: self.horizon_days,
            ..SimulationParams::default()
        }
    }
}

/// Quiz settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizConfig {
    /// Question cap per quiz.
    #[serde(default = "default_max_questions")]
    pub max_questions: usize,
    /// Fixed RNG seed for reproducible question order.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Question bank file or directory.
    #[serde(default = "default_question_bank")]
    pub question_bank: PathBuf,
}

fn default_max_questions() -> usize {
    DEFAULT_MAX_QUESTIONS
}
fn default_question_bank() -> PathBuf {
    PathBuf::from("question-banks")
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            max_questions: default_max_questions(),
            seed: None,
            question_bank: default_question_bank(),
        }
    }
}

/// Top-level epiclass configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpiclassConfig {
    #[serde(default)]
    pub simulation: SimulationDefaults,
    #[serde(default)]
    pub quiz: QuizConfig,
    /// Max scenarios simulated at once.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
    /// Output directory for reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_parallelism() -> usize {
    4
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./epiclass-results")
}

impl Default for EpiclassConfig {
    fn default() -> Self {
        Self {
            simulation: SimulationDefaults::default(),
            quiz: QuizConfig::default(),
            parallelism: default_parallelism(),
            output_dir: default_output_dir(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `epiclass.toml` in the current directory
/// 2. `~/.config/epiclass/config.toml`
///
/// Environment variable overrides: `EPICLASS_SEED`, `EPICLASS_MAX_QUESTIONS`,
/// `EPICLASS_QUESTION_BANK`.
pub fn load_config() -> Result<EpiclassConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<EpiclassConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("epiclass.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<EpiclassConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => EpiclassConfig::default(),
    };

    apply_env_overrides(&mut config)?;

    config.quiz.question_bank = resolve_path(&config.quiz.question_bank);
    config.output_dir = resolve_path(&config.output_dir);

    Ok(config)
}

fn apply_env_overrides(config: &mut EpiclassConfig) -> Result<()> {
    apply_overrides(config, |key| std::env::var(key).ok())
}

fn apply_overrides(
    config: &mut EpiclassConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<()> {
    if let Some(seed) = lookup("EPICLASS_SEED") {
        config.quiz.seed = Some(
            seed.trim()
                .parse()
                .with_context(|| format!("invalid EPICLASS_SEED: '{seed}'"))?,
        );
    }
    if let Some(max) = lookup("EPICLASS_MAX_QUESTIONS") {
        config.quiz.max_questions = max
            .trim()
            .parse()
            .with_context(|| format!("invalid EPICLASS_MAX_QUESTIONS: '{max}'"))?;
    }
    if let Some(bank) = lookup("EPICLASS_QUESTION_BANK") {
        config.quiz.question_bank = PathBuf::from(bank);
    }
    Ok(())
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("epiclass"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_EPICLASS_TEST_VAR", "banks");
        assert_eq!(resolve_env_vars("${_EPICLASS_TEST_VAR}"), "banks");
        assert_eq!(
            resolve_env_vars("/srv/${_EPICLASS_TEST_VAR}/epi"),
            "/srv/banks/epi"
        );
        assert_eq!(resolve_env_vars("no vars"), "no vars");
        std::env::remove_var("_EPICLASS_TEST_VAR");
    }

    #[test]
    fn default_config() {
        let config = EpiclassConfig::default();
        assert_eq!(config.quiz.max_questions, 10);
        assert_eq!(config.parallelism, 4);
        assert_eq!(config.simulation.r0, 2.0);
        assert!(config.quiz.seed.is_none());
    }

    #[test]
    fn parse_partial_config() {
        let toml_str = r#"
parallelism = 8

[simulation]
population_size = 5000
r0 = 3.1

[quiz]
max_questions = 6
seed = 42
"#;
        let config: EpiclassConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.parallelism, 8);
        assert_eq!(config.simulation.population_size, 5000.0);
        assert_eq!(config.simulation.recovery_rate, 0.143);
        assert_eq!(config.quiz.max_questions, 6);
        assert_eq!(config.quiz.seed, Some(42));
        assert_eq!(config.quiz.question_bank, PathBuf::from("question-banks"));

        let params = config.simulation.to_params();
        assert_eq!(params.r0, 3.1);
        assert!(params.interventions.is_empty());
    }

    #[test]
    fn explicit_missing_config_fails() {
        let err = load_config_from(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn load_explicit_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("epiclass.toml");
        std::fs::write(&path, "[quiz]\nmax_questions = 3\n").unwrap();
        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.quiz.max_questions, 3);
    }

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: std::collections::HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = EpiclassConfig::default();
        apply_overrides(
            &mut config,
            env(&[
                ("EPICLASS_SEED", " 42 "),
                ("EPICLASS_MAX_QUESTIONS", "4"),
                ("EPICLASS_QUESTION_BANK", "/srv/banks"),
            ]),
        )
        .unwrap();
        assert_eq!(config.quiz.seed, Some(42));
        assert_eq!(config.quiz.max_questions, 4);
        assert_eq!(config.quiz.question_bank, PathBuf::from("/srv/banks"));
    }

    #[test]
    fn absent_env_leaves_config_alone() {
        let mut config = EpiclassConfig::default();
        apply_overrides(&mut config, env(&[])).unwrap();
        assert_eq!(config, EpiclassConfig::default());
    }

    #[test]
    fn malformed_env_override_is_rejected() {
        let mut config = EpiclassConfig::default();
        let err = apply_overrides(&mut config, env(&[("EPICLASS_SEED", "abc")])).unwrap_err();
        assert!(err.to_string().contains("invalid EPICLASS_SEED"));

        let err = apply_overrides(&mut config, env(&[("EPICLASS_MAX_QUESTIONS", "-1")]))
            .unwrap_err();
        assert!(err.to_string().contains("invalid EPICLASS_MAX_QUESTIONS"));
    }
}
