//! Core data model types for epiclass.
//!
//! These are the fundamental types shared by the simulator and the quiz
//! engine: simulation inputs and outputs, quiz questions, and answer records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

/// A policy action that reduces transmission from `trigger_day` onward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Intervention {
    /// First day (zero-based) on which the reduction applies.
    pub trigger_day: u32,
    /// Relative reduction of the transmission rate, in `[0, 1]`.
    pub reduction: f64,
}

impl Intervention {
    pub fn new(trigger_day: u32, reduction: f64) -> Self {
        Self {
            trigger_day,
            reduction,
        }
    }

    /// Multiplicative factor this intervention applies to the transmission rate.
    pub fn factor(&self) -> f64 {
        (1.0 - self.reduction).clamp(0.0, 1.0)
    }
}

impl fmt::Display for Intervention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.trigger_day, self.reduction)
    }
}

impl FromStr for Intervention {
    type Err = String;

    /// Parses `DAY:REDUCTION`, e.g. `14:0.4`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (day, reduction) = s
            .split_once(':')
            .ok_or_else(|| format!("expected DAY:REDUCTION, got '{s}'"))?;
        let trigger_day = day
            .trim()
            .parse::<u32>()
            .map_err(|_| format!("invalid trigger day: '{}'", day.trim()))?;
        let reduction = reduction
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("invalid reduction: '{}'", reduction.trim()))?;
        if !(0.0..=1.0).contains(&reduction) {
            return Err(format!("reduction must be between 0 and 1, got {reduction}"));
        }
        Ok(Intervention::new(trigger_day, reduction))
    }
}

/// Immutable input of a single SEIR run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationParams {
    /// Total population size N.
    pub population_size: f64,
    /// Infectious individuals on day zero.
    pub initial_infectious: f64,
    /// Exposed (incubating) individuals on day zero.
    #[serde(default)]
    pub initial_exposed: f64,
    /// Basic reproduction number.
    pub r0: f64,
    /// Rate E -> I; its reciprocal is the mean incubation period in days.
    pub incubation_rate: f64,
    /// Rate I -> R; its reciprocal is the mean infectious period in days.
    pub recovery_rate: f64,
    /// Fraction of the daily I -> R outflow that dies.
    #[serde(default)]
    pub fatality_fraction: f64,
    /// Number of simulated days.
    pub horizon_days: u32,
    /// Time-triggered transmission reductions.
    #[serde(default)]
    pub interventions: Vec<Intervention>,
    /// Calendar date of day zero.
    #[serde(default = "default_start_date")]
    pub start_date: NaiveDate,
}

fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default()
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            population_size: 1000.0,
            initial_infectious: 10.0,
            initial_exposed: 0.0,
            r0: 2.0,
            incubation_rate: 0.2,
            recovery_rate: 0.143,
            fatality_fraction: 0.0,
            horizon_days: 120,
            interventions: Vec::new(),
            start_date: default_start_date(),
        }
    }
}

impl SimulationParams {
    /// Baseline transmission rate, `R0 × recovery_rate`.
    pub fn baseline_rate(&self) -> f64 {
        self.r0 * self.recovery_rate
    }

    /// Effective transmission rate on `day`, composed from the baseline.
    pub fn effective_rate(&self, day: u32) -> f64 {
        self.interventions
            .iter()
            .filter(|iv| iv.trigger_day <= day)
            .fold(self.baseline_rate(), |rate, iv| rate * iv.factor())
    }
}

/// State of the population at the end of one simulated day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySnapshot {
    pub day: u32,
    pub date: NaiveDate,
    pub susceptible: f64,
    pub exposed: f64,
    pub infectious: f64,
    pub removed: f64,
    pub new_exposures: f64,
    pub new_recoveries: f64,
    pub new_deaths: f64,
    pub effective_rate: f64,
}

// ---------------------------------------------------------------------------
// Quiz
// ---------------------------------------------------------------------------

/// Quiz difficulty tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Basic,
    Intermediate,
    Advanced,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Basic, Tier::Intermediate, Tier::Advanced];
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Basic => write!(f, "basic"),
            Tier::Intermediate => write!(f, "intermediate"),
            Tier::Advanced => write!(f, "advanced"),
        }
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "basic" | "easy" => Ok(Tier::Basic),
            "intermediate" | "medium" => Ok(Tier::Intermediate),
            "advanced" | "hard" => Ok(Tier::Advanced),
            other => Err(format!("unknown tier: {other}")),
        }
    }
}

/// A single quiz question. The exact `text` is its identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Prompt text; also the de-duplication key.
    pub text: String,
    /// Answer options in display order.
    pub options: Vec<String>,
    /// The correct option, verbatim.
    pub answer: String,
    pub tier: Tier,
    /// Shown after the question has been answered.
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Question {
    /// Whether `choice` matches the correct answer (trimmed, case-insensitive).
    pub fn is_correct(&self, choice: &str) -> bool {
        choice.trim().eq_ignore_ascii_case(self.answer.trim())
    }
}

/// One answered question in a caller-owned history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question_text: String,
    pub tier: Tier,
    pub correct: bool,
}

impl AnswerRecord {
    pub fn new(question: &Question, correct: bool) -> Self {
        Self {
            question_text: question.text.clone(),
            tier: question.tier,
            correct,
        }
    }
}

/// A named collection of questions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionBank {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl QuestionBank {
    /// Number of questions at `tier`.
    pub fn count_tier(&self, tier: Tier) -> usize {
        self.questions.iter().filter(|q| q.tier == tier).count()
    }

    /// Merge several banks into one pool; the first bank's identity is kept.
    pub fn merge(banks: Vec<QuestionBank>) -> Option<QuestionBank> {
        let mut iter = banks.into_iter();
        let mut merged = iter.next()?;
        for bank in iter {
            merged.questions.extend(bank.questions);
        }
        Some(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_display_and_parse() {
        assert_eq!(Tier::Basic.to_string(), "basic");
        assert_eq!("Advanced".parse::<Tier>().unwrap(), Tier::Advanced);
        assert_eq!("medium".parse::<Tier>().unwrap(), Tier::Intermediate);
        assert!("expert".parse::<Tier>().is_err());
    }

    #[test]
    fn intervention_parse() {
        let iv: Intervention = "14:0.4".parse().unwrap();
        assert_eq!(iv.trigger_day, 14);
        assert!((iv.reduction - 0.4).abs() < f64::EPSILON);
        assert!("14".parse::<Intervention>().is_err());
        assert!("x:0.4".parse::<Intervention>().is_err());
        assert!("3:1.5".parse::<Intervention>().is_err());
    }

    #[test]
    fn effective_rate_composes_from_baseline() {
        let params = SimulationParams {
            r0: 2.0,
            recovery_rate: 0.25,
            interventions: vec![Intervention::new(10, 0.5), Intervention::new(5, 0.2)],
            ..Default::default()
        };
        assert!((params.effective_rate(0) - 0.5).abs() < 1e-12);
        assert!((params.effective_rate(5) - 0.4).abs() < 1e-12);
        assert!((params.effective_rate(10) - 0.2).abs() < 1e-12);
        assert!((params.effective_rate(50) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn answer_matching_is_lenient() {
        let q = Question {
            text: "What does R0 measure?".into(),
            options: vec!["Secondary cases".into(), "Deaths".into()],
            answer: "Secondary cases".into(),
            tier: Tier::Basic,
            explanation: None,
            tags: vec![],
        };
        assert!(q.is_correct("  secondary CASES "));
        assert!(!q.is_correct("Deaths"));
    }

    #[test]
    fn params_serde_defaults() {
        let json = r#"{
            "population_size": 500.0,
            "initial_infectious": 1.0,
            "r0": 1.5,
            "incubation_rate": 0.2,
            "recovery_rate": 0.1,
            "horizon_days": 30
        }"#;
        let params: SimulationParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.initial_exposed, 0.0);
        assert!(params.interventions.is_empty());
        assert_eq!(params.start_date, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
    }
}
