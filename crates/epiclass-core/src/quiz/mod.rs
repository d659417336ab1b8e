//! Adaptive quiz engine.
//!
//! A stateless state machine over difficulty tiers. Each call inspects the
//! caller's answer history and score, applies the score update for the most
//! recent answer, and picks the next unused question at the resulting tier.
//! Two conditions end a quiz: the question cap, which is checked first, and
//! a correct answer at the advanced tier.

pub mod session;

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{AnswerRecord, Question, Tier};
use crate::traits::{QuestionPool, RandomSource};

pub use session::QuizSession;

/// Points added for a correct answer.
pub const CORRECT_POINTS: u32 = 10;
/// Points removed for an incorrect answer, floored at zero.
pub const INCORRECT_PENALTY: u32 = 5;

/// Default question cap per quiz.
pub const DEFAULT_MAX_QUESTIONS: usize = 10;

// ---------------------------------------------------------------------------
// Badges
// ---------------------------------------------------------------------------

/// Qualitative label for a final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Badge {
    Participation,
    Bronze,
    Silver,
    Gold,
}

impl Badge {
    pub fn for_score(score: u32) -> Self {
        match score {
            80.. => Badge::Gold,
            50.. => Badge::Silver,
            20.. => Badge::Bronze,
            _ => Badge::Participation,
        }
    }

    /// Title shown to the learner.
    pub fn title(&self) -> &'static str {
        match self {
            Badge::Gold => "Outbreak Investigator",
            Badge::Silver => "Field Epidemiologist",
            Badge::Bronze => "Contact Tracer",
            Badge::Participation => "Public Health Trainee",
        }
    }
}

impl fmt::Display for Badge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let medal = match self {
            Badge::Gold => "Gold",
            Badge::Silver => "Silver",
            Badge::Bronze => "Bronze",
            Badge::Participation => "Participation",
        };
        write!(f, "{medal} ({})", self.title())
    }
}

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

/// Why the engine returned what it returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepStatus {
    /// First question of a new quiz.
    Welcome,
    /// The previous answer was scored; `tier` is the next question's tier.
    Continue { last_correct: bool, tier: Tier },
    /// The question cap was reached.
    Completed { badge: Badge },
    /// An advanced question was answered correctly.
    Mastered { badge: Badge },
    /// No unused questions remain at `tier`.
    Exhausted { tier: Tier },
}

impl StepStatus {
    /// Whether the caller should stop asking for further steps.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, StepStatus::Welcome | StepStatus::Continue { .. })
    }
}

/// Output of one engine call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizStep {
    /// The next question to ask, if any.
    pub question: Option<Question>,
    pub status: StepStatus,
    /// Score after applying the most recent answer.
    pub score: u32,
}

impl QuizStep {
    /// Feedback text for the learner.
    pub fn message(&self) -> String {
        match &self.status {
            StepStatus::Welcome => {
                "Welcome to the epidemiology quiz! We'll start with the basics.".to_string()
            }
            StepStatus::Continue { last_correct, tier } => {
                let verdict = if *last_correct {
                    "Correct!"
                } else {
                    "Not quite."
                };
                format!("{verdict} Next up: a {tier} question. Score: {}", self.score)
            }
            StepStatus::Completed { badge } => format!(
                "Quiz complete! Final score: {}. Badge earned: {badge}",
                self.score
            ),
            StepStatus::Mastered { badge } => format!(
                "Excellent, you mastered the advanced tier! Final score: {}. Badge earned: {badge}",
                self.score
            ),
            StepStatus::Exhausted { tier } => format!(
                "No more {tier} questions are available. Final score: {}",
                self.score
            ),
        }
    }
}

/// Apply the score update for one answer.
pub fn update_score(score: u32, correct: bool) -> u32 {
    if correct {
        score.saturating_add(CORRECT_POINTS)
    } else {
        score.saturating_sub(INCORRECT_PENALTY)
    }
}

/// Tier of the next question after answering at `tier`, or `None` when the
/// quiz is won.
pub fn next_tier(tier: Tier, correct: bool) -> Option<Tier> {
    match (tier, correct) {
        (Tier::Basic, true) => Some(Tier::Intermediate),
        (Tier::Basic, false) => Some(Tier::Basic),
        (Tier::Intermediate, true) => Some(Tier::Advanced),
        (Tier::Intermediate, false) => Some(Tier::Basic),
        (Tier::Advanced, true) => None,
        (Tier::Advanced, false) => Some(Tier::Intermediate),
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// The adaptive quiz engine. Holds the question pool and the question cap;
/// all per-learner state is passed into each call.
pub struct QuizEngine<P> {
    pool: P,
    max_questions: usize,
}

impl<P: QuestionPool> QuizEngine<P> {
    pub fn new(pool: P, max_questions: usize) -> Self {
        Self {
            pool,
            max_questions,
        }
    }

    pub fn pool(&self) -> &P {
        &self.pool
    }

    pub fn max_questions(&self) -> usize {
        self.max_questions
    }

    /// Decide the next step for a learner with the given history and score.
    pub fn next_step<R: RandomSource + ?Sized>(
        &self,
        history: &[AnswerRecord],
        score: u32,
        rng: &mut R,
    ) -> QuizStep {
        if history.len() >= self.max_questions {
            return QuizStep {
                question: None,
                status: StepStatus::Completed {
                    badge: Badge::for_score(score),
                },
                score,
            };
        }

        let Some(last) = history.last() else {
            return self.select(Tier::Basic, history, score, StepStatus::Welcome, rng);
        };

        let score = update_score(score, last.correct);
        match next_tier(last.tier, last.correct) {
            Some(tier) => {
                let status = StepStatus::Continue {
                    last_correct: last.correct,
                    tier,
                };
                self.select(tier, history, score, status, rng)
            }
            None => QuizStep {
                question: None,
                status: StepStatus::Mastered {
                    badge: Badge::for_score(score),
                },
                score,
            },
        }
    }

    fn select<R: RandomSource + ?Sized>(
        &self,
        tier: Tier,
        history: &[AnswerRecord],
        score: u32,
        status: StepStatus,
        rng: &mut R,
    ) -> QuizStep {
        let seen: HashSet<&str> = history.iter().map(|r| r.question_text.as_str()).collect();
        let candidates = self.pool.unused(tier, &seen);

        if candidates.is_empty() {
            tracing::debug!(%tier, answered = history.len(), "no unused questions left");
            return QuizStep {
                question: None,
                status: StepStatus::Exhausted { tier },
                score,
            };
        }

        let question = candidates[rng.pick_index(candidates.len())].clone();
        QuizStep {
            question: Some(question),
            status,
            score,
        }
    }
}
