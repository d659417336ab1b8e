//! Caller-side quiz state.
//!
//! The engine is stateless; [`QuizSession`] is what a caller (the CLI, a web
//! session handler) keeps between calls. It serializes to JSON so a session
//! can be persisted and resumed.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::{QuizEngine, QuizStep, StepStatus};
use crate::model::{AnswerRecord, Question};
use crate::traits::{QuestionPool, RandomSource};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuizSession {
    /// Answered questions, oldest first.
    pub history: Vec<AnswerRecord>,
    pub score: u32,
    /// The question awaiting an answer.
    #[serde(default)]
    pub pending: Option<Question>,
    /// Terminal status, once the engine has returned one.
    #[serde(default)]
    pub outcome: Option<StepStatus>,
}

impl QuizSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    /// Ask the engine for the next step and record its outcome.
    ///
    /// Once finished, the terminal step is replayed without calling the
    /// engine again, so the last answer is never scored twice.
    pub fn advance<P, R>(&mut self, engine: &QuizEngine<P>, rng: &mut R) -> QuizStep
    where
        P: QuestionPool,
        R: RandomSource + ?Sized,
    {
        if let Some(status) = &self.outcome {
            return QuizStep {
                question: None,
                status: status.clone(),
                score: self.score,
            };
        }

        let step = engine.next_step(&self.history, self.score, rng);
        self.score = step.score;
        self.pending = step.question.clone();
        if step.status.is_terminal() {
            self.outcome = Some(step.status.clone());
        }
        step
    }

    /// Record an answer to the pending question. Returns whether it was
    /// correct, or `None` if no question is pending.
    pub fn answer(&mut self, choice: &str) -> Option<bool> {
        let question = self.pending.take()?;
        let correct = question.is_correct(choice);
        self.history.push(AnswerRecord::new(&question, correct));
        Some(correct)
    }

    pub fn answered(&self) -> usize {
        self.history.len()
    }

    pub fn correct_count(&self) -> usize {
        self.history.iter().filter(|r| r.correct).count()
    }

    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize session")?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write session to {}", path.display()))?;
        Ok(())
    }

    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read session from {}", path.display()))?;
        serde_json::from_str(&content).context("failed to parse session JSON")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Tier;
    use crate::quiz::tests::pool;
    use crate::quiz::Badge;
    use crate::traits::ScriptedSource;

    #[test]
    fn climb_to_mastery() {
        let engine = QuizEngine::new(pool(), 10);
        let mut rng = ScriptedSource::first();
        let mut session = QuizSession::new();

        let tiers = [Tier::Basic, Tier::Intermediate, Tier::Advanced];
        for tier in tiers {
            let step = session.advance(&engine, &mut rng);
            assert_eq!(step.question.as_ref().unwrap().tier, tier);
            assert_eq!(session.answer("right"), Some(true));
        }

        let last = session.advance(&engine, &mut rng);
        assert_eq!(last.score, 30);
        assert_eq!(
            last.status,
            StepStatus::Mastered {
                badge: Badge::Bronze
            }
        );
        assert!(session.is_finished());
        assert_eq!(session.correct_count(), 3);

        let again = session.advance(&engine, &mut rng);
        assert_eq!(again.score, 30);
        assert_eq!(again.status, last.status);
    }

    #[test]
    fn answer_without_pending_question() {
        let mut session = QuizSession::new();
        assert_eq!(session.answer("anything"), None);
        assert_eq!(session.answered(), 0);
    }

    #[test]
    fn wrong_answers_are_recorded() {
        let engine = QuizEngine::new(pool(), 2);
        let mut rng = ScriptedSource::first();
        let mut session = QuizSession::new();

        session.advance(&engine, &mut rng);
        assert_eq!(session.answer("wrong"), Some(false));
        session.advance(&engine, &mut rng);
        assert_eq!(session.answer("right"), Some(true));

        let end = session.advance(&engine, &mut rng);
        assert!(matches!(end.status, StepStatus::Completed { .. }));
        assert_eq!(session.answered(), 2);
    }

    #[test]
    fn session_persists_to_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let engine = QuizEngine::new(pool(), 5);
        let mut session = QuizSession::new();
        session.advance(&engine, &mut ScriptedSource::first());
        session.answer("right");
        session.save_json(&path).unwrap();

        let restored = QuizSession::load_json(&path).unwrap();
        assert_eq!(restored, session);
    }
}
