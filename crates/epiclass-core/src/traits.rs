//! Seams between the quiz engine and its collaborators.
//!
//! The engine reads questions through [`QuestionPool`] and draws random
//! choices through [`RandomSource`], so tests can substitute a fixed pool
//! and a scripted sequence of picks.

use std::collections::HashSet;

use rand::rngs::{StdRng, ThreadRng};
use rand::Rng;

use crate::model::{Question, QuestionBank, Tier};

// ---------------------------------------------------------------------------
// Question pool
// ---------------------------------------------------------------------------

/// Read-only source of quiz questions partitioned by tier.
pub trait QuestionPool: Send + Sync {
    /// Questions at `tier` whose text is not in `seen`, in pool order.
    fn unused<'a>(&'a self, tier: Tier, seen: &HashSet<&str>) -> Vec<&'a Question>;

    /// Total number of questions at `tier`.
    fn tier_size(&self, tier: Tier) -> usize;
}

impl QuestionPool for QuestionBank {
    fn unused<'a>(&'a self, tier: Tier, seen: &HashSet<&str>) -> Vec<&'a Question> {
        self.questions
            .iter()
            .filter(|q| q.tier == tier && !seen.contains(q.text.as_str()))
            .collect()
    }

    fn tier_size(&self, tier: Tier) -> usize {
        self.count_tier(tier)
    }
}

impl QuestionPool for Vec<Question> {
    fn unused<'a>(&'a self, tier: Tier, seen: &HashSet<&str>) -> Vec<&'a Question> {
        self.iter()
            .filter(|q| q.tier == tier && !seen.contains(q.text.as_str()))
            .collect()
    }

    fn tier_size(&self, tier: Tier) -> usize {
        self.iter().filter(|q| q.tier == tier).count()
    }
}

// ---------------------------------------------------------------------------
// Random source
// ---------------------------------------------------------------------------

/// Uniform index selection.
pub trait RandomSource {
    /// Return an index in `0..len`. `len` is never zero.
    fn pick_index(&mut self, len: usize) -> usize;
}

impl RandomSource for StdRng {
    fn pick_index(&mut self, len: usize) -> usize {
        self.random_range(0..len)
    }
}

impl RandomSource for ThreadRng {
    fn pick_index(&mut self, len: usize) -> usize {
        self.random_range(0..len)
    }
}

/// Replays a fixed list of picks, each reduced modulo the candidate count.
///
/// Once the script runs out it keeps returning index zero.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    picks: Vec<usize>,
    cursor: usize,
}

impl ScriptedSource {
    pub fn new(picks: Vec<usize>) -> Self {
        Self { picks, cursor: 0 }
    }

    /// Always picks the first candidate.
    pub fn first() -> Self {
        Self::default()
    }
}

impl RandomSource for ScriptedSource {
    fn pick_index(&mut self, len: usize) -> usize {
        let pick = self.picks.get(self.cursor).copied().unwrap_or(0);
        self.cursor += 1;
        pick % len
    }
}
