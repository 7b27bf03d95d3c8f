//! Per-difficulty aggregation over an answer history.
//!
//! Always recomputed from the history; nothing here is stored.

use std::collections::BTreeMap;

use crate::model::{AnswerRecord, Difficulty};

/// Counts and summed reward for one difficulty tier.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DifficultyTally {
    pub total: u32,
    pub correct: u32,
    pub incorrect: u32,
    pub reward: f64,
}

impl DifficultyTally {
    fn add(&mut self, record: &AnswerRecord) {
        self.total = self.total.saturating_add(1);
        if record.is_correct {
            self.correct = self.correct.saturating_add(1);
        } else {
            self.incorrect = self.incorrect.saturating_add(1);
        }
        self.reward += record.reward;
    }

    /// Correct share as a whole percentage, 0 when the tier is empty.
    #[must_use]
    pub fn accuracy_percent(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        let pct = (f64::from(self.correct) / f64::from(self.total) * 100.0).round();
        // 0..=100 after rounding
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let pct = pct as u32;
        pct
    }
}

/// Answer history grouped by the difficulty each question was asked at.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DifficultyBreakdown {
    tallies: BTreeMap<Difficulty, DifficultyTally>,
}

impl DifficultyBreakdown {
    #[must_use]
    pub fn from_history(records: &[AnswerRecord]) -> Self {
        let mut tallies: BTreeMap<Difficulty, DifficultyTally> = BTreeMap::new();
        for record in records {
            tallies.entry(record.difficulty).or_default().add(record);
        }
        Self { tallies }
    }

    /// Tally for `difficulty`, zeroed if nothing was answered at that tier.
    #[must_use]
    pub fn tally(&self, difficulty: Difficulty) -> DifficultyTally {
        self.tallies.get(&difficulty).copied().unwrap_or_default()
    }

    /// Tiers that have at least one answer, easiest first.
    pub fn iter(&self) -> impl Iterator<Item = (Difficulty, &DifficultyTally)> {
        self.tallies.iter().map(|(d, t)| (*d, t))
    }

    /// Sum of all tier totals; equals the history length.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.tallies.values().map(|t| t.total).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tallies.is_empty()
    }

    #[must_use]
    pub fn as_map(&self) -> &BTreeMap<Difficulty, DifficultyTally> {
        &self.tallies
    }
}
