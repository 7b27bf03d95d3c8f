use std::collections::BTreeMap;
use std::fmt;

use crate::model::difficulty::Difficulty;

/// Direction the service reports for recent performance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PerformanceTrend {
    Improving,
    #[default]
    Stable,
    Declining,
    /// The service sent a label this client does not know.
    Unknown,
}

impl PerformanceTrend {
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "improving" | "up" => Self::Improving,
            "stable" | "" => Self::Stable,
            "declining" | "down" => Self::Declining,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Improving => "improving",
            Self::Stable => "stable",
            Self::Declining => "declining",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for PerformanceTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Server-computed statistics snapshot. Replaced wholesale after each answer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuizStats {
    /// Percentage in 0..=100.
    pub accuracy: f64,
    pub correct_answers: u32,
    pub questions_answered: u32,
    pub total_reward: f64,
    pub performance_trend: PerformanceTrend,
    pub difficulty_distribution: BTreeMap<Difficulty, u32>,
}

impl QuizStats {
    /// Reward per question that maps to a full reward bar.
    pub const REWARD_SCALE_PER_QUESTION: f64 = 10.0;

    #[must_use]
    pub fn incorrect_answers(&self) -> u32 {
        self.questions_answered.saturating_sub(self.correct_answers)
    }

    /// Share of answered questions that were correct, as a percentage.
    #[must_use]
    pub fn correct_percent(&self) -> f64 {
        if self.questions_answered == 0 {
            return 0.0;
        }
        f64::from(self.correct_answers) / f64::from(self.questions_answered) * 100.0
    }

    /// Total reward relative to the scale, clamped to 0..=100.
    #[must_use]
    pub fn reward_progress_percent(&self) -> f64 {
        if self.questions_answered == 0 {
            return 0.0;
        }
        let max = f64::from(self.questions_answered) * Self::REWARD_SCALE_PER_QUESTION;
        (self.total_reward / max * 100.0).clamp(0.0, 100.0)
    }
}
