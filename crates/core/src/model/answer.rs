use chrono::{DateTime, Utc};

use crate::model::difficulty::Difficulty;
use crate::model::question::{OptionKey, QuestionBankItem};
use crate::model::stats::QuizStats;

//
// ─── SUBMISSION RESULT ─────────────────────────────────────────────────────────
//

/// What follows a graded answer.
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerOutcome {
    Next {
        question: QuestionBankItem,
        difficulty: Difficulty,
    },
    Complete,
}

/// The service's verdict on one submitted answer.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerResult {
    pub is_correct: bool,
    pub correct_answer: String,
    pub reward: f64,
    pub explanation: Option<String>,
    pub stats: QuizStats,
    pub outcome: AnswerOutcome,
}

impl AnswerResult {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        matches!(self.outcome, AnswerOutcome::Complete)
    }
}

//
// ─── HISTORY ───────────────────────────────────────────────────────────────────
//

/// One answered question as remembered by the client.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerRecord {
    pub question_text: String,
    pub user_answer: OptionKey,
    pub correct_answer: String,
    pub is_correct: bool,
    pub reward: f64,
    pub difficulty: Difficulty,
    pub answered_at: DateTime<Utc>,
}

/// Append-only list of answers for a single session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnswerHistory {
    records: Vec<AnswerRecord>,
}

impl AnswerHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, record: AnswerRecord) {
        self.records.push(record);
    }

    #[must_use]
    pub fn records(&self) -> &[AnswerRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 1-based number of the question currently being asked.
    #[must_use]
    pub fn next_question_number(&self) -> usize {
        self.records.len() + 1
    }
}
