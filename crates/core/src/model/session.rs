use chrono::{DateTime, Utc};

use crate::model::difficulty::Difficulty;
use crate::model::ids::{QuizId, SessionId};
use crate::model::question::{QuestionBankItem, QuestionCount};

/// A running quiz attempt: which question is on screen and at what difficulty.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizSession {
    id: SessionId,
    quiz_id: QuizId,
    current_question: QuestionBankItem,
    current_difficulty: Difficulty,
    question_count: QuestionCount,
    started_at: DateTime<Utc>,
}

impl QuizSession {
    #[must_use]
    pub fn new(
        id: SessionId,
        quiz_id: QuizId,
        first_question: QuestionBankItem,
        difficulty: Difficulty,
        question_count: QuestionCount,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            quiz_id,
            current_question: first_question,
            current_difficulty: difficulty,
            question_count,
            started_at,
        }
    }

    #[must_use]
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    #[must_use]
    pub fn quiz_id(&self) -> &QuizId {
        &self.quiz_id
    }

    #[must_use]
    pub fn current_question(&self) -> &QuestionBankItem {
        &self.current_question
    }

    #[must_use]
    pub fn current_difficulty(&self) -> Difficulty {
        self.current_difficulty
    }

    #[must_use]
    pub fn question_count(&self) -> QuestionCount {
        self.question_count
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Move on to the question the service picked next.
    pub fn advance(&mut self, question: QuestionBankItem, difficulty: Difficulty) {
        self.current_question = question;
        self.current_difficulty = difficulty;
    }
}
