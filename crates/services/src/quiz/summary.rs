use chrono::{DateTime, Duration, Utc};
use quiz_core::model::{AnswerResult, Difficulty, OptionKey, QuizStats, SessionId};
use quiz_core::summary::DifficultyBreakdown;

use super::state::CompletedQuiz;

/// One row of the end-of-quiz answer list.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerSummaryItem {
    pub number: usize,
    pub question_text: String,
    pub difficulty: Difficulty,
    pub user_answer: OptionKey,
    pub correct_answer: String,
    pub is_correct: bool,
    pub reward: f64,
}

/// Everything the completion screen shows.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizSummary {
    pub session_id: SessionId,
    pub stats: QuizStats,
    pub breakdown: DifficultyBreakdown,
    pub answers: Vec<AnswerSummaryItem>,
    /// Grading of the answer that ended the quiz.
    pub final_result: AnswerResult,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl QuizSummary {
    #[must_use]
    pub fn from_completed(done: &CompletedQuiz) -> Self {
        let records = done.history.records();
        let answers = records
            .iter()
            .enumerate()
            .map(|(idx, record)| AnswerSummaryItem {
                number: idx + 1,
                question_text: record.question_text.clone(),
                difficulty: record.difficulty,
                user_answer: record.user_answer,
                correct_answer: record.correct_answer.clone(),
                is_correct: record.is_correct,
                reward: record.reward,
            })
            .collect();

        Self {
            session_id: done.session_id.clone(),
            stats: done.stats.clone(),
            breakdown: DifficultyBreakdown::from_history(records),
            answers,
            final_result: done.final_result.clone(),
            started_at: done.started_at,
            completed_at: done.completed_at,
        }
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.completed_at - self.started_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{AnswerHistory, AnswerOutcome, AnswerRecord, AnswerResult, QuizId};
    use quiz_core::time::fixed_now;

    fn record(difficulty: Difficulty, is_correct: bool, reward: f64) -> AnswerRecord {
        AnswerRecord {
            question_text: format!("{difficulty} question"),
            user_answer: OptionKey::new('A'),
            correct_answer: if is_correct { "A" } else { "C" }.into(),
            is_correct,
            reward,
            difficulty,
            answered_at: fixed_now(),
        }
    }

    #[test]
    fn numbers_answers_and_groups_by_difficulty() {
        let mut history = AnswerHistory::new();
        history.record(record(Difficulty::Low, true, 5.0));
        history.record(record(Difficulty::Low, false, -2.0));
        history.record(record(Difficulty::Hard, true, 4.0));

        let stats = QuizStats {
            correct_answers: 2,
            questions_answered: 3,
            ..QuizStats::default()
        };
        let done = CompletedQuiz {
            quiz_id: QuizId::new("quiz"),
            session_id: SessionId::new("sess"),
            history,
            stats: stats.clone(),
            final_result: AnswerResult {
                is_correct: true,
                correct_answer: "A".into(),
                reward: 4.0,
                explanation: None,
                stats,
                outcome: AnswerOutcome::Complete,
            },
            started_at: fixed_now(),
            completed_at: fixed_now() + Duration::minutes(3),
        };

        let summary = QuizSummary::from_completed(&done);

        assert_eq!(summary.answers.len(), 3);
        assert_eq!(summary.answers[0].number, 1);
        assert_eq!(summary.answers[2].number, 3);
        assert!(!summary.answers[1].is_correct);

        let low = summary.breakdown.tally(Difficulty::Low);
        assert_eq!((low.total, low.correct, low.incorrect), (2, 1, 1));
        assert!((low.reward - 3.0).abs() < f64::EPSILON);
        assert_eq!(summary.breakdown.tally(Difficulty::Medium).total, 0);
        assert_eq!(summary.duration(), Duration::minutes(3));
        assert!(summary.final_result.is_correct);
        assert!((summary.final_result.reward - 4.0).abs() < f64::EPSILON);
    }
}
