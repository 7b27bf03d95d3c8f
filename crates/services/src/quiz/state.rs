use std::fmt;

use chrono::{DateTime, Utc};
use quiz_core::model::{
    AnswerHistory, AnswerResult, OptionKey, QuestionBank, QuizId, QuizSession, QuizStats,
    SessionId,
};

//
// ─── PHASES AND ACTIONS ────────────────────────────────────────────────────────
//

/// Flat discriminant of `QuizState`, used for rendering dispatch and errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuizPhase {
    NoDocument,
    NoBank,
    BankReady,
    Answering,
    Reviewing,
    Complete,
}

impl fmt::Display for QuizPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            QuizPhase::NoDocument => "no document is loaded",
            QuizPhase::NoBank => "no question bank exists",
            QuizPhase::BankReady => "the question bank is ready",
            QuizPhase::Answering => "answering a question",
            QuizPhase::Reviewing => "reviewing an answer",
            QuizPhase::Complete => "the quiz is complete",
        })
    }
}

/// User-triggered actions, named in `QuizError::InvalidTransition`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuizAction {
    BindDocument,
    GenerateBank,
    StartQuiz,
    SelectOption,
    ToggleHint,
    SubmitAnswer,
    NextQuestion,
    NewBank,
    NewQuiz,
}

impl fmt::Display for QuizAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            QuizAction::BindDocument => "load a document",
            QuizAction::GenerateBank => "generate a question bank",
            QuizAction::StartQuiz => "start a quiz",
            QuizAction::SelectOption => "select an option",
            QuizAction::ToggleHint => "toggle the hint",
            QuizAction::SubmitAnswer => "submit an answer",
            QuizAction::NextQuestion => "go to the next question",
            QuizAction::NewBank => "discard the question bank",
            QuizAction::NewQuiz => "start a new quiz",
        })
    }
}

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

/// Local answer input before submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerDraft {
    pub selected: Option<OptionKey>,
    pub hint_visible: bool,
}

/// Sub-state of a running quiz.
#[derive(Debug, Clone, PartialEq)]
pub enum QuizStep {
    Answering(AnswerDraft),
    Reviewing(AnswerResult),
}

/// Session data that only exists while a quiz is running.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveQuiz {
    pub bank: QuestionBank,
    pub session: QuizSession,
    pub history: AnswerHistory,
    pub stats: Option<QuizStats>,
    pub step: QuizStep,
}

impl ActiveQuiz {
    #[must_use]
    pub fn new(bank: QuestionBank, session: QuizSession) -> Self {
        Self {
            bank,
            session,
            history: AnswerHistory::new(),
            stats: None,
            step: QuizStep::Answering(AnswerDraft::default()),
        }
    }

    /// 1-based number of the question on screen.
    #[must_use]
    pub fn question_number(&self) -> usize {
        match self.step {
            QuizStep::Answering(_) => self.history.next_question_number(),
            QuizStep::Reviewing(_) => self.history.len(),
        }
    }
}

/// Final state of a finished quiz.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedQuiz {
    pub quiz_id: QuizId,
    pub session_id: SessionId,
    pub history: AnswerHistory,
    pub stats: QuizStats,
    pub final_result: AnswerResult,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

/// Where the quiz flow currently is.
///
/// Session data only lives inside the variants that need it, so a bank cannot
/// coexist with `NoBank` and a history cannot outlive its quiz.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum QuizState {
    #[default]
    NoDocument,
    NoBank,
    BankReady(QuestionBank),
    InProgress(ActiveQuiz),
    Complete(CompletedQuiz),
}

impl QuizState {
    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        match self {
            QuizState::NoDocument => QuizPhase::NoDocument,
            QuizState::NoBank => QuizPhase::NoBank,
            QuizState::BankReady(_) => QuizPhase::BankReady,
            QuizState::InProgress(active) => match active.step {
                QuizStep::Answering(_) => QuizPhase::Answering,
                QuizStep::Reviewing(_) => QuizPhase::Reviewing,
            },
            QuizState::Complete(_) => QuizPhase::Complete,
        }
    }

    #[must_use]
    pub fn bank(&self) -> Option<&QuestionBank> {
        match self {
            QuizState::BankReady(bank) => Some(bank),
            QuizState::InProgress(active) => Some(&active.bank),
            _ => None,
        }
    }

    #[must_use]
    pub fn history(&self) -> Option<&AnswerHistory> {
        match self {
            QuizState::InProgress(active) => Some(&active.history),
            QuizState::Complete(done) => Some(&done.history),
            _ => None,
        }
    }

    /// Latest stats reported by the service.
    #[must_use]
    pub fn stats(&self) -> Option<&QuizStats> {
        match self {
            QuizState::InProgress(active) => active.stats.as_ref(),
            QuizState::Complete(done) => Some(&done.stats),
            _ => None,
        }
    }
}
