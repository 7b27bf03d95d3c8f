mod controller;
mod state;
mod summary;

// Public API of the quiz flow.
pub use controller::QuizSessionController;
pub use state::{
    ActiveQuiz, AnswerDraft, CompletedQuiz, QuizAction, QuizPhase, QuizState, QuizStep,
};
pub use summary::{AnswerSummaryItem, QuizSummary};
