mod answer;
mod difficulty;
mod ids;
mod question;
mod session;
mod source;
mod stats;

pub use answer::{AnswerHistory, AnswerOutcome, AnswerRecord, AnswerResult};
pub use difficulty::{Difficulty, ParseDifficultyError};
pub use ids::{DocumentId, ParseIdError, QuestionId, QuizId, SessionId};
pub use question::{OptionKey, QuestionBank, QuestionBankItem, QuestionCount, QuestionError};
pub use session::QuizSession;
pub use source::{BankSource, ResolvedSource};
pub use stats::{PerformanceTrend, QuizStats};
