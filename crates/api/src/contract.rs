use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use quiz_core::model::{
    AnswerResult, Difficulty, DocumentId, OptionKey, QuestionBank, QuestionBankItem, QuestionCount,
    QuestionId, QuizId, ResolvedSource, SessionId,
};

/// Errors surfaced by quiz service adapters.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ApiError {
    #[error("could not reach the quiz service: {0}")]
    Network(String),

    #[error("the quiz service did not answer within {}s", .after.as_secs())]
    Timeout { after: Duration },

    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("unexpected response from the quiz service: {0}")]
    Protocol(String),

    #[error("unknown quiz: {0}")]
    UnknownQuiz(QuizId),

    #[error("unknown session: {0}")]
    UnknownSession(SessionId),
}

impl ApiError {
    /// Whether repeating the same request later could succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Network(_) | ApiError::Timeout { .. } => true,
            ApiError::Rejected { status, .. } => *status == 429 || *status >= 500,
            ApiError::Protocol(_) | ApiError::UnknownQuiz(_) | ApiError::UnknownSession(_) => {
                false
            }
        }
    }
}

/// Parameters for generating a question bank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateBankRequest {
    pub count: u32,
    pub source: ResolvedSource,
}

impl GenerateBankRequest {
    #[must_use]
    pub fn new(count: u32, source: ResolvedSource) -> Self {
        Self { count, source }
    }

    #[must_use]
    pub fn document_id(&self) -> Option<&DocumentId> {
        self.source.document_id()
    }

    #[must_use]
    pub fn topic(&self) -> Option<&str> {
        self.source.topic()
    }
}

/// First question of a freshly started session.
#[derive(Debug, Clone, PartialEq)]
pub struct StartedSession {
    pub session_id: SessionId,
    pub question: QuestionBankItem,
    pub current_difficulty: Difficulty,
}

/// Remote quiz service: bank generation, session start and answer grading.
///
/// Difficulty adaptation and scoring happen behind this contract.
#[async_trait]
pub trait QuizApi: Send + Sync {
    /// # Errors
    ///
    /// Returns `ApiError` if the service fails or rejects the request.
    async fn generate_bank(&self, request: GenerateBankRequest) -> Result<QuestionBank, ApiError>;

    /// # Errors
    ///
    /// Returns `ApiError` if the service fails or the quiz is unknown.
    async fn start_session(
        &self,
        quiz_id: &QuizId,
        question_count: QuestionCount,
    ) -> Result<StartedSession, ApiError>;

    /// # Errors
    ///
    /// Returns `ApiError` if the service fails or the session is unknown.
    async fn submit_answer(
        &self,
        session_id: &SessionId,
        question_id: &QuestionId,
        answer: OptionKey,
    ) -> Result<AnswerResult, ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_errors_are_transient_ones() {
        assert!(ApiError::Network("reset".into()).is_retryable());
        assert!(
            ApiError::Timeout {
                after: Duration::from_secs(5)
            }
            .is_retryable()
        );
        assert!(
            ApiError::Rejected {
                status: 503,
                message: "busy".into()
            }
            .is_retryable()
        );
        assert!(
            ApiError::Rejected {
                status: 429,
                message: "slow down".into()
            }
            .is_retryable()
        );
        assert!(
            !ApiError::Rejected {
                status: 422,
                message: "bad topic".into()
            }
            .is_retryable()
        );
        assert!(!ApiError::Protocol("garbage".into()).is_retryable());
    }

    #[test]
    fn rejected_message_is_shown_verbatim() {
        let err = ApiError::Rejected {
            status: 404,
            message: "Quiz not found".into(),
        };
        assert_eq!(err.to_string(), "Quiz not found");
    }
}
