mod wire;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

use quiz_core::model::{
    AnswerResult, OptionKey, QuestionBank, QuestionCount, QuestionId, QuizId, SessionId,
};

use crate::contract::{ApiError, GenerateBankRequest, QuizApi, StartedSession};
use wire::{
    AnswerResponse, BankResponse, ErrorBody, GenerateBankBody, StartSessionBody,
    StartSessionResponse, SubmitAnswerBody,
};

const GENERATE_BANK_PATH: &str = "competitive-quiz/generate-bank";
const START_SESSION_PATH: &str = "competitive-quiz/start";
const SUBMIT_ANSWER_PATH: &str = "competitive-quiz/answer";

#[derive(Clone, Debug)]
pub struct HttpQuizApiConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl HttpQuizApiConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            timeout,
        }
    }
}

/// `QuizApi` over JSON/HTTP.
#[derive(Clone)]
pub struct HttpQuizApi {
    client: Client,
    config: HttpQuizApiConfig,
}

impl HttpQuizApi {
    /// # Errors
    ///
    /// Returns `ApiError::Network` if the HTTP client cannot be constructed.
    pub fn new(config: HttpQuizApiConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(Self { client, config })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.config.base_url.trim_end_matches('/'))
    }

    fn transport_error(&self, err: &reqwest::Error) -> ApiError {
        if err.is_timeout() {
            ApiError::Timeout {
                after: self.config.timeout,
            }
        } else {
            ApiError::Network(err.to_string())
        }
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.endpoint(path);
        tracing::debug!(%url, "quiz service request");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&text)
                .ok()
                .map(|body| body.message())
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("request failed")
                        .to_string()
                });
            tracing::debug!(
                %url,
                status = status.as_u16(),
                %message,
                "quiz service rejected request"
            );
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(&e))?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Protocol(e.to_string()))
    }
}

#[async_trait]
impl QuizApi for HttpQuizApi {
    async fn generate_bank(&self, request: GenerateBankRequest) -> Result<QuestionBank, ApiError> {
        let body = GenerateBankBody {
            num_questions: request.count,
            document_id: request.document_id().map(|id| id.as_str()),
            topic: request.topic(),
        };
        let response: BankResponse = self.post(GENERATE_BANK_PATH, &body).await?;
        response.into_bank()
    }

    async fn start_session(
        &self,
        quiz_id: &QuizId,
        question_count: QuestionCount,
    ) -> Result<StartedSession, ApiError> {
        let body = StartSessionBody {
            quiz_id: quiz_id.as_str(),
            num_questions: question_count.get(),
        };
        let response: StartSessionResponse = self.post(START_SESSION_PATH, &body).await?;
        response.into_started()
    }

    async fn submit_answer(
        &self,
        session_id: &SessionId,
        question_id: &QuestionId,
        answer: OptionKey,
    ) -> Result<AnswerResult, ApiError> {
        let body = SubmitAnswerBody {
            session_id: session_id.as_str(),
            question_id: question_id.as_str(),
            answer: answer.to_string(),
        };
        let response: AnswerResponse = self.post(SUBMIT_ANSWER_PATH, &body).await?;
        response.into_result()
    }
}
