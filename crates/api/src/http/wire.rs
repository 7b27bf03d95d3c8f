//! JSON shapes exchanged with the quiz service and their mapping to domain types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use quiz_core::model::{
    AnswerOutcome, AnswerResult, Difficulty, PerformanceTrend, QuestionBank, QuestionBankItem,
    QuestionId, QuizId, QuizStats, SessionId,
};

use crate::contract::{ApiError, StartedSession};

//
// ─── REQUESTS ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Serialize)]
pub(crate) struct GenerateBankBody<'a> {
    pub num_questions: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub(crate) struct StartSessionBody<'a> {
    pub quiz_id: &'a str,
    pub num_questions: u32,
}

#[derive(Debug, Serialize)]
pub(crate) struct SubmitAnswerBody<'a> {
    pub session_id: &'a str,
    pub question_id: &'a str,
    pub answer: String,
}

//
// ─── RESPONSES ─────────────────────────────────────────────────────────────────
//

/// Ids arrive as strings from most deployments and as integers from some.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum WireId {
    Text(String),
    Number(i64),
}

impl WireId {
    fn into_string(self) -> String {
        match self {
            WireId::Text(s) => s,
            WireId::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct QuestionDto {
    question_id: WireId,
    #[serde(alias = "question_text")]
    question: String,
    options: Vec<String>,
    #[serde(default)]
    difficulty: Option<String>,
    #[serde(default)]
    hint: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BankResponse {
    quiz_id: WireId,
    #[serde(default)]
    question_bank: Vec<QuestionDto>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StartSessionResponse {
    session_id: WireId,
    question: QuestionDto,
    #[serde(default)]
    current_difficulty: Option<String>,
}

/// Running totals sent with every graded answer. Any field may be missing or
/// `null`, and none of them can fail the decode.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct StatsDto {
    #[serde(default)]
    accuracy: Option<f64>,
    #[serde(default)]
    correct_answers: Option<serde_json::Value>,
    #[serde(default)]
    questions_answered: Option<serde_json::Value>,
    #[serde(default)]
    total_reward: Option<f64>,
    #[serde(default)]
    performance_trend: Option<String>,
    #[serde(default)]
    difficulty_distribution: Option<BTreeMap<String, serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AnswerResponse {
    is_correct: bool,
    #[serde(default)]
    correct_answer: Option<String>,
    #[serde(default)]
    reward: f64,
    #[serde(default)]
    explanation: Option<String>,
    #[serde(default)]
    is_complete: bool,
    #[serde(default)]
    next_question: Option<QuestionDto>,
    #[serde(default)]
    next_difficulty: Option<String>,
    #[serde(default)]
    stats: Option<StatsDto>,
}

/// FastAPI-style error payload.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    detail: serde_json::Value,
}

impl ErrorBody {
    pub(crate) fn message(&self) -> String {
        match &self.detail {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

//
// ─── MAPPING ───────────────────────────────────────────────────────────────────
//

fn parse_difficulty(raw: &str) -> Result<Difficulty, ApiError> {
    raw.parse()
        .map_err(|e: quiz_core::model::ParseDifficultyError| ApiError::Protocol(e.to_string()))
}

fn parse_optional_difficulty(raw: Option<&str>) -> Result<Option<Difficulty>, ApiError> {
    raw.filter(|s| !s.trim().is_empty())
        .map(parse_difficulty)
        .transpose()
}

impl QuestionDto {
    pub(crate) fn into_item(self) -> Result<QuestionBankItem, ApiError> {
        let difficulty = parse_optional_difficulty(self.difficulty.as_deref())?.unwrap_or_default();
        let id = self.question_id.into_string();
        QuestionBankItem::new(
            QuestionId::new(id.clone()),
            self.question,
            self.options,
            difficulty,
            self.hint,
        )
        .map_err(|e| ApiError::Protocol(format!("question {id}: {e}")))
    }
}

impl BankResponse {
    pub(crate) fn into_bank(self) -> Result<QuestionBank, ApiError> {
        if self.question_bank.is_empty() {
            return Err(ApiError::Protocol("question bank is empty".into()));
        }
        let items = self
            .question_bank
            .into_iter()
            .map(QuestionDto::into_item)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(QuestionBank::new(QuizId::new(self.quiz_id.into_string()), items))
    }
}

impl StartSessionResponse {
    pub(crate) fn into_started(self) -> Result<StartedSession, ApiError> {
        let question = self.question.into_item()?;
        let current_difficulty = parse_optional_difficulty(self.current_difficulty.as_deref())?
            .unwrap_or_else(|| question.difficulty());
        Ok(StartedSession {
            session_id: SessionId::new(self.session_id.into_string()),
            question,
            current_difficulty,
        })
    }
}

/// Non-negative count from any JSON number, rounded to the nearest whole.
fn lenient_count(value: &serde_json::Value) -> Option<u32> {
    let n = value.as_f64().filter(|n| n.is_finite() && *n >= 0.0)?;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let count = n.round().min(f64::from(u32::MAX)) as u32;
    Some(count)
}

fn finite(value: Option<f64>) -> f64 {
    value.filter(|n| n.is_finite()).unwrap_or_default()
}

impl StatsDto {
    pub(crate) fn into_stats(self) -> QuizStats {
        let difficulty_distribution = self
            .difficulty_distribution
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(label, raw)| {
                let Ok(difficulty) = label.parse::<Difficulty>() else {
                    tracing::debug!(label = %label, "ignoring unknown difficulty in distribution");
                    return None;
                };
                match lenient_count(&raw) {
                    Some(count) => Some((difficulty, count)),
                    None => {
                        tracing::debug!(label = %label, value = %raw, "ignoring non-numeric distribution entry");
                        None
                    }
                }
            })
            .collect();

        QuizStats {
            accuracy: finite(self.accuracy),
            correct_answers: self.correct_answers.as_ref().and_then(lenient_count).unwrap_or(0),
            questions_answered: self
                .questions_answered
                .as_ref()
                .and_then(lenient_count)
                .unwrap_or(0),
            total_reward: finite(self.total_reward),
            performance_trend: self
                .performance_trend
                .as_deref()
                .map(PerformanceTrend::from_label)
                .unwrap_or_default(),
            difficulty_distribution,
        }
    }
}

impl AnswerResponse {
    pub(crate) fn into_result(self) -> Result<AnswerResult, ApiError> {
        let outcome = if self.is_complete {
            AnswerOutcome::Complete
        } else {
            let question = self
                .next_question
                .ok_or_else(|| {
                    ApiError::Protocol("quiz is not complete but no next question was sent".into())
                })?
                .into_item()?;
            let difficulty = parse_optional_difficulty(self.next_difficulty.as_deref())?
                .unwrap_or_else(|| question.difficulty());
            AnswerOutcome::Next {
                question,
                difficulty,
            }
        };

        Ok(AnswerResult {
            is_correct: self.is_correct,
            correct_answer: self.correct_answer.unwrap_or_default(),
            reward: self.reward,
            explanation: self.explanation.filter(|e| !e.trim().is_empty()),
            stats: self.stats.unwrap_or_default().into_stats(),
            outcome,
        })
    }
}
