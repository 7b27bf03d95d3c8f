use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use quiz_api::{ApiError, GenerateBankRequest, QuizApi};
use quiz_core::model::{
    AnswerOutcome, AnswerRecord, BankSource, DocumentId, OptionKey, QuestionCount, QuizSession,
    QuizStats,
};
use quiz_core::summary::DifficultyBreakdown;
use quiz_core::{Clock, ValidationError};

use crate::busy::BusyFlag;
use crate::config::{DEFAULT_BANK_SIZE, DEFAULT_TIMEOUT_SECS};
use crate::error::QuizError;

use super::state::{
    ActiveQuiz, AnswerDraft, CompletedQuiz, QuizAction, QuizPhase, QuizState, QuizStep,
};
use super::summary::QuizSummary;

/// Session-scoped driver of the quiz flow.
///
/// Owns the current `QuizState` and is the only thing that mutates it. Remote
/// operations run one at a time, bounded by `request_timeout`, and only touch
/// state after the service has answered successfully.
pub struct QuizSessionController {
    api: Arc<dyn QuizApi>,
    clock: Clock,
    bank_size: u32,
    request_timeout: Duration,
    document_id: Option<DocumentId>,
    state: QuizState,
    busy: BusyFlag,
    last_error: Option<String>,
}

impl QuizSessionController {
    #[must_use]
    pub fn new(api: Arc<dyn QuizApi>, clock: Clock) -> Self {
        Self {
            api,
            clock,
            bank_size: DEFAULT_BANK_SIZE,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            document_id: None,
            state: QuizState::NoDocument,
            busy: BusyFlag::new(),
            last_error: None,
        }
    }

    #[must_use]
    pub fn with_bank_size(mut self, bank_size: u32) -> Self {
        self.bank_size = bank_size;
        self
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Start with a document already bound, i.e. in `NoBank`.
    #[must_use]
    pub fn with_document(mut self, document_id: DocumentId) -> Self {
        self.document_id = Some(document_id);
        self.state = QuizState::NoBank;
        self
    }

    //
    // ─── READ SIDE ─────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn state(&self) -> &QuizState {
        &self.state
    }

    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        self.state.phase()
    }

    #[must_use]
    pub fn document_id(&self) -> Option<&DocumentId> {
        self.document_id.as_ref()
    }

    /// Message of the most recent failed action, cleared by the next action.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    /// Handle a front-end can poll from another task while a call is in flight.
    #[must_use]
    pub fn busy_flag(&self) -> BusyFlag {
        self.busy.clone()
    }

    #[must_use]
    pub fn history(&self) -> &[AnswerRecord] {
        self.state
            .history()
            .map_or(&[], |history| history.records())
    }

    #[must_use]
    pub fn stats(&self) -> Option<&QuizStats> {
        self.state.stats()
    }

    /// Running per-difficulty tallies, recomputed from history.
    #[must_use]
    pub fn breakdown(&self) -> DifficultyBreakdown {
        DifficultyBreakdown::from_history(self.history())
    }

    /// Completion summary, available only in `Complete`.
    #[must_use]
    pub fn summary(&self) -> Option<QuizSummary> {
        match &self.state {
            QuizState::Complete(done) => Some(QuizSummary::from_completed(done)),
            _ => None,
        }
    }

    //
    // ─── LOCAL TRANSITIONS ─────────────────────────────────────────────────────
    //

    /// Bind the document banks are generated from.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidTransition` once a bank exists.
    pub fn bind_document(&mut self, document_id: DocumentId) -> Result<(), QuizError> {
        let outcome = self.try_bind_document(document_id);
        self.settle(QuizAction::BindDocument, outcome)
    }

    fn try_bind_document(&mut self, document_id: DocumentId) -> Result<(), QuizError> {
        self.expect_phase(
            QuizAction::BindDocument,
            &[QuizPhase::NoDocument, QuizPhase::NoBank],
        )?;
        tracing::info!(document_id = %document_id, "document bound");
        self.document_id = Some(document_id);
        self.state = QuizState::NoBank;
        Ok(())
    }

    /// Select the option at `index` (0-based) of the current question.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Validation` for an index past the last option, or
    /// `QuizError::InvalidTransition` outside `Answering`.
    pub fn select_option(&mut self, index: usize) -> Result<(), QuizError> {
        let outcome = self.try_select(|active| {
            Ok(active.session.current_question().key_at(index)?)
        });
        self.settle(QuizAction::SelectOption, outcome)
    }

    /// Select the option whose label starts with `key` (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Validation` for a key no option carries, or
    /// `QuizError::InvalidTransition` outside `Answering`.
    pub fn select_key(&mut self, key: OptionKey) -> Result<(), QuizError> {
        let outcome = self.try_select(|active| {
            let question = active.session.current_question();
            let index = question
                .index_of(key)
                .ok_or(ValidationError::UnknownOptionKey { key: key.as_char() })?;
            Ok(question.key_at(index)?)
        });
        self.settle(QuizAction::SelectOption, outcome)
    }

    fn try_select(
        &mut self,
        pick: impl FnOnce(&ActiveQuiz) -> Result<OptionKey, QuizError>,
    ) -> Result<(), QuizError> {
        let invalid = self.invalid(QuizAction::SelectOption);
        let QuizState::InProgress(active) = &mut self.state else {
            return Err(invalid);
        };
        if !matches!(active.step, QuizStep::Answering(_)) {
            return Err(invalid);
        }
        let key = pick(active)?;
        if let QuizStep::Answering(draft) = &mut active.step {
            draft.selected = Some(key);
        }
        Ok(())
    }

    /// Show or hide the hint of the current question.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidTransition` outside `Answering`.
    pub fn toggle_hint(&mut self) -> Result<(), QuizError> {
        let invalid = self.invalid(QuizAction::ToggleHint);
        let outcome = match &mut self.state {
            QuizState::InProgress(ActiveQuiz {
                step: QuizStep::Answering(draft),
                ..
            }) => {
                draft.hint_visible = !draft.hint_visible;
                Ok(())
            }
            _ => Err(invalid),
        };
        self.settle(QuizAction::ToggleHint, outcome)
    }

    /// Leave the review screen for the question the service picked next.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidTransition` outside `Reviewing`.
    pub fn next_question(&mut self) -> Result<(), QuizError> {
        let outcome = self.try_next_question();
        self.settle(QuizAction::NextQuestion, outcome)
    }

    fn try_next_question(&mut self) -> Result<(), QuizError> {
        let invalid = self.invalid(QuizAction::NextQuestion);
        let QuizState::InProgress(active) = &mut self.state else {
            return Err(invalid);
        };
        let QuizStep::Reviewing(result) = &active.step else {
            return Err(invalid);
        };
        let AnswerOutcome::Next {
            question,
            difficulty,
        } = &result.outcome
        else {
            return Err(invalid);
        };

        active.session.advance(question.clone(), *difficulty);
        active.step = QuizStep::Answering(AnswerDraft::default());
        tracing::info!(
            session_id = %active.session.id(),
            question_id = %active.session.current_question().id(),
            difficulty = %active.session.current_difficulty(),
            "next question"
        );
        Ok(())
    }

    /// Discard the bank without starting a quiz.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidTransition` outside `BankReady`.
    pub fn new_bank(&mut self) -> Result<(), QuizError> {
        let outcome = self
            .expect_phase(QuizAction::NewBank, &[QuizPhase::BankReady])
            .map(|()| self.reset());
        self.settle(QuizAction::NewBank, outcome)
    }

    /// Clear the finished session, its history and its bank.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidTransition` outside `Complete`.
    pub fn new_quiz(&mut self) -> Result<(), QuizError> {
        let outcome = self
            .expect_phase(QuizAction::NewQuiz, &[QuizPhase::Complete])
            .map(|()| self.reset());
        self.settle(QuizAction::NewQuiz, outcome)
    }

    fn reset(&mut self) {
        self.state = if self.document_id.is_some() {
            QuizState::NoBank
        } else {
            QuizState::NoDocument
        };
        tracing::info!(phase = %self.state.phase(), "quiz reset");
    }

    //
    // ─── REMOTE TRANSITIONS ────────────────────────────────────────────────────
    //

    /// Ask the service for a question bank built from `source`.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Validation` for a blank topic or a document source
    /// with no bound document (checked before any request), `QuizError::Busy`,
    /// `QuizError::Api` for service failures, or `QuizError::InvalidTransition`
    /// once a bank exists.
    pub async fn generate_bank(&mut self, source: BankSource) -> Result<(), QuizError> {
        let outcome = self.try_generate_bank(source).await;
        self.settle(QuizAction::GenerateBank, outcome)
    }

    async fn try_generate_bank(&mut self, source: BankSource) -> Result<(), QuizError> {
        self.expect_phase(
            QuizAction::GenerateBank,
            &[QuizPhase::NoDocument, QuizPhase::NoBank],
        )?;
        let resolved = source.resolve(self.document_id.as_ref())?;
        let request = GenerateBankRequest::new(self.bank_size, resolved);

        let api = Arc::clone(&self.api);
        let bank = remote(&self.busy, self.request_timeout, api.generate_bank(request)).await?;

        tracing::info!(
            quiz_id = %bank.quiz_id(),
            questions = bank.len(),
            "question bank ready"
        );
        self.state = QuizState::BankReady(bank);
        Ok(())
    }

    /// Start an adaptive session of `count` questions over the current bank.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Busy`, `QuizError::Api` for service failures, or
    /// `QuizError::InvalidTransition` outside `BankReady`.
    pub async fn start_quiz(&mut self, count: QuestionCount) -> Result<(), QuizError> {
        let outcome = self.try_start_quiz(count).await;
        self.settle(QuizAction::StartQuiz, outcome)
    }

    async fn try_start_quiz(&mut self, count: QuestionCount) -> Result<(), QuizError> {
        let QuizState::BankReady(bank) = &self.state else {
            return Err(self.invalid(QuizAction::StartQuiz));
        };
        let quiz_id = bank.quiz_id().clone();

        let api = Arc::clone(&self.api);
        let started = remote(
            &self.busy,
            self.request_timeout,
            api.start_session(&quiz_id, count),
        )
        .await?;

        tracing::info!(
            quiz_id = %quiz_id,
            session_id = %started.session_id,
            difficulty = %started.current_difficulty,
            questions = count.get(),
            "quiz started"
        );
        let session = QuizSession::new(
            started.session_id,
            quiz_id,
            started.question,
            started.current_difficulty,
            count,
            self.clock.now(),
        );
        self.state = match std::mem::take(&mut self.state) {
            QuizState::BankReady(bank) => QuizState::InProgress(ActiveQuiz::new(bank, session)),
            other => other,
        };
        Ok(())
    }

    /// Submit the selected option for grading.
    ///
    /// On success one record is appended to the history and the stats are
    /// replaced. A result that ends the session moves straight to `Complete`.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Validation` when nothing is selected,
    /// `QuizError::Busy`, `QuizError::Api` for service failures, or
    /// `QuizError::InvalidTransition` outside `Answering`.
    pub async fn submit_answer(&mut self) -> Result<(), QuizError> {
        let outcome = self.try_submit_answer().await;
        self.settle(QuizAction::SubmitAnswer, outcome)
    }

    async fn try_submit_answer(&mut self) -> Result<(), QuizError> {
        let QuizState::InProgress(ActiveQuiz {
            session,
            step: QuizStep::Answering(draft),
            ..
        }) = &self.state
        else {
            return Err(self.invalid(QuizAction::SubmitAnswer));
        };
        let key = draft.selected.ok_or(ValidationError::NoOptionSelected)?;
        let session_id = session.id().clone();
        let question = session.current_question().clone();
        let difficulty = session.current_difficulty();

        let api = Arc::clone(&self.api);
        let result = remote(
            &self.busy,
            self.request_timeout,
            api.submit_answer(&session_id, question.id(), key),
        )
        .await?;

        tracing::info!(
            session_id = %session_id,
            question_id = %question.id(),
            correct = result.is_correct,
            reward = result.reward,
            complete = result.is_complete(),
            "answer graded"
        );
        let record = AnswerRecord {
            question_text: question.text().to_owned(),
            user_answer: key,
            correct_answer: result.correct_answer.clone(),
            is_correct: result.is_correct,
            reward: result.reward,
            difficulty,
            answered_at: self.clock.now(),
        };

        self.state = match std::mem::take(&mut self.state) {
            QuizState::InProgress(mut active) => {
                active.history.record(record);
                active.stats = Some(result.stats.clone());
                if result.is_complete() {
                    tracing::info!(
                        session_id = %session_id,
                        answered = active.history.len(),
                        "quiz complete"
                    );
                    QuizState::Complete(CompletedQuiz {
                        quiz_id: active.session.quiz_id().clone(),
                        session_id,
                        history: active.history,
                        stats: result.stats.clone(),
                        started_at: active.session.started_at(),
                        completed_at: self.clock.now(),
                        final_result: result,
                    })
                } else {
                    active.step = QuizStep::Reviewing(result);
                    QuizState::InProgress(active)
                }
            }
            other => other,
        };
        Ok(())
    }

    //
    // ─── HELPERS ───────────────────────────────────────────────────────────────
    //

    fn invalid(&self, action: QuizAction) -> QuizError {
        QuizError::InvalidTransition {
            action,
            phase: self.phase(),
        }
    }

    fn expect_phase(&self, action: QuizAction, allowed: &[QuizPhase]) -> Result<(), QuizError> {
        if allowed.contains(&self.phase()) {
            Ok(())
        } else {
            Err(self.invalid(action))
        }
    }

    /// Record the outcome of an action in `last_error`.
    fn settle<T>(
        &mut self,
        action: QuizAction,
        outcome: Result<T, QuizError>,
    ) -> Result<T, QuizError> {
        match &outcome {
            Ok(_) => self.last_error = None,
            Err(err) => {
                tracing::warn!(
                    action = %action,
                    phase = %self.phase(),
                    retryable = err.is_retryable(),
                    error = %err,
                    "quiz action failed"
                );
                self.last_error = Some(err.to_string());
            }
        }
        outcome
    }
}

/// Run one remote call under the busy flag and the request timeout.
async fn remote<T>(
    busy: &BusyFlag,
    timeout: Duration,
    call: impl Future<Output = Result<T, ApiError>>,
) -> Result<T, QuizError> {
    let _guard = busy.try_acquire().ok_or(QuizError::Busy)?;
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(ApiError::Timeout { after: timeout }.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_api::InMemoryQuizApi;

    #[tokio::test]
    async fn busy_flag_rejects_overlapping_calls() {
        let busy = BusyFlag::new();
        let _held = busy.try_acquire().unwrap();

        let err = remote(&busy, Duration::from_secs(1), async { Ok::<_, ApiError>(()) })
            .await
            .unwrap_err();
        assert_eq!(err, QuizError::Busy);
    }

    #[tokio::test]
    async fn elapsed_timeout_maps_to_api_timeout() {
        let busy = BusyFlag::new();
        let err = remote(&busy, Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok::<_, ApiError>(())
        })
        .await
        .unwrap_err();

        assert_eq!(
            err,
            QuizError::Api(ApiError::Timeout {
                after: Duration::from_millis(10)
            })
        );
        assert!(!busy.is_busy());
    }

    #[test]
    fn local_actions_outside_their_phase_are_rejected() {
        let mut controller =
            QuizSessionController::new(Arc::new(InMemoryQuizApi::new()), Clock::default());

        let err = controller.toggle_hint().unwrap_err();
        assert_eq!(
            err,
            QuizError::InvalidTransition {
                action: QuizAction::ToggleHint,
                phase: QuizPhase::NoDocument,
            }
        );
        assert_eq!(controller.last_error(), Some(err.to_string().as_str()));

        controller.bind_document(DocumentId::new("doc")).unwrap();
        assert_eq!(controller.phase(), QuizPhase::NoBank);
        assert!(controller.last_error().is_none());
    }
}
