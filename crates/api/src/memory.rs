//! Deterministic in-process quiz service for tests and offline runs.
//!
//! Difficulty moves one tier up after a correct answer and one tier down
//! after a wrong one. This is only a stand-in for the real service.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use quiz_core::model::{
    AnswerOutcome, AnswerResult, Difficulty, OptionKey, PerformanceTrend, QuestionBank,
    QuestionBankItem, QuestionCount, QuestionId, QuizId, QuizStats, ResolvedSource, SessionId,
};

use crate::contract::{ApiError, GenerateBankRequest, QuizApi, StartedSession};

const OPTION_LABELS: [char; 4] = ['A', 'B', 'C', 'D'];

#[derive(Debug, Clone)]
struct StoredQuestion {
    item: QuestionBankItem,
    correct: OptionKey,
}

#[derive(Debug)]
struct SessionProgress {
    quiz_id: QuizId,
    target: u32,
    asked: HashSet<QuestionId>,
    current: QuestionId,
    difficulty: Difficulty,
    answered: u32,
    correct: u32,
    total_reward: f64,
    recent: Vec<bool>,
    distribution: BTreeMap<Difficulty, u32>,
    complete: bool,
}

impl SessionProgress {
    fn stats(&self) -> QuizStats {
        let accuracy = if self.answered == 0 {
            0.0
        } else {
            f64::from(self.correct) / f64::from(self.answered) * 100.0
        };
        let performance_trend = match self.recent.as_slice() {
            [.., true, true] => PerformanceTrend::Improving,
            [.., false, false] => PerformanceTrend::Declining,
            _ => PerformanceTrend::Stable,
        };
        QuizStats {
            accuracy,
            correct_answers: self.correct,
            questions_answered: self.answered,
            total_reward: self.total_reward,
            performance_trend,
            difficulty_distribution: self.distribution.clone(),
        }
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    banks: HashMap<QuizId, Vec<StoredQuestion>>,
    sessions: HashMap<SessionId, SessionProgress>,
    failures: VecDeque<ApiError>,
    calls: usize,
}

/// In-memory `QuizApi` with failure injection and optional latency.
#[derive(Clone, Default)]
pub struct InMemoryQuizApi {
    state: Arc<Mutex<MemoryState>>,
    latency: Option<Duration>,
}

impl InMemoryQuizApi {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every call by `latency` before it is handled.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make the next call fail with `err` instead of being handled.
    pub fn fail_next(&self, err: ApiError) {
        if let Ok(mut state) = self.state.lock() {
            state.failures.push_back(err);
        }
    }

    /// Number of calls received so far, failed ones included.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.state.lock().map_or(0, |state| state.calls)
    }

    /// Correct option for a generated question.
    #[must_use]
    pub fn correct_key(&self, question_id: &QuestionId) -> Option<OptionKey> {
        let state = self.state.lock().ok()?;
        state
            .banks
            .values()
            .flatten()
            .find(|stored| stored.item.id() == question_id)
            .map(|stored| stored.correct)
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, ApiError> {
        self.state
            .lock()
            .map_err(|e| ApiError::Network(e.to_string()))
    }

    async fn begin_call(&self) -> Result<(), ApiError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        let mut state = self.lock()?;
        state.calls += 1;
        match state.failures.pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

fn reward_for(difficulty: Difficulty, is_correct: bool) -> f64 {
    if !is_correct {
        return -1.0;
    }
    match difficulty {
        Difficulty::Low => 1.0,
        Difficulty::Medium => 2.0,
        Difficulty::Hard => 3.0,
    }
}

fn build_question(
    quiz_id: &QuizId,
    subject: &str,
    index: usize,
) -> Result<StoredQuestion, ApiError> {
    let difficulty = Difficulty::ALL[index % Difficulty::ALL.len()];
    let correct = OptionKey::new(OPTION_LABELS[index % OPTION_LABELS.len()]);
    let options = OPTION_LABELS
        .iter()
        .enumerate()
        .map(|(slot, label)| format!("{label}) {subject}, choice {}", slot + 1))
        .collect();
    let hint = (difficulty == Difficulty::Hard).then(|| {
        let wrong = OPTION_LABELS[(index + 1) % OPTION_LABELS.len()];
        format!("The answer is not {wrong}.")
    });

    let item = QuestionBankItem::new(
        QuestionId::new(format!("{quiz_id}-q{}", index + 1)),
        format!("{subject}: question {}", index + 1),
        options,
        difficulty,
        hint,
    )
    .map_err(|e| ApiError::Protocol(e.to_string()))?;

    Ok(StoredQuestion { item, correct })
}

fn pick_next<'a>(
    bank: &'a [StoredQuestion],
    asked: &HashSet<QuestionId>,
    difficulty: Difficulty,
) -> Option<&'a StoredQuestion> {
    let unasked = || bank.iter().filter(move |q| !asked.contains(q.item.id()));
    unasked()
        .find(|q| q.item.difficulty() == difficulty)
        .or_else(|| unasked().next())
}

#[async_trait]
impl QuizApi for InMemoryQuizApi {
    async fn generate_bank(&self, request: GenerateBankRequest) -> Result<QuestionBank, ApiError> {
        self.begin_call().await?;
        if request.count == 0 {
            return Err(ApiError::Rejected {
                status: 422,
                message: "num_questions must be positive".into(),
            });
        }

        let subject = match &request.source {
            ResolvedSource::Topic(topic) => topic.clone(),
            ResolvedSource::Document(doc) => format!("Document {doc}"),
        };

        let quiz_id = QuizId::new(uuid::Uuid::new_v4().to_string());
        let count = usize::try_from(request.count).unwrap_or(usize::MAX);
        let stored = (0..count)
            .map(|index| build_question(&quiz_id, &subject, index))
            .collect::<Result<Vec<_>, _>>()?;
        let items = stored.iter().map(|q| q.item.clone()).collect();

        self.lock()?.banks.insert(quiz_id.clone(), stored);
        Ok(QuestionBank::new(quiz_id, items))
    }

    async fn start_session(
        &self,
        quiz_id: &QuizId,
        question_count: QuestionCount,
    ) -> Result<StartedSession, ApiError> {
        self.begin_call().await?;
        let mut state = self.lock()?;
        let bank = state
            .banks
            .get(quiz_id)
            .ok_or_else(|| ApiError::UnknownQuiz(quiz_id.clone()))?;

        let difficulty = Difficulty::Medium;
        let first = pick_next(bank, &HashSet::new(), difficulty)
            .ok_or_else(|| ApiError::Protocol("question bank is empty".into()))?
            .item
            .clone();
        let bank_len = u32::try_from(bank.len()).unwrap_or(u32::MAX);

        let session_id = SessionId::new(uuid::Uuid::new_v4().to_string());
        let mut asked = HashSet::new();
        asked.insert(first.id().clone());
        state.sessions.insert(
            session_id.clone(),
            SessionProgress {
                quiz_id: quiz_id.clone(),
                target: question_count.get().min(bank_len),
                asked,
                current: first.id().clone(),
                difficulty,
                answered: 0,
                correct: 0,
                total_reward: 0.0,
                recent: Vec::new(),
                distribution: BTreeMap::new(),
                complete: false,
            },
        );

        Ok(StartedSession {
            session_id,
            question: first,
            current_difficulty: difficulty,
        })
    }

    async fn submit_answer(
        &self,
        session_id: &SessionId,
        question_id: &QuestionId,
        answer: OptionKey,
    ) -> Result<AnswerResult, ApiError> {
        self.begin_call().await?;
        let mut guard = self.lock()?;
        let MemoryState {
            banks, sessions, ..
        } = &mut *guard;

        let progress = sessions
            .get_mut(session_id)
            .ok_or_else(|| ApiError::UnknownSession(session_id.clone()))?;
        if progress.complete {
            return Err(ApiError::Rejected {
                status: 409,
                message: "session already completed".into(),
            });
        }
        if &progress.current != question_id {
            return Err(ApiError::Rejected {
                status: 409,
                message: format!("question {question_id} is not the current question"),
            });
        }

        let bank = banks
            .get(&progress.quiz_id)
            .ok_or_else(|| ApiError::UnknownQuiz(progress.quiz_id.clone()))?;
        let asked_question = bank
            .iter()
            .find(|q| q.item.id() == question_id)
            .ok_or_else(|| ApiError::Protocol(format!("question {question_id} is not in the bank")))?;

        let is_correct = asked_question.correct.matches(answer);
        let reward = reward_for(progress.difficulty, is_correct);
        progress.answered += 1;
        if is_correct {
            progress.correct += 1;
        }
        progress.total_reward += reward;
        progress.recent.push(is_correct);
        *progress.distribution.entry(progress.difficulty).or_insert(0) += 1;

        let next_difficulty = if is_correct {
            progress.difficulty.harder()
        } else {
            progress.difficulty.easier()
        };
        let next = if progress.answered >= progress.target {
            None
        } else {
            pick_next(bank, &progress.asked, next_difficulty).map(|q| q.item.clone())
        };

        let outcome = match next {
            Some(question) => {
                progress.asked.insert(question.id().clone());
                progress.current = question.id().clone();
                progress.difficulty = next_difficulty;
                AnswerOutcome::Next {
                    question,
                    difficulty: next_difficulty,
                }
            }
            None => {
                progress.complete = true;
                AnswerOutcome::Complete
            }
        };

        Ok(AnswerResult {
            is_correct,
            correct_answer: asked_question.correct.to_string(),
            reward,
            explanation: Some(format!(
                "The correct option is {}.",
                asked_question.correct
            )),
            stats: progress.stats(),
            outcome,
        })
    }
}
