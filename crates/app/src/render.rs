//! Plain-text screens, one per quiz state.

use std::io::{self, Write};

use quiz_core::model::{Difficulty, QuestionBank, QuizStats};
use quiz_core::summary::DifficultyBreakdown;
use services::{
    ActiveQuiz, AnswerDraft, QuizPhase, QuizSessionController, QuizState, QuizStep, QuizSummary,
};

pub fn prompt(phase: QuizPhase) -> &'static str {
    match phase {
        QuizPhase::NoDocument => "topic, or doc <id>",
        QuizPhase::NoBank => "enter for the document, or a topic",
        QuizPhase::BankReady => "questions (5-10), or new",
        QuizPhase::Answering => "option, h or ? for hint, enter to submit",
        QuizPhase::Reviewing => "enter for next",
        QuizPhase::Complete => "enter to start over",
    }
}

pub fn render(out: &mut impl Write, controller: &QuizSessionController) -> io::Result<()> {
    match controller.state() {
        QuizState::NoDocument => {
            writeln!(out, "No document loaded.")?;
            writeln!(out, "Type a topic to generate questions about it.")
        }
        QuizState::NoBank => {
            let doc = controller
                .document_id()
                .map_or_else(|| "-".to_owned(), ToString::to_string);
            writeln!(out, "Document {doc} loaded.")?;
            writeln!(out, "Generate a question bank from it, or type a topic instead.")
        }
        QuizState::BankReady(bank) => render_bank(out, bank),
        QuizState::InProgress(active) => match &active.step {
            QuizStep::Answering(draft) => {
                render_question(out, active, draft, &controller.breakdown())
            }
            QuizStep::Reviewing(_) => render_review(out, active),
        },
        QuizState::Complete(_) => match controller.summary() {
            Some(summary) => render_summary(out, &summary),
            None => Ok(()),
        },
    }
}

fn render_bank(out: &mut impl Write, bank: &QuestionBank) -> io::Result<()> {
    writeln!(out, "Question bank ready: {} questions.", bank.len())?;
    let counts = bank.difficulty_counts();
    for difficulty in Difficulty::ALL {
        let count = counts.get(&difficulty).copied().unwrap_or(0);
        writeln!(out, "  {:<6} {count}", difficulty.as_str())?;
    }
    Ok(())
}

fn render_question(
    out: &mut impl Write,
    active: &ActiveQuiz,
    draft: &AnswerDraft,
    breakdown: &DifficultyBreakdown,
) -> io::Result<()> {
    let session = &active.session;
    let question = session.current_question();
    writeln!(
        out,
        "Question {}/{}  [{}]",
        active.question_number(),
        session.question_count().get(),
        session.current_difficulty()
    )?;
    writeln!(out, "{}", question.text())?;
    for (idx, option) in question.options().iter().enumerate() {
        let picked = question
            .key_at(idx)
            .is_ok_and(|key| draft.selected.is_some_and(|sel| sel.matches(key)));
        let marker = if picked { '>' } else { ' ' };
        writeln!(out, " {marker} {option}")?;
    }
    match (question.hint(), draft.hint_visible) {
        (Some(hint), true) => writeln!(out, "Hint: {hint}")?,
        (Some(_), false) => writeln!(out, "(a hint is available)")?,
        (None, _) => {}
    }

    if !breakdown.is_empty() {
        let answered: Vec<String> = breakdown
            .iter()
            .map(|(difficulty, tally)| format!("{difficulty} {}", tally.total))
            .collect();
        writeln!(out, "Answered so far: {}", answered.join(", "))?;
    }
    Ok(())
}

fn render_review(out: &mut impl Write, active: &ActiveQuiz) -> io::Result<()> {
    let QuizStep::Reviewing(result) = &active.step else {
        return Ok(());
    };
    if result.is_correct {
        writeln!(out, "Correct! ({:+.1})", result.reward)?;
    } else {
        writeln!(
            out,
            "Incorrect. The answer was {} ({:+.1})",
            result.correct_answer, result.reward
        )?;
    }
    if let Some(explanation) = &result.explanation {
        writeln!(out, "{explanation}")?;
    }
    render_stats(out, &result.stats)
}

fn render_stats(out: &mut impl Write, stats: &QuizStats) -> io::Result<()> {
    writeln!(
        out,
        "Accuracy {:.0}%  correct {}/{}  reward {:.1}  trend {}",
        stats.accuracy,
        stats.correct_answers,
        stats.questions_answered,
        stats.total_reward,
        stats.performance_trend
    )
}

fn render_summary(out: &mut impl Write, summary: &QuizSummary) -> io::Result<()> {
    writeln!(out, "Quiz complete.")?;
    let last = &summary.final_result;
    if last.is_correct {
        writeln!(out, "Last answer correct ({:+.1})", last.reward)?;
    } else {
        writeln!(
            out,
            "Last answer incorrect, it was {} ({:+.1})",
            last.correct_answer, last.reward
        )?;
    }
    if let Some(explanation) = &last.explanation {
        writeln!(out, "{explanation}")?;
    }

    let stats = &summary.stats;
    render_stats(out, stats)?;
    writeln!(
        out,
        "Correct {} ({:.0}%)  incorrect {}",
        stats.correct_answers,
        stats.correct_percent(),
        stats.incorrect_answers()
    )?;
    writeln!(out, "Reward progress {:.0}%", stats.reward_progress_percent())?;
    writeln!(out, "Time taken: {}s", summary.duration().num_seconds().max(0))?;

    writeln!(out, "By difficulty:")?;
    for difficulty in Difficulty::ALL {
        let tally = summary.breakdown.tally(difficulty);
        writeln!(
            out,
            "  {:<6} {}/{} correct ({}%), reward {:.1}",
            difficulty.as_str(),
            tally.correct,
            tally.total,
            tally.accuracy_percent(),
            tally.reward
        )?;
    }

    writeln!(out, "Answers:")?;
    for item in &summary.answers {
        let verdict = if item.is_correct { "ok" } else { "x " };
        writeln!(
            out,
            "  {:>2}. {verdict} [{}] {:+.1}  {}",
            item.number, item.difficulty, item.reward, item.question_text
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use quiz_api::InMemoryQuizApi;
    use quiz_core::model::{
        AnswerOutcome, AnswerRecord, AnswerResult, BankSource, DocumentId, OptionKey,
        QuestionCount, SessionId,
    };
    use quiz_core::time::{fixed_clock, fixed_now};

    fn screen(controller: &QuizSessionController) -> String {
        let mut buf = Vec::new();
        render(&mut buf, controller).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[tokio::test]
    async fn each_state_has_a_screen() {
        let mut controller =
            QuizSessionController::new(Arc::new(InMemoryQuizApi::new()), fixed_clock())
                .with_bank_size(9);
        assert!(screen(&controller).contains("No document loaded"));

        controller.bind_document(DocumentId::new("d7")).unwrap();
        assert!(screen(&controller).contains("Document d7 loaded"));

        controller.generate_bank(BankSource::Document).await.unwrap();
        let bank = screen(&controller);
        assert!(bank.contains("9 questions"));
        assert!(bank.contains("hard   3"));

        controller
            .start_quiz(QuestionCount::new(5).unwrap())
            .await
            .unwrap();
        controller.select_option(1).unwrap();
        let question = screen(&controller);
        assert!(question.starts_with("Question 1/5  [medium]"));
        assert!(question.contains(" > B)"));

        controller.submit_answer().await.unwrap();
        let review = screen(&controller);
        assert!(review.contains("Accuracy"));
    }

    #[test]
    fn summary_lists_every_tier_and_the_last_verdict() {
        let records = vec![
            AnswerRecord {
                question_text: "Which trait enables `?`?".into(),
                user_answer: OptionKey::new('B'),
                correct_answer: "B".into(),
                is_correct: true,
                reward: 3.0,
                difficulty: Difficulty::Hard,
                answered_at: fixed_now(),
            },
            AnswerRecord {
                question_text: "What does `Box<dyn Error>` erase?".into(),
                user_answer: OptionKey::new('A'),
                correct_answer: "D".into(),
                is_correct: false,
                reward: -1.0,
                difficulty: Difficulty::Hard,
                answered_at: fixed_now(),
            },
        ];
        let stats = QuizStats {
            accuracy: 50.0,
            correct_answers: 1,
            questions_answered: 2,
            total_reward: 2.0,
            ..QuizStats::default()
        };
        let summary = QuizSummary {
            session_id: SessionId::new("sess"),
            stats: stats.clone(),
            breakdown: DifficultyBreakdown::from_history(&records),
            answers: Vec::new(),
            final_result: AnswerResult {
                is_correct: false,
                correct_answer: "D".into(),
                reward: -1.0,
                explanation: Some("It erases the concrete error type.".into()),
                stats,
                outcome: AnswerOutcome::Complete,
            },
            started_at: fixed_now(),
            completed_at: fixed_now() + chrono::Duration::seconds(42),
        };

        let mut buf = Vec::new();
        render_summary(&mut buf, &summary).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.contains("Last answer incorrect, it was D (-1.0)"));
        assert!(text.contains("It erases the concrete error type."));
        assert!(text.contains("Correct 1 (50%)  incorrect 1"));
        assert!(text.contains("Reward progress 10%"));
        assert!(text.contains("Time taken: 42s"));
        assert!(text.contains("  low    0/0 correct (0%), reward 0.0"));
        assert!(text.contains("  medium 0/0 correct (0%), reward 0.0"));
        assert!(text.contains("  hard   1/2 correct (50%), reward 2.0"));
    }
}
