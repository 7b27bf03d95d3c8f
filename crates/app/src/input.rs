//! Line input for each quiz phase.

use quiz_core::model::{BankSource, DocumentId, OptionKey, QuestionCount};
use services::{QuizError, QuizPhase, QuizSessionController};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    LoadDocument(DocumentId),
    GenerateFromDocument,
    GenerateFromTopic(String),
    Start(Option<u32>),
    DiscardBank,
    SelectIndex(usize),
    SelectKey(OptionKey),
    ToggleHint,
    Submit,
    Next,
    NewQuiz,
}

impl Command {
    /// Whether this command waits on the quiz service.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Command::GenerateFromDocument
                | Command::GenerateFromTopic(_)
                | Command::Start(_)
                | Command::Submit
        )
    }
}

/// Interpret one line typed while the controller is in `phase`.
///
/// `keys` are the answer keys of the question on screen. While answering, a
/// letter that names one of them selects it, even `h` or `q`.
///
/// Returns a usage hint for input that means nothing in this phase.
pub fn parse(phase: QuizPhase, line: &str, keys: &[OptionKey]) -> Result<Command, &'static str> {
    let line = line.trim();
    if phase == QuizPhase::Answering {
        if let Some(key) = option_key(line, keys) {
            return Ok(Command::SelectKey(key));
        }
    }
    if line.eq_ignore_ascii_case("q") {
        return Ok(Command::Quit);
    }

    match phase {
        QuizPhase::NoDocument | QuizPhase::NoBank => {
            if line == "doc" {
                return Err("usage: doc <document id>");
            }
            if let Some(id) = line.strip_prefix("doc ") {
                return Ok(Command::LoadDocument(DocumentId::new(id.trim())));
            }
            if line.is_empty() && phase == QuizPhase::NoBank {
                Ok(Command::GenerateFromDocument)
            } else {
                Ok(Command::GenerateFromTopic(line.to_owned()))
            }
        }
        QuizPhase::BankReady => match line {
            "" => Ok(Command::Start(None)),
            "new" => Ok(Command::DiscardBank),
            count => count
                .parse()
                .map(|n| Command::Start(Some(n)))
                .map_err(|_| "enter a question count, or `new` for another bank"),
        },
        QuizPhase::Answering => match line {
            "" => Ok(Command::Submit),
            "h" | "H" | "?" => Ok(Command::ToggleHint),
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(digit @ '1'..='9'), None) => {
                        Ok(Command::SelectIndex(digit as usize - '1' as usize))
                    }
                    (Some(letter), None) if letter.is_alphabetic() => {
                        Ok(Command::SelectKey(OptionKey::new(letter)))
                    }
                    _ => Err("pick an option by letter or number, `?` for the hint"),
                }
            }
        },
        QuizPhase::Reviewing => match line {
            "" => Ok(Command::Next),
            _ => Err("press enter for the next question"),
        },
        QuizPhase::Complete => match line {
            "" | "new" => Ok(Command::NewQuiz),
            _ => Err("press enter to start over"),
        },
    }
}

fn option_key(line: &str, keys: &[OptionKey]) -> Option<OptionKey> {
    let mut chars = line.chars();
    let (Some(letter), None) = (chars.next(), chars.next()) else {
        return None;
    };
    let typed = OptionKey::new(letter);
    keys.iter().any(|key| key.matches(typed)).then_some(typed)
}

/// Run `command` against the controller.
pub async fn apply(
    controller: &mut QuizSessionController,
    command: Command,
    default_count: QuestionCount,
) -> Result<(), QuizError> {
    match command {
        Command::Quit => Ok(()),
        Command::LoadDocument(id) => controller.bind_document(id),
        Command::GenerateFromDocument => controller.generate_bank(BankSource::Document).await,
        Command::GenerateFromTopic(topic) => {
            controller.generate_bank(BankSource::Topic(topic)).await
        }
        Command::Start(count) => {
            let count = match count {
                Some(n) => QuestionCount::new(n)?,
                None => default_count,
            };
            controller.start_quiz(count).await
        }
        Command::DiscardBank => controller.new_bank(),
        Command::SelectIndex(index) => controller.select_option(index),
        Command::SelectKey(key) => controller.select_key(key),
        Command::ToggleHint => controller.toggle_hint(),
        Command::Submit => controller.submit_answer().await,
        Command::Next => controller.next_question(),
        Command::NewQuiz => controller.new_quiz(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abcd() -> Vec<OptionKey> {
        "ABCD".chars().map(OptionKey::new).collect()
    }

    #[test]
    fn quit_works_in_every_phase() {
        for phase in [
            QuizPhase::NoDocument,
            QuizPhase::BankReady,
            QuizPhase::Answering,
            QuizPhase::Complete,
        ] {
            assert_eq!(parse(phase, " Q\n", &abcd()), Ok(Command::Quit));
        }
    }

    #[test]
    fn empty_line_means_the_default_action() {
        assert_eq!(
            parse(QuizPhase::NoDocument, "\n", &[]),
            Ok(Command::GenerateFromTopic(String::new()))
        );
        assert_eq!(
            parse(QuizPhase::NoBank, "", &[]),
            Ok(Command::GenerateFromDocument)
        );
        assert_eq!(parse(QuizPhase::BankReady, "", &[]), Ok(Command::Start(None)));
        assert_eq!(parse(QuizPhase::Answering, "", &[]), Ok(Command::Submit));
        assert_eq!(parse(QuizPhase::Reviewing, "", &[]), Ok(Command::Next));
        assert_eq!(parse(QuizPhase::Complete, "", &[]), Ok(Command::NewQuiz));
    }

    #[test]
    fn answering_accepts_letters_numbers_and_hint() {
        assert_eq!(
            parse(QuizPhase::Answering, "c", &abcd()),
            Ok(Command::SelectKey(OptionKey::new('c')))
        );
        assert_eq!(parse(QuizPhase::Answering, "2", &[]), Ok(Command::SelectIndex(1)));
        assert_eq!(parse(QuizPhase::Answering, "h", &abcd()), Ok(Command::ToggleHint));
        assert_eq!(parse(QuizPhase::Answering, "?", &abcd()), Ok(Command::ToggleHint));
        assert!(parse(QuizPhase::Answering, "abc", &[]).is_err());
    }

    #[test]
    fn option_keys_win_over_hint_and_quit_letters() {
        let keys: Vec<OptionKey> = "GHQR".chars().map(OptionKey::new).collect();
        assert_eq!(
            parse(QuizPhase::Answering, "h", &keys),
            Ok(Command::SelectKey(OptionKey::new('h')))
        );
        assert_eq!(
            parse(QuizPhase::Answering, "Q", &keys),
            Ok(Command::SelectKey(OptionKey::new('Q')))
        );
        assert_eq!(parse(QuizPhase::Answering, "?", &keys), Ok(Command::ToggleHint));
        assert_eq!(parse(QuizPhase::Reviewing, "q", &keys), Ok(Command::Quit));
    }

    #[test]
    fn bank_ready_reads_counts() {
        assert_eq!(parse(QuizPhase::BankReady, "7", &[]), Ok(Command::Start(Some(7))));
        assert_eq!(parse(QuizPhase::BankReady, "new", &[]), Ok(Command::DiscardBank));
        assert!(parse(QuizPhase::BankReady, "seven", &[]).is_err());
    }

    #[test]
    fn doc_prefix_loads_a_document() {
        assert_eq!(
            parse(QuizPhase::NoDocument, "doc  42 ", &[]),
            Ok(Command::LoadDocument(DocumentId::new("42")))
        );
        assert!(parse(QuizPhase::NoBank, "doc ", &[]).is_err());
    }
}
