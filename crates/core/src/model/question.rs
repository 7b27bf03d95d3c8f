use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

use crate::error::ValidationError;
use crate::model::difficulty::Difficulty;
use crate::model::ids::{QuestionId, QuizId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text cannot be empty")]
    BlankText,

    #[error("a question needs exactly {expected} options, got {count}")]
    WrongOptionCount { count: usize, expected: usize },

    #[error("option {index} is blank")]
    BlankOption { index: usize },
}

//
// ─── OPTION KEY ────────────────────────────────────────────────────────────────
//

/// The token submitted as an answer: the leading character of an option
/// such as `"B) Ownership"`, or its position letter when leading characters
/// collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OptionKey(char);

impl OptionKey {
    #[must_use]
    pub fn new(key: char) -> Self {
        Self(key)
    }

    /// Key of a rendered option, if it has any visible character.
    #[must_use]
    pub fn of_option(option: &str) -> Option<Self> {
        option.trim_start().chars().next().map(Self)
    }

    #[must_use]
    pub fn as_char(self) -> char {
        self.0
    }

    #[must_use]
    pub fn matches(self, other: OptionKey) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

//
// ─── BANK ITEM ─────────────────────────────────────────────────────────────────
//

/// A generated multiple-choice question. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionBankItem {
    id: QuestionId,
    text: String,
    options: Vec<String>,
    difficulty: Difficulty,
    hint: Option<String>,
    keys: Vec<OptionKey>,
}

const POSITIONAL_KEYS: [char; QuestionBankItem::OPTION_COUNT] = ['A', 'B', 'C', 'D'];

impl QuestionBankItem {
    pub const OPTION_COUNT: usize = 4;

    /// Options keep their leading character as key when all four differ
    /// (ignoring case). Otherwise they are keyed `A`-`D` by position.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` when the text is blank, the option count is not
    /// four, or an option is blank.
    pub fn new(
        id: QuestionId,
        text: impl Into<String>,
        options: Vec<String>,
        difficulty: Difficulty,
        hint: Option<String>,
    ) -> Result<Self, QuestionError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(QuestionError::BlankText);
        }
        if options.len() != Self::OPTION_COUNT {
            return Err(QuestionError::WrongOptionCount {
                count: options.len(),
                expected: Self::OPTION_COUNT,
            });
        }

        let mut keys: Vec<OptionKey> = Vec::with_capacity(options.len());
        let mut distinct = true;
        for (index, option) in options.iter().enumerate() {
            let key = OptionKey::of_option(option).ok_or(QuestionError::BlankOption { index })?;
            distinct &= !keys.iter().any(|existing| existing.matches(key));
            keys.push(key);
        }
        if !distinct {
            keys = POSITIONAL_KEYS.into_iter().map(OptionKey::new).collect();
        }

        let hint = hint.filter(|h| !h.trim().is_empty());

        Ok(Self {
            id,
            text,
            options,
            difficulty,
            hint,
            keys,
        })
    }

    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    /// Key of the option at `index`.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::OptionOutOfRange` for an index past the last option.
    pub fn key_at(&self, index: usize) -> Result<OptionKey, ValidationError> {
        self.keys
            .get(index)
            .copied()
            .ok_or(ValidationError::OptionOutOfRange { index })
    }

    /// Position of the option whose key matches `key`, ignoring case.
    #[must_use]
    pub fn index_of(&self, key: OptionKey) -> Option<usize> {
        self.keys.iter().position(|k| k.matches(key))
    }

    /// Answer keys in option order.
    #[must_use]
    pub fn keys(&self) -> &[OptionKey] {
        &self.keys
    }
}

//
// ─── BANK ──────────────────────────────────────────────────────────────────────
//

/// Pool of generated questions identified by the service's quiz id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionBank {
    quiz_id: QuizId,
    items: Vec<QuestionBankItem>,
}

impl QuestionBank {
    #[must_use]
    pub fn new(quiz_id: QuizId, items: Vec<QuestionBankItem>) -> Self {
        Self { quiz_id, items }
    }

    #[must_use]
    pub fn quiz_id(&self) -> &QuizId {
        &self.quiz_id
    }

    #[must_use]
    pub fn items(&self) -> &[QuestionBankItem] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of questions per difficulty; tiers with no questions are omitted.
    #[must_use]
    pub fn difficulty_counts(&self) -> BTreeMap<Difficulty, usize> {
        let mut counts = BTreeMap::new();
        for item in &self.items {
            *counts.entry(item.difficulty()).or_insert(0) += 1;
        }
        counts
    }
}

//
// ─── QUESTION COUNT ────────────────────────────────────────────────────────────
//

/// How many questions a session asks, bounded to 5..=10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct QuestionCount(u32);

impl QuestionCount {
    pub const MIN: u32 = 5;
    pub const MAX: u32 = 10;

    /// # Errors
    ///
    /// Returns `ValidationError::QuestionCountOutOfRange` outside 5..=10.
    pub fn new(count: u32) -> Result<Self, ValidationError> {
        if (Self::MIN..=Self::MAX).contains(&count) {
            Ok(Self(count))
        } else {
            Err(ValidationError::QuestionCountOutOfRange {
                count,
                min: Self::MIN,
                max: Self::MAX,
            })
        }
    }

    #[must_use]
    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for QuestionCount {
    fn default() -> Self {
        Self(Self::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> Vec<String> {
        ["A) one", "B) two", "C) three", "D) four"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    fn item(id: &str, difficulty: Difficulty) -> QuestionBankItem {
        QuestionBankItem::new(QuestionId::new(id), "What?", options(), difficulty, None).unwrap()
    }

    #[test]
    fn rejects_wrong_option_count() {
        let err = QuestionBankItem::new(
            QuestionId::new("q"),
            "What?",
            vec!["A) one".into()],
            Difficulty::Low,
            None,
        )
        .unwrap_err();
        assert_eq!(err, QuestionError::WrongOptionCount { count: 1, expected: 4 });
    }

    #[test]
    fn rejects_blank_options() {
        let mut blank = options();
        blank[2] = "   ".into();
        let err = QuestionBankItem::new(QuestionId::new("q"), "What?", blank, Difficulty::Low, None)
            .unwrap_err();
        assert_eq!(err, QuestionError::BlankOption { index: 2 });
    }

    #[test]
    fn colliding_leading_letters_fall_back_to_positions() {
        let capitals = ["Paris", "Prague", "Rome", "Berlin"]
            .into_iter()
            .map(String::from)
            .collect();
        let q = QuestionBankItem::new(QuestionId::new("q"), "Where?", capitals, Difficulty::Low, None)
            .unwrap();
        assert_eq!(q.key_at(0).unwrap(), OptionKey::new('A'));
        assert_eq!(q.key_at(1).unwrap(), OptionKey::new('B'));
        assert_eq!(q.index_of(OptionKey::new('b')), Some(1));
        assert_eq!(q.index_of(OptionKey::new('P')), None);

        let mut dup = options();
        dup[3] = "a) again".into();
        let q = QuestionBankItem::new(QuestionId::new("q"), "What?", dup, Difficulty::Low, None)
            .unwrap();
        assert_eq!(q.key_at(3).unwrap(), OptionKey::new('D'));
    }

    #[test]
    fn distinct_unprefixed_options_keep_their_leading_letter() {
        let langs = ["Rust", "Go", "Zig", "Haskell"]
            .into_iter()
            .map(String::from)
            .collect();
        let q = QuestionBankItem::new(QuestionId::new("q"), "Which?", langs, Difficulty::Low, None)
            .unwrap();
        assert_eq!(q.keys()[2], OptionKey::new('Z'));
        assert_eq!(q.index_of(OptionKey::new('h')), Some(3));
    }

    #[test]
    fn blank_hint_is_dropped() {
        let q = QuestionBankItem::new(
            QuestionId::new("q"),
            "What?",
            options(),
            Difficulty::Hard,
            Some("  ".into()),
        )
        .unwrap();
        assert_eq!(q.hint(), None);
    }

    #[test]
    fn keys_resolve_both_ways() {
        let q = item("q", Difficulty::Medium);
        assert_eq!(q.key_at(1).unwrap(), OptionKey::new('B'));
        assert_eq!(q.index_of(OptionKey::new('c')), Some(2));
        assert_eq!(q.index_of(OptionKey::new('Z')), None);
        assert_eq!(
            q.key_at(4).unwrap_err(),
            ValidationError::OptionOutOfRange { index: 4 }
        );
    }

    #[test]
    fn bank_counts_by_difficulty() {
        let bank = QuestionBank::new(
            QuizId::new("quiz"),
            vec![
                item("1", Difficulty::Low),
                item("2", Difficulty::Hard),
                item("3", Difficulty::Low),
            ],
        );
        let counts = bank.difficulty_counts();
        assert_eq!(counts.get(&Difficulty::Low), Some(&2));
        assert_eq!(counts.get(&Difficulty::Hard), Some(&1));
        assert_eq!(counts.get(&Difficulty::Medium), None);
    }

    #[test]
    fn question_count_is_bounded() {
        assert!(QuestionCount::new(4).is_err());
        assert!(QuestionCount::new(11).is_err());
        assert_eq!(QuestionCount::new(5).unwrap().get(), 5);
        assert_eq!(QuestionCount::default().get(), 10);
    }
}
