use thiserror::Error;

use crate::model::QuestionError;

/// Input problems detected locally, before any request leaves the client.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationError {
    #[error("enter a topic")]
    BlankTopic,

    #[error("no document is loaded")]
    MissingDocument,

    #[error("question count must be between {min} and {max}, got {count}")]
    QuestionCountOutOfRange { count: u32, min: u32, max: u32 },

    #[error("select an answer first")]
    NoOptionSelected,

    #[error("option {index} does not exist")]
    OptionOutOfRange { index: usize },

    #[error("no option starts with '{key}'")]
    UnknownOptionKey { key: char },

    #[error(transparent)]
    InvalidQuestion(#[from] QuestionError),
}
