use serde::{Deserialize, Serialize};
use std::fmt;

/// Error returned when an identifier string is empty or whitespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: &'static str,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} cannot be blank", self.kind)
    }
}

impl std::error::Error for ParseIdError {}

// Identifiers are minted by the quiz service; the client only carries them.
macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err(ParseIdError {
                        kind: stringify!($name),
                    });
                }
                Ok(Self(trimmed.to_owned()))
            }
        }
    };
}

opaque_id!(
    /// Uploaded document a bank can be generated from.
    DocumentId
);
opaque_id!(
    /// Generated question bank.
    QuizId
);
opaque_id!(
    /// One quiz attempt against a bank.
    SessionId
);
opaque_id!(QuestionId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_and_rejects_blank() {
        let id: QuizId = "  quiz-7 ".parse().unwrap();
        assert_eq!(id.as_str(), "quiz-7");
        assert_eq!(id.to_string(), "quiz-7");

        let err = "   ".parse::<SessionId>().unwrap_err();
        assert_eq!(err.to_string(), "SessionId cannot be blank");
    }

    #[test]
    fn debug_names_the_kind() {
        assert_eq!(format!("{:?}", DocumentId::new("doc")), "DocumentId(doc)");
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&QuestionId::new("q1")).unwrap();
        assert_eq!(json, "\"q1\"");
    }
}
