use crate::error::ValidationError;
use crate::model::ids::DocumentId;

/// Where the user asked the bank's questions to come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BankSource {
    /// The currently bound document.
    Document,
    /// A free-text topic.
    Topic(String),
}

/// A bank source checked against the bound document; exactly one side is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedSource {
    Document(DocumentId),
    Topic(String),
}

impl BankSource {
    /// # Errors
    ///
    /// Returns `ValidationError::MissingDocument` when the document source is
    /// picked with nothing bound, and `ValidationError::BlankTopic` for an
    /// empty or whitespace topic.
    pub fn resolve(&self, bound: Option<&DocumentId>) -> Result<ResolvedSource, ValidationError> {
        match self {
            BankSource::Document => bound
                .cloned()
                .map(ResolvedSource::Document)
                .ok_or(ValidationError::MissingDocument),
            BankSource::Topic(topic) => {
                let topic = topic.trim();
                if topic.is_empty() {
                    Err(ValidationError::BlankTopic)
                } else {
                    Ok(ResolvedSource::Topic(topic.to_owned()))
                }
            }
        }
    }
}

impl ResolvedSource {
    #[must_use]
    pub fn document_id(&self) -> Option<&DocumentId> {
        match self {
            ResolvedSource::Document(id) => Some(id),
            ResolvedSource::Topic(_) => None,
        }
    }

    #[must_use]
    pub fn topic(&self) -> Option<&str> {
        match self {
            ResolvedSource::Topic(topic) => Some(topic),
            ResolvedSource::Document(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_topic_is_rejected_even_with_a_document() {
        let doc = DocumentId::new("doc-1");
        let err = BankSource::Topic("  \t".into()).resolve(Some(&doc)).unwrap_err();
        assert_eq!(err, ValidationError::BlankTopic);
    }

    #[test]
    fn document_source_needs_a_binding() {
        assert_eq!(
            BankSource::Document.resolve(None).unwrap_err(),
            ValidationError::MissingDocument
        );
        let doc = DocumentId::new("doc-1");
        let resolved = BankSource::Document.resolve(Some(&doc)).unwrap();
        assert_eq!(resolved.document_id(), Some(&doc));
        assert_eq!(resolved.topic(), None);
    }

    #[test]
    fn topic_is_trimmed() {
        let resolved = BankSource::Topic("  borrow checker ".into()).resolve(None).unwrap();
        assert_eq!(resolved.topic(), Some("borrow checker"));
    }
}
