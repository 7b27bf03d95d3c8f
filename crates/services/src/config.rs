use std::env;
use std::time::Duration;

use quiz_core::model::{DocumentId, QuestionCount};
use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_BANK_SIZE: u32 = 30;

const VAR_BASE_URL: &str = "QUIZ_API_BASE_URL";
const VAR_TIMEOUT: &str = "QUIZ_API_TIMEOUT_SECS";
const VAR_BANK_SIZE: &str = "QUIZ_BANK_SIZE";
const VAR_QUESTION_COUNT: &str = "QUIZ_QUESTION_COUNT";
const VAR_DOCUMENT_ID: &str = "QUIZ_DOCUMENT_ID";

/// Runtime settings for the quiz client.
#[derive(Clone, Debug, PartialEq)]
pub struct QuizConfig {
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub bank_size: u32,
    pub question_count: QuestionCount,
    pub document_id: Option<DocumentId>,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            bank_size: DEFAULT_BANK_SIZE,
            question_count: QuestionCount::default(),
            document_id: None,
        }
    }
}

impl QuizConfig {
    /// Read `QUIZ_*` variables from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(value) = read(VAR_BASE_URL) {
            config.api_base_url = parse_base_url(VAR_BASE_URL, &value)?;
        }
        if let Some(value) = read(VAR_TIMEOUT) {
            config.request_timeout = Duration::from_secs(parse_positive(VAR_TIMEOUT, &value)?);
        }
        if let Some(value) = read(VAR_BANK_SIZE) {
            let size = parse_positive(VAR_BANK_SIZE, &value)?;
            config.bank_size = u32::try_from(size).map_err(|_| ConfigError::InvalidNumber {
                var: VAR_BANK_SIZE,
                value,
            })?;
        }
        if let Some(value) = read(VAR_QUESTION_COUNT) {
            let count = parse_positive(VAR_QUESTION_COUNT, &value)?;
            let count = u32::try_from(count).unwrap_or(u32::MAX);
            config.question_count = QuestionCount::new(count)?;
        }
        if let Some(value) = read(VAR_DOCUMENT_ID) {
            config.document_id = Some(DocumentId::new(value.trim()));
        }

        Ok(config)
    }
}

/// Validates an http(s) base url, returning it without a trailing slash.
///
/// # Errors
///
/// Returns `ConfigError::InvalidUrl` for unparsable or non-http(s) urls.
pub fn parse_base_url(var: &'static str, value: &str) -> Result<String, ConfigError> {
    let invalid = || ConfigError::InvalidUrl {
        var,
        value: value.to_owned(),
    };
    let url = Url::parse(value.trim()).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid());
    }
    Ok(url.as_str().trim_end_matches('/').to_owned())
}

fn parse_positive(var: &'static str, value: &str) -> Result<u64, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidNumber {
            var,
            value: value.to_owned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = QuizConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, QuizConfig::default());
        assert_eq!(config.bank_size, 30);
        assert_eq!(config.question_count.get(), 10);
    }

    #[test]
    fn reads_all_variables() {
        let config = QuizConfig::from_lookup(lookup(&[
            ("QUIZ_API_BASE_URL", "https://quiz.example.com/api/"),
            ("QUIZ_API_TIMEOUT_SECS", "15"),
            ("QUIZ_BANK_SIZE", "12"),
            ("QUIZ_QUESTION_COUNT", "6"),
            ("QUIZ_DOCUMENT_ID", " doc-3 "),
        ]))
        .unwrap();

        assert_eq!(config.api_base_url, "https://quiz.example.com/api");
        assert_eq!(config.request_timeout, Duration::from_secs(15));
        assert_eq!(config.bank_size, 12);
        assert_eq!(config.question_count.get(), 6);
        assert_eq!(config.document_id, Some(DocumentId::new("doc-3")));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            QuizConfig::from_lookup(lookup(&[("QUIZ_API_BASE_URL", "ftp://files")])),
            Err(ConfigError::InvalidUrl { .. })
        ));
        assert!(matches!(
            QuizConfig::from_lookup(lookup(&[("QUIZ_API_TIMEOUT_SECS", "0")])),
            Err(ConfigError::InvalidNumber { .. })
        ));
        assert!(matches!(
            QuizConfig::from_lookup(lookup(&[("QUIZ_QUESTION_COUNT", "20")])),
            Err(ConfigError::Validation(_))
        ));
    }
}
