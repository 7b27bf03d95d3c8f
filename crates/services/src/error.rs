//! Shared error types for the services crate.

use thiserror::Error;

use quiz_api::ApiError;
use quiz_core::ValidationError;

use crate::quiz::{QuizAction, QuizPhase};

/// Errors emitted by `QuizSessionController`.
///
/// The `Display` text is what the front-end shows to the user.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum QuizError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("cannot {action} while {phase}")]
    InvalidTransition { action: QuizAction, phase: QuizPhase },
    #[error("another request is still in progress")]
    Busy,
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl QuizError {
    /// Transient failures worth offering a retry for.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            QuizError::Api(err) => err.is_retryable(),
            QuizError::Busy => true,
            QuizError::Validation(_) | QuizError::InvalidTransition { .. } => false,
        }
    }
}

/// Errors emitted while reading `QuizConfig`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("{var} is not a valid http(s) url: {value}")]
    InvalidUrl { var: &'static str, value: String },
    #[error("{var} must be a positive integer, got {value}")]
    InvalidNumber { var: &'static str, value: String },
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
}
