#![forbid(unsafe_code)]

pub mod app_services;
pub mod busy;
pub mod config;
pub mod error;
pub mod quiz;

pub use quiz_core::Clock;

pub use app_services::AppServices;
pub use busy::{BusyFlag, BusyGuard};
pub use config::QuizConfig;
pub use error::{AppServicesError, ConfigError, QuizError};
pub use quiz::{
    ActiveQuiz, AnswerDraft, AnswerSummaryItem, CompletedQuiz, QuizAction, QuizPhase,
    QuizSessionController, QuizState, QuizStep, QuizSummary,
};
