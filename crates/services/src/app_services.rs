use std::sync::Arc;

use quiz_api::{HttpQuizApi, HttpQuizApiConfig, InMemoryQuizApi, QuizApi};

use crate::config::QuizConfig;
use crate::error::AppServicesError;
use crate::quiz::QuizSessionController;
use crate::Clock;

/// Assembles the quiz service client and hands out configured controllers.
#[derive(Clone)]
pub struct AppServices {
    config: QuizConfig,
    clock: Clock,
    api: Arc<dyn QuizApi>,
}

impl AppServices {
    /// Build services talking to the remote quiz service over HTTP.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the HTTP client cannot be built.
    pub fn new_http(config: QuizConfig, clock: Clock) -> Result<Self, AppServicesError> {
        let api = HttpQuizApi::new(HttpQuizApiConfig::new(
            config.api_base_url.clone(),
            config.request_timeout,
        ))?;
        tracing::info!(base_url = %api.base_url(), "using remote quiz service");
        Ok(Self {
            config,
            clock,
            api: Arc::new(api),
        })
    }

    /// Build services backed by the local stand-in service.
    #[must_use]
    pub fn new_in_memory(config: QuizConfig, clock: Clock) -> Self {
        tracing::info!("using in-memory quiz service");
        Self::with_api(config, clock, Arc::new(InMemoryQuizApi::new()))
    }

    #[must_use]
    pub fn with_api(config: QuizConfig, clock: Clock, api: Arc<dyn QuizApi>) -> Self {
        Self { config, clock, api }
    }

    #[must_use]
    pub fn config(&self) -> &QuizConfig {
        &self.config
    }

    /// A fresh controller, in `NoBank` when a document id is configured.
    #[must_use]
    pub fn quiz_controller(&self) -> QuizSessionController {
        let controller = QuizSessionController::new(Arc::clone(&self.api), self.clock)
            .with_bank_size(self.config.bank_size)
            .with_request_timeout(self.config.request_timeout);
        match &self.config.document_id {
            Some(id) => controller.with_document(id.clone()),
            None => controller,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::QuizPhase;
    use quiz_core::model::DocumentId;

    #[test]
    fn controller_starts_bound_when_document_is_configured() {
        let config = QuizConfig {
            document_id: Some(DocumentId::new("doc-1")),
            ..QuizConfig::default()
        };
        let services = AppServices::new_in_memory(config, Clock::default());

        let controller = services.quiz_controller();
        assert_eq!(controller.phase(), QuizPhase::NoBank);
        assert_eq!(controller.document_id(), Some(&DocumentId::new("doc-1")));
    }

    #[test]
    fn http_services_accept_the_default_config() {
        let services = AppServices::new_http(QuizConfig::default(), Clock::default()).unwrap();
        assert_eq!(services.quiz_controller().phase(), QuizPhase::NoDocument);
    }
}
