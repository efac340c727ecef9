//! Composition root: wires collaborators and in-memory stores into an
//! [`Orchestrator`].

use secrecy::ExposeSecret;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::adapters::ai::{MockTextGenerator, OpenAIConfig, OpenAITextGenerator};
use crate::adapters::claims::{HttpClaimConfig, HttpClaimSubmitter, MockClaimSubmitter};
use crate::adapters::messaging::{ConsoleDispatcher, HttpDispatcher};
use crate::adapters::search::{GeneratedDepartmentClassifier, KeywordDepartmentClassifier, StaticHospitalCatalog};
use crate::adapters::storage::{
    InMemoryConversationStore, InMemoryJobStore, InMemoryJourneyRepository, InMemoryPipelineRunStore,
};
use crate::application::{ClaimPipeline, Orchestrator, ResponseBuilder, SchedulingAgent, SideEffectExecutor};
use crate::config::AppConfig;
use crate::domain::claims::{PolicyholderProfile, RetryPolicy};
use crate::ports::{
    CandidateSearch, ClaimError, ClaimSubmitter, DepartmentClassifier, DispatchError, MessageDispatcher, SearchError,
    TextGenerationError, TextGenerator,
};

/// Failures while constructing collaborators.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("hospital catalog: {0}")]
    Catalog(#[from] SearchError),

    #[error("text generator: {0}")]
    TextGenerator(#[from] TextGenerationError),

    #[error("claims client: {0}")]
    Claims(#[from] ClaimError),

    #[error("messaging gateway: {0}")]
    Messaging(#[from] DispatchError),
}

/// External collaborators of the engine.
#[derive(Clone)]
pub struct Collaborators {
    pub text_generator: Arc<dyn TextGenerator>,
    pub classifier: Arc<dyn DepartmentClassifier>,
    pub search: Arc<dyn CandidateSearch>,
    pub submitter: Arc<dyn ClaimSubmitter>,
    pub dispatcher: Arc<dyn MessageDispatcher>,
}

impl Collaborators {
    /// Template replies, keyword classification, the embedded catalog, a mock
    /// claims API and log-only messaging.
    pub fn offline() -> Result<Self, SearchError> {
        Ok(Self {
            text_generator: Arc::new(MockTextGenerator::unavailable()),
            classifier: Arc::new(KeywordDepartmentClassifier::new()),
            search: Arc::new(StaticHospitalCatalog::embedded()?),
            submitter: Arc::new(MockClaimSubmitter::new()),
            dispatcher: Arc::new(ConsoleDispatcher::new()),
        })
    }

    /// Swaps in the real clients for every collaborator the configuration
    /// enables. Anything left unconfigured stays offline.
    pub fn from_config(config: &AppConfig) -> Result<Self, EngineError> {
        let mut collaborators = Self::offline()?;

        if let Some(key) = config.ai.openai_api_key.as_ref().filter(|_| config.ai.has_openai()) {
            let generator: Arc<dyn TextGenerator> = Arc::new(OpenAITextGenerator::new(
                OpenAIConfig::new(key.expose_secret().as_str())
                    .with_model(config.ai.model.as_str())
                    .with_base_url(config.ai.base_url.as_str())
                    .with_timeout(config.ai.timeout()),
            )?);
            info!(model = %config.ai.model, "Text generation enabled");
            collaborators = collaborators
                .with_classifier(Arc::new(GeneratedDepartmentClassifier::new(generator.clone())))
                .with_text_generator(generator);
        }

        if let Some(base_url) = &config.claims.base_url {
            let mut claims = HttpClaimConfig::new(base_url.as_str()).with_timeout(config.claims.timeout());
            if let Some(key) = &config.claims.api_key {
                claims = claims.with_api_key(key.expose_secret().as_str());
            }
            info!(base_url = %base_url, "Claims API enabled");
            collaborators = collaborators.with_submitter(Arc::new(HttpClaimSubmitter::new(claims)?));
        }

        if let Some(gateway_url) = &config.messaging.gateway_url {
            info!(gateway_url = %gateway_url, "Messaging gateway enabled");
            collaborators = collaborators.with_dispatcher(Arc::new(HttpDispatcher::new(
                gateway_url.as_str(),
                config.messaging.timeout(),
            )?));
        }

        Ok(collaborators)
    }

    pub fn with_text_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.text_generator = generator;
        self
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn DepartmentClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_submitter(mut self, submitter: Arc<dyn ClaimSubmitter>) -> Self {
        self.submitter = submitter;
        self
    }

    pub fn with_dispatcher(mut self, dispatcher: Arc<dyn MessageDispatcher>) -> Self {
        self.dispatcher = dispatcher;
        self
    }
}

/// Tunables of the engine.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub retry: RetryPolicy,
    pub max_results: usize,
    pub followup_delay: Duration,
    pub humanize: bool,
    pub history_window: usize,
    pub profile: PolicyholderProfile,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            max_results: 5,
            followup_delay: Duration::from_secs(10),
            humanize: true,
            history_window: 6,
            profile: PolicyholderProfile::default(),
        }
    }
}

impl EngineSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            retry: config.claims.retry_policy(),
            max_results: config.search.max_results,
            followup_delay: config.scheduling.followup_delay(),
            humanize: config.scheduling.humanize,
            history_window: config.scheduling.history_window,
            profile: config.profile.to_profile(),
        }
    }
}

/// Builds an orchestrator over fresh in-memory stores.
pub fn build_orchestrator(collaborators: Collaborators, settings: EngineSettings) -> Orchestrator {
    let conversations = Arc::new(InMemoryConversationStore::new());
    let journeys = Arc::new(InMemoryJourneyRepository::new());
    let jobs = Arc::new(InMemoryJobStore::new());
    let runs = Arc::new(InMemoryPipelineRunStore::new());

    let executor = Arc::new(
        SideEffectExecutor::new(collaborators.classifier, collaborators.search, collaborators.submitter)
            .with_retry_policy(settings.retry)
            .with_max_results(settings.max_results),
    );

    let mut scheduler = SchedulingAgent::new(jobs, collaborators.dispatcher.clone());
    if settings.humanize {
        scheduler = scheduler
            .with_humanizer(collaborators.text_generator.clone())
            .with_history(conversations.clone(), settings.history_window);
    }
    let scheduler = Arc::new(scheduler);

    let pipeline = Arc::new(
        ClaimPipeline::new(
            conversations.clone(),
            runs,
            executor.clone(),
            scheduler.clone(),
            collaborators.dispatcher,
            settings.profile,
        )
        .with_followup_delay(settings.followup_delay),
    );

    Orchestrator::new(
        conversations,
        journeys,
        executor,
        ResponseBuilder::new(collaborators.text_generator, settings.history_window),
        scheduler,
        pipeline,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::CustomerId;
    use crate::domain::journey::StageId;

    #[test]
    fn settings_follow_config() {
        let mut config = AppConfig::default();
        config.scheduling.followup_delay_secs = 3;
        config.search.max_results = 2;

        let settings = EngineSettings::from_config(&config);

        assert_eq!(settings.followup_delay, Duration::from_secs(3));
        assert_eq!(settings.max_results, 2);
        assert_eq!(settings.retry.max_attempts, 3);
    }

    #[test]
    fn default_config_stays_offline() {
        assert!(Collaborators::from_config(&AppConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn built_orchestrator_handles_a_turn() {
        let orchestrator = build_orchestrator(Collaborators::offline().unwrap(), EngineSettings::default());

        let turn = orchestrator
            .handle_message(&CustomerId::new("cust-1").unwrap(), "yes")
            .await
            .unwrap();

        assert_eq!(turn.stage, StageId::IdentifyPatient);
    }
}
