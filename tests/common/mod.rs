//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use care_journey::adapters::claims::MockClaimSubmitter;
use care_journey::adapters::messaging::InMemoryDispatcher;
use care_journey::application::{Orchestrator, TurnOutcome};
use care_journey::domain::claims::{Backoff, RetryPolicy};
use care_journey::domain::foundation::CustomerId;
use care_journey::engine::{build_orchestrator, Collaborators, EngineSettings};

/// Customer messages that walk the happy path up to the claim hand-off.
pub const HAPPY_PATH: [&str; 6] = [
    "yes",
    "my wife",
    "hand fracture",
    "Seven Star Hospital",
    "yes",
    "20000 tomorrow 10am",
];

pub struct TestApp {
    pub orchestrator: Orchestrator,
    pub dispatcher: InMemoryDispatcher,
    pub submitter: MockClaimSubmitter,
    pub customer: CustomerId,
}

impl TestApp {
    pub fn new(submitter: MockClaimSubmitter) -> Self {
        let dispatcher = InMemoryDispatcher::new();
        let collaborators = Collaborators::offline()
            .expect("embedded catalog loads")
            .with_submitter(Arc::new(submitter.clone()))
            .with_dispatcher(Arc::new(dispatcher.clone()));
        let settings = EngineSettings {
            retry: RetryPolicy::new(3, Duration::from_millis(2000), Backoff::Fixed),
            ..EngineSettings::default()
        };
        Self {
            orchestrator: build_orchestrator(collaborators, settings),
            dispatcher,
            submitter,
            customer: CustomerId::new("cust-e2e").expect("valid customer id"),
        }
    }

    pub async fn say(&self, text: &str) -> TurnOutcome {
        self.orchestrator
            .handle_message(&self.customer, text)
            .await
            .expect("turn succeeds")
    }

    /// Plays the happy path and returns every turn.
    pub async fn play_happy_path(&self) -> Vec<TurnOutcome> {
        let mut turns = Vec::with_capacity(HAPPY_PATH.len());
        for text in HAPPY_PATH {
            turns.push(self.say(text).await);
        }
        turns
    }
}
