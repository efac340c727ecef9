//! Claim submission against a stubbed claims API: retry classification end
//! to end through the HTTP client and the background pipeline.

mod common;

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use care_journey::adapters::claims::{HttpClaimConfig, HttpClaimSubmitter};
use care_journey::adapters::messaging::InMemoryDispatcher;
use care_journey::application::Orchestrator;
use care_journey::domain::claims::{Backoff, ClaimOutcome, PipelineRun, PipelineStep, RetryPolicy};
use care_journey::domain::foundation::CustomerId;
use care_journey::domain::journey::{Field, StageId};
use care_journey::engine::{build_orchestrator, Collaborators, EngineSettings};

use common::HAPPY_PATH;

fn orchestrator(server: &MockServer, dispatcher: &InMemoryDispatcher) -> Orchestrator {
    let submitter = HttpClaimSubmitter::new(
        HttpClaimConfig::new(server.uri()).with_timeout(Duration::from_secs(2)),
    )
    .expect("client builds");
    let collaborators = Collaborators::offline()
        .expect("embedded catalog loads")
        .with_submitter(Arc::new(submitter))
        .with_dispatcher(Arc::new(dispatcher.clone()));
    let settings = EngineSettings {
        retry: RetryPolicy::new(3, Duration::from_millis(20), Backoff::Fixed),
        ..EngineSettings::default()
    };
    build_orchestrator(collaborators, settings)
}

async fn run_claim(orchestrator: &Orchestrator) -> PipelineRun {
    let customer = CustomerId::new("cust-api").unwrap();
    let mut claim = None;
    for text in HAPPY_PATH {
        claim = orchestrator.handle_message(&customer, text).await.unwrap().claim;
    }
    claim.expect("claim started").await.expect("pipeline task")
}

fn unavailable() -> ResponseTemplate {
    ResponseTemplate::new(503).set_body_string("service unavailable")
}

fn accepted(intimation_id: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "success": true,
        "intimationId": intimation_id,
        "requestId": "REQ-API-1"
    }))
}

#[tokio::test]
async fn transient_errors_are_retried_until_accepted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/claims/intimations"))
        .respond_with(unavailable())
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/claims/intimations"))
        .respond_with(accepted("INT-API-1"))
        .expect(1)
        .mount(&server)
        .await;
    let dispatcher = InMemoryDispatcher::new();
    let orchestrator = orchestrator(&server, &dispatcher);

    let run = run_claim(&orchestrator).await;

    assert_eq!(run.step, PipelineStep::Scheduled);
    assert!(matches!(run.outcome, Some(ClaimOutcome::Confirmed { attempts: 3, .. })));
    let state = orchestrator.conversation(&run.conversation_id).await.unwrap();
    assert_eq!(state.collected.text(Field::IntimationId), Some("INT-API-1"));
    orchestrator.shutdown().await;
}

#[tokio::test]
async fn client_error_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/claims/intimations"))
        .respond_with(ResponseTemplate::new(400).set_body_string("invalid policy number"))
        .expect(1)
        .mount(&server)
        .await;
    let dispatcher = InMemoryDispatcher::new();
    let orchestrator = orchestrator(&server, &dispatcher);

    let run = run_claim(&orchestrator).await;

    assert_eq!(run.step, PipelineStep::Failed);
    assert!(matches!(run.outcome, Some(ClaimOutcome::Failed { attempts: 1, .. })));
    let state = orchestrator.conversation(&run.conversation_id).await.unwrap();
    assert_eq!(state.current_stage, Some(StageId::ClaimFailed));
    assert_eq!(dispatcher.sent_count(), 1);
}

#[tokio::test]
async fn rejection_in_body_is_terminal() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/claims/intimations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": "hospital not in network"
        })))
        .expect(1)
        .mount(&server)
        .await;
    let dispatcher = InMemoryDispatcher::new();
    let orchestrator = orchestrator(&server, &dispatcher);

    let run = run_claim(&orchestrator).await;

    match run.outcome {
        Some(ClaimOutcome::Failed { error, attempts }) => {
            assert_eq!(attempts, 1);
            assert!(error.contains("hospital not in network"));
        }
        other => panic!("expected failure, got {:?}", other),
    }
}
