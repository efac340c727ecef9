//! End-to-end dialogue tests: stage walk, background claim and follow-ups.

mod common;

use std::time::Duration;

use care_journey::adapters::claims::MockClaimSubmitter;
use care_journey::domain::claims::{ClaimOutcome, PipelineStep};
use care_journey::domain::journey::{Field, StageId};
use care_journey::domain::scheduling::JobStatus;
use care_journey::ports::ClaimError;

use common::TestApp;

// =============================================================================
// Happy path
// =============================================================================

#[tokio::test(start_paused = true)]
async fn happy_path_reaches_scheduled_followups() {
    let app = TestApp::new(MockClaimSubmitter::new().with_receipt("INT-77", "REQ-77"));

    let mut turns = app.play_happy_path().await;
    let stages: Vec<StageId> = turns.iter().map(|t| t.stage).collect();
    assert_eq!(
        stages,
        vec![
            StageId::IdentifyPatient,
            StageId::MedicalReason,
            StageId::AwaitHospitalSelection,
            StageId::ConfirmAdmission,
            StageId::CollectAdmissionDetails,
            StageId::InitiateClaim,
        ]
    );

    let last = turns.pop().expect("six turns");
    let conversation_id = last.conversation_id;
    let run = last.claim.expect("claim started").await.expect("pipeline task");
    assert_eq!(run.step, PipelineStep::Scheduled);
    assert!(matches!(run.outcome, Some(ClaimOutcome::Confirmed { attempts: 1, .. })));

    let state = app.orchestrator.conversation(&conversation_id).await.unwrap();
    let visited: Vec<StageId> = state.stage_history.iter().map(|v| v.stage).collect();
    assert_eq!(
        visited,
        vec![
            StageId::Greeting,
            StageId::IdentifyPatient,
            StageId::MedicalReason,
            StageId::ShowHospitals,
            StageId::AwaitHospitalSelection,
            StageId::ConfirmAdmission,
            StageId::CollectAdmissionDetails,
            StageId::InitiateClaim,
            StageId::ScheduleFollowups,
        ]
    );
    assert_eq!(state.collected.text(Field::IntimationId), Some("INT-77"));
    assert_eq!(
        state.collected.selected_hospital().map(|h| h.name.as_str()),
        Some("Seven Star Multispeciality Hospital")
    );

    let jobs = app.orchestrator.jobs(&conversation_id).await.unwrap();
    assert_eq!(jobs.len(), 3);
    assert!(jobs.iter().all(|j| j.text.contains("INT-77")));
}

#[tokio::test(start_paused = true)]
async fn followups_arrive_in_order_after_confirmation() {
    let app = TestApp::new(MockClaimSubmitter::new().with_receipt("INT-88", "REQ-88"));
    let last = app.play_happy_path().await.pop().expect("six turns");
    let conversation_id = last.conversation_id;
    last.claim.expect("claim started").await.expect("pipeline task");

    assert_eq!(app.dispatcher.sent_count(), 1);

    tokio::time::sleep(Duration::from_secs(11)).await;
    assert_eq!(app.dispatcher.sent_count(), 2);

    tokio::time::sleep(Duration::from_secs(20)).await;
    let sent = app.dispatcher.sent_texts();
    assert_eq!(sent.len(), 4);
    assert!(sent[0].contains("Intimation id: INT-88"));
    assert!(sent[1].starts_with("Reminder"));
    assert!(sent[2].starts_with("Please carry"));
    assert!(sent[3].starts_with("Wishing"));

    let jobs = app.orchestrator.jobs(&conversation_id).await.unwrap();
    assert!(jobs.iter().all(|j| j.status == JobStatus::Sent));
}

// =============================================================================
// Failure path
// =============================================================================

#[tokio::test(start_paused = true)]
async fn exhausted_retries_send_only_the_failure_notice() {
    let app = TestApp::new(
        MockClaimSubmitter::new()
            .with_error(ClaimError::Timeout)
            .with_error(ClaimError::Timeout)
            .with_error(ClaimError::Timeout),
    );

    let last = app.play_happy_path().await.pop().expect("six turns");
    let run = last.claim.expect("claim started").await.expect("pipeline task");

    assert_eq!(run.step, PipelineStep::Failed);
    assert_eq!(app.submitter.attempts(), 3);

    tokio::time::sleep(Duration::from_secs(60)).await;
    let sent = app.dispatcher.sent_texts();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("could not register"));
    assert!(app.orchestrator.jobs(&last.conversation_id).await.unwrap().is_empty());

    let state = app.orchestrator.conversation(&last.conversation_id).await.unwrap();
    assert_eq!(state.current_stage, Some(StageId::ClaimFailed));
    assert!(!state.collected.contains(Field::IntimationId));
}

#[tokio::test(start_paused = true)]
async fn customer_can_restart_after_failure() {
    let app = TestApp::new(
        MockClaimSubmitter::new().with_error(ClaimError::Http { status: 400, body: "policy lapsed".into() }),
    );
    let last = app.play_happy_path().await.pop().expect("six turns");
    last.claim.expect("claim started").await.expect("pipeline task");
    assert_eq!(app.submitter.attempts(), 1);

    let restart = app.say("please try the claim again").await;

    assert_eq!(restart.stage, StageId::Greeting);
    assert_ne!(restart.conversation_id, last.conversation_id);
}
