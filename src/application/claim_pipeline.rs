//! Background claim pipeline.
//!
//! Runs after the conversation enters `initiate_claim`:
//!
//! 1. submit the claim (with retry)
//! 2. fold the receipt (or the error) into the conversation
//! 3. notify the customer out of band
//! 4. render and schedule the follow-ups
//!
//! Follow-ups are only rendered once a receipt exists, so their text never
//! carries a placeholder for the intimation id. On failure any pending
//! follow-ups of the conversation are cancelled. Once a receipt is recorded
//! the follow-up marker is always written, with a count of zero when nothing
//! could be scheduled, so the conversation can leave `schedule_followups`.
//! Every step is recorded on a [`PipelineRun`] that can be read back while
//! the run is in flight.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::application::scheduler::SchedulingAgent;
use crate::application::side_effects::SideEffectExecutor;
use crate::domain::claims::{ClaimOutcome, ClaimReceipt, ClaimRequest, PipelineRun, PipelineStep, PolicyholderProfile};
use crate::domain::foundation::{ConversationId, CustomerId};
use crate::domain::journey::{ClaimProgress, CollectedData, ConversationState, Field, FieldValue, StageId};
use crate::domain::scheduling::{render, unresolved_placeholders, MessageSpec};
use crate::ports::{ConversationStore, MessageDispatcher, PipelineRunStore};

/// Follow-up reminders sent after a confirmed claim.
pub const FOLLOWUP_TEMPLATES: [&str; 3] = [
    "Reminder: the cashless claim for {patient} at {hospital_name} is registered under intimation id {intimation_id} (request {request_id}).",
    "Please carry the patient's photo ID and policy card to {hospital_name} for the admission on {admission_date} at {admission_time}. Quote intimation id {intimation_id} at the insurance desk.",
    "Wishing {patient} a smooth admission on {admission_date}. Reply here if anything changes and I will update claim {intimation_id}.",
];

pub struct ClaimPipeline {
    conversations: Arc<dyn ConversationStore>,
    runs: Arc<dyn PipelineRunStore>,
    executor: Arc<SideEffectExecutor>,
    scheduler: Arc<SchedulingAgent>,
    dispatcher: Arc<dyn MessageDispatcher>,
    profile: PolicyholderProfile,
    followup_delay: Duration,
}

impl ClaimPipeline {
    pub fn new(
        conversations: Arc<dyn ConversationStore>,
        runs: Arc<dyn PipelineRunStore>,
        executor: Arc<SideEffectExecutor>,
        scheduler: Arc<SchedulingAgent>,
        dispatcher: Arc<dyn MessageDispatcher>,
        profile: PolicyholderProfile,
    ) -> Self {
        Self {
            conversations,
            runs,
            executor,
            scheduler,
            dispatcher,
            profile,
            followup_delay: Duration::from_secs(10),
        }
    }

    /// Gap before the first follow-up and between the following ones.
    pub fn with_followup_delay(mut self, delay: Duration) -> Self {
        self.followup_delay = delay;
        self
    }

    /// Detaches a run for the conversation snapshot.
    pub fn spawn(self: &Arc<Self>, state: ConversationState) -> JoinHandle<PipelineRun> {
        let pipeline = Arc::clone(self);
        tokio::spawn(async move { pipeline.run(state).await })
    }

    pub async fn latest_run(&self, conversation_id: &ConversationId) -> Option<PipelineRun> {
        match self.runs.latest_for(conversation_id).await {
            Ok(run) => run,
            Err(e) => {
                error!(conversation_id = %conversation_id, error = %e, "Failed to load pipeline run");
                None
            }
        }
    }

    /// Runs the whole saga and returns the final record.
    pub async fn run(&self, state: ConversationState) -> PipelineRun {
        let conversation_id = state.conversation_id;
        let mut run = PipelineRun::start(conversation_id);
        self.record(&run).await;
        info!(conversation_id = %conversation_id, run_id = %run.id, "Claim pipeline started");

        let request = match ClaimRequest::build(&self.profile, &state.collected) {
            Ok(request) => request,
            Err(e) => {
                let reason = format!("incomplete claim data: {}", e);
                run.outcome = Some(ClaimOutcome::Failed {
                    error: reason.clone(),
                    attempts: 0,
                });
                self.handle_failure(&mut run, &state.customer_id, reason).await;
                return run;
            }
        };

        let outcome = self.executor.submit_claim(&request).await;
        run.outcome = Some(outcome.clone());
        match outcome {
            ClaimOutcome::Confirmed { receipt, .. } => {
                self.handle_success(&mut run, &state.customer_id, receipt).await;
            }
            ClaimOutcome::Failed { error, .. } => {
                self.handle_failure(&mut run, &state.customer_id, error).await;
            }
        }
        run
    }

    async fn handle_success(&self, run: &mut PipelineRun, customer_id: &CustomerId, receipt: ClaimReceipt) {
        let conversation_id = run.conversation_id;
        self.advance(run, PipelineStep::Submitted).await;

        let confirmation = format!(
            "Your cashless claim is registered. Intimation id: {} (request id: {}).",
            receipt.intimation_id, receipt.request_id
        );
        let patch = CollectedData::new()
            .with(Field::IntimationId, FieldValue::text(receipt.intimation_id.clone()))
            .with(Field::RequestId, FieldValue::text(receipt.request_id.clone()))
            .with(Field::ClaimStatus, FieldValue::text(ClaimProgress::Submitted.as_str()));
        let note = confirmation.clone();
        let updated = self
            .conversations
            .update(
                &conversation_id,
                Box::new(move |state: &mut ConversationState| {
                    state.merge(patch);
                    if state.current_stage == Some(StageId::InitiateClaim) {
                        state.enter_stage(StageId::ScheduleFollowups);
                    }
                    state.record_assistant(note);
                }),
            )
            .await;
        let state = match updated {
            Ok(state) => state,
            Err(e) => {
                self.fail(run, format!("could not record receipt: {}", e)).await;
                return;
            }
        };
        self.advance(run, PipelineStep::StateUpdated).await;

        if let Err(e) = self.dispatcher.send(customer_id, &confirmation).await {
            warn!(conversation_id = %conversation_id, error = %e, "Claim confirmation not delivered");
        }
        self.advance(run, PipelineStep::Notified).await;

        let messages = match self.followups(&state.collected) {
            Ok(messages) => messages,
            Err(placeholders) => {
                self.mark_followups(conversation_id, 0).await;
                self.fail(run, format!("follow-up placeholders left unresolved: {}", placeholders.join(", ")))
                    .await;
                return;
            }
        };
        match self
            .scheduler
            .schedule_messages(conversation_id, customer_id, state.intent, messages)
            .await
        {
            Ok(jobs) => {
                let count = jobs.len() as u32;
                self.mark_followups(conversation_id, count).await;
                self.advance(run, PipelineStep::Scheduled).await;
                info!(conversation_id = %conversation_id, followups = count, "Claim pipeline completed");
            }
            Err(e) => {
                self.mark_followups(conversation_id, 0).await;
                self.fail(run, format!("could not schedule follow-ups: {}", e)).await;
            }
        }
    }

    /// Records how many follow-ups were armed.
    async fn mark_followups(&self, conversation_id: ConversationId, count: u32) {
        let marked = self
            .conversations
            .update(
                &conversation_id,
                Box::new(move |state: &mut ConversationState| {
                    state.merge(CollectedData::new().with(Field::FollowupsScheduled, FieldValue::Count(count)));
                }),
            )
            .await;
        if let Err(e) = marked {
            warn!(conversation_id = %conversation_id, error = %e, "Could not mark follow-ups as scheduled");
        }
    }

    async fn handle_failure(&self, run: &mut PipelineRun, customer_id: &CustomerId, reason: String) {
        let conversation_id = run.conversation_id;

        let patch = CollectedData::new()
            .with(Field::ClaimError, FieldValue::text(reason.clone()))
            .with(Field::ClaimStatus, FieldValue::text(ClaimProgress::Failed.as_str()));
        let recorded = self
            .conversations
            .update(
                &conversation_id,
                Box::new(move |state: &mut ConversationState| {
                    state.merge(patch);
                    if state.current_stage == Some(StageId::InitiateClaim) {
                        state.enter_stage(StageId::ClaimFailed);
                    }
                }),
            )
            .await;
        if let Err(e) = recorded {
            error!(conversation_id = %conversation_id, error = %e, "Could not record claim failure");
        }

        match self.scheduler.cancel_scheduled_messages(&conversation_id).await {
            Ok(0) => {}
            Ok(cancelled) => info!(conversation_id = %conversation_id, cancelled, "Discarded pending follow-ups"),
            Err(e) => error!(conversation_id = %conversation_id, error = %e, "Could not cancel follow-ups"),
        }

        let notice = "We could not register your cashless claim. Our team will contact you, \
                      or you can reply to this message to try again.";
        if let Err(e) = self.dispatcher.send(customer_id, notice).await {
            warn!(conversation_id = %conversation_id, error = %e, "Claim failure notice not delivered");
        }

        self.fail(run, reason).await;
    }

    /// Renders the follow-up plan. Returns the leftover placeholder names if
    /// any template could not be filled.
    fn followups(&self, data: &CollectedData) -> Result<Vec<MessageSpec>, Vec<String>> {
        let values = template_values(data);
        let delay_ms = self.followup_delay.as_millis() as u64;
        let mut messages = Vec::with_capacity(FOLLOWUP_TEMPLATES.len());
        for template in FOLLOWUP_TEMPLATES {
            let text = render(template, &values);
            let leftover = unresolved_placeholders(&text);
            if !leftover.is_empty() {
                return Err(leftover);
            }
            messages.push(MessageSpec::new(text, delay_ms));
        }
        Ok(messages)
    }

    async fn advance(&self, run: &mut PipelineRun, step: PipelineStep) {
        if let Err(e) = run.advance(step) {
            error!(run_id = %run.id, error = %e, "Invalid pipeline step");
        }
        self.record(run).await;
    }

    async fn fail(&self, run: &mut PipelineRun, reason: String) {
        error!(conversation_id = %run.conversation_id, run_id = %run.id, %reason, "Claim pipeline failed");
        if let Err(e) = run.fail(reason) {
            error!(run_id = %run.id, error = %e, "Invalid pipeline step");
        }
        self.record(run).await;
    }

    async fn record(&self, run: &PipelineRun) {
        if let Err(e) = self.runs.save(run).await {
            error!(run_id = %run.id, error = %e, "Failed to save pipeline run");
        }
    }
}

/// Placeholder values for the follow-up templates. Missing facts are left
/// out so rendering reports them instead of inventing text.
fn template_values(data: &CollectedData) -> HashMap<&'static str, String> {
    let mut values = HashMap::new();
    if let Some(id) = data.text(Field::IntimationId) {
        values.insert("intimation_id", id.to_string());
    }
    if let Some(id) = data.text(Field::RequestId) {
        values.insert("request_id", id.to_string());
    }
    if let Some(hospital) = data.selected_hospital() {
        values.insert("hospital_name", hospital.name.clone());
    }
    if let Some(date) = data.get(Field::AdmissionDate) {
        values.insert("admission_date", date.render());
    }
    values.insert(
        "admission_time",
        data.get(Field::AdmissionTime)
            .map(FieldValue::render)
            .unwrap_or_else(|| "your scheduled time".to_string()),
    );
    values.insert("patient", patient_label(data.text(Field::PatientRelation)).to_string());
    values
}

fn patient_label(relation: Option<&str>) -> &'static str {
    match relation {
        Some("self") | None => "you",
        Some("spouse") => "your spouse",
        Some("child") => "your child",
        Some("parent") => "your parent",
        Some("sibling") => "your sibling",
        Some(_) => "your family member",
    }
}
