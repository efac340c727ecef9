//! Turn orchestration.
//!
//! For each inbound message the orchestrator resolves the customer's journey,
//! extracts data for the current stage, asks the stage graph where to go,
//! runs the target stage's side effect when its marker is missing, builds the
//! reply and commits the turn. Claim submission is handed to the
//! [`ClaimPipeline`] after the commit and runs detached from the reply.
//!
//! Callers serialize turns of the same conversation. The commit is applied
//! through [`ConversationStore::update`] as a delta, so writes made by a
//! pipeline running in the background are never overwritten by a turn.

use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::application::claim_pipeline::ClaimPipeline;
use crate::application::response_builder::ResponseBuilder;
use crate::application::scheduler::SchedulingAgent;
use crate::application::side_effects::SideEffectExecutor;
use crate::domain::claims::PipelineRun;
use crate::domain::foundation::{ConversationId, CustomerId, DomainError, ErrorCode, Timestamp, ValidationError};
use crate::domain::journey::{
    extract, ClaimProgress, CollectedData, ConversationState, ExtractionContext, Field, FieldValue, Intent, Journey,
    Outcome, SideEffect, StageGraph, StageId,
};
use crate::domain::scheduling::ScheduledMessageJob;
use crate::ports::{ConversationStore, JourneyRepository};

#[derive(Debug, Error)]
pub enum TurnError {
    #[error("message text cannot be empty")]
    EmptyMessage,

    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl TurnError {
    pub fn code(&self) -> ErrorCode {
        match self {
            TurnError::EmptyMessage => ErrorCode::EmptyMessage,
            TurnError::Validation(_) => ErrorCode::ValidationFailed,
            TurnError::Domain(e) => e.code,
        }
    }
}

/// What a turn did.
#[derive(Debug)]
pub struct TurnOutcome {
    pub conversation_id: ConversationId,
    /// Stage before the turn; `None` for a conversation's first message.
    pub previous_stage: Option<StageId>,
    pub stage: StageId,
    pub outcome: Outcome,
    pub reply: String,
    /// Present when this turn started a claim submission.
    pub claim: Option<JoinHandle<PipelineRun>>,
}

/// Changes a turn makes, applied to the stored state at commit time.
struct TurnDraft {
    state: ConversationState,
    delta: CollectedData,
    entered: Vec<StageId>,
}

impl TurnDraft {
    fn new(state: ConversationState) -> Self {
        Self {
            state,
            delta: CollectedData::new(),
            entered: Vec::new(),
        }
    }

    fn merge(&mut self, patch: CollectedData) {
        for (field, value) in patch.iter() {
            self.delta.insert(field, value.clone());
        }
        self.state.merge(patch);
    }

    fn enter(&mut self, stage: StageId) {
        if self.state.current_stage != Some(stage) {
            self.entered.push(stage);
            self.state.enter_stage(stage);
        }
    }

    fn current(&self) -> Option<StageId> {
        self.state.current_stage
    }
}

pub struct Orchestrator {
    graphs: HashMap<Intent, StageGraph>,
    conversations: Arc<dyn ConversationStore>,
    journeys: Arc<dyn JourneyRepository>,
    executor: Arc<SideEffectExecutor>,
    responses: ResponseBuilder,
    scheduler: Arc<SchedulingAgent>,
    pipeline: Arc<ClaimPipeline>,
}

impl Orchestrator {
    pub fn new(
        conversations: Arc<dyn ConversationStore>,
        journeys: Arc<dyn JourneyRepository>,
        executor: Arc<SideEffectExecutor>,
        responses: ResponseBuilder,
        scheduler: Arc<SchedulingAgent>,
        pipeline: Arc<ClaimPipeline>,
    ) -> Self {
        let graphs = Intent::ALL
            .iter()
            .map(|intent| (*intent, StageGraph::for_intent(*intent)))
            .collect();
        Self {
            graphs,
            conversations,
            journeys,
            executor,
            responses,
            scheduler,
            pipeline,
        }
    }

    fn graph(&self, intent: Intent) -> Result<&StageGraph, DomainError> {
        self.graphs.get(&intent).ok_or_else(|| {
            DomainError::new(ErrorCode::InternalError, "no stage graph for intent")
                .with_detail("intent", intent.as_str())
        })
    }

    /// Handles one inbound message from a customer.
    pub async fn handle_message(&self, customer_id: &CustomerId, text: &str) -> Result<TurnOutcome, TurnError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TurnError::EmptyMessage);
        }

        let state = match self.active_journey(customer_id).await? {
            Some(journey) => self.load_or_create(&journey).await?,
            None => self.open_journey(customer_id, Intent::default()).await?.1,
        };
        let conversation_id = state.conversation_id;
        let previous_stage = state.current_stage;
        let graph = self.graph(state.intent)?;

        let mut draft = TurnDraft::new(state);
        if draft.current().is_none() {
            draft.enter(graph.start());
        }

        let ctx = ExtractionContext::new(Timestamp::now().date());
        let patch = extract(graph.current(draft.current()), text, &draft.state.collected, &ctx);
        if !patch.is_empty() {
            debug!(
                conversation_id = %conversation_id,
                fields = ?patch.keys().collect::<Vec<_>>(),
                "Extracted fields"
            );
        }
        draft.merge(patch);

        let transition = graph.next_stage(draft.current(), &draft.state.collected, text);
        info!(
            conversation_id = %conversation_id,
            from = %transition.from,
            to = %transition.to,
            outcome = transition.outcome.as_str(),
            "Stage transition"
        );

        if transition.outcome == Outcome::Restart {
            return self.restart(customer_id, draft, text, previous_stage).await;
        }

        draft.enter(transition.to);
        let claim_requested = self.run_side_effects(graph, &mut draft, text).await;

        let stage = graph.current(draft.current());
        let stage_id = stage.id;
        let mut reply_state = draft.state.clone();
        reply_state.record_customer(text);
        let reply = self.responses.reply(stage, &reply_state).await;

        let committed = self.commit(conversation_id, draft, text, Some(&reply)).await?;

        if stage_id == StageId::End {
            self.close_active(customer_id, conversation_id).await?;
        }

        let claim = if claim_requested {
            info!(conversation_id = %conversation_id, "Starting claim submission in background");
            Some(self.pipeline.spawn(committed))
        } else {
            None
        };

        Ok(TurnOutcome {
            conversation_id,
            previous_stage,
            stage: stage_id,
            outcome: transition.outcome,
            reply,
            claim,
        })
    }

    /// Runs side effects of the stage the draft sits on, following
    /// auto-advancing stages. Returns true when a claim submission is due.
    async fn run_side_effects(&self, graph: &StageGraph, draft: &mut TurnDraft, text: &str) -> bool {
        let mut claim_requested = false;
        for _ in 0..graph.len() {
            let stage = graph.current(draft.current());
            if let Some(effect) = stage.side_effect {
                if !draft.state.collected.contains(effect.resolution_marker()) {
                    match effect {
                        SideEffect::CandidateSearch => {
                            let patch = self.executor.search_candidates(&draft.state.collected).await;
                            draft.merge(patch);
                        }
                        SideEffect::ClaimSubmission => {
                            draft.merge(CollectedData::new().with(
                                Field::ClaimStatus,
                                FieldValue::text(ClaimProgress::Pending.as_str()),
                            ));
                            claim_requested = true;
                        }
                    }
                }
            }

            if !stage.auto_advance {
                break;
            }
            let next = graph.next_stage(Some(stage.id), &draft.state.collected, text);
            if next.is_self_loop() {
                break;
            }
            debug!(from = %next.from, to = %next.to, "Auto-advancing");
            draft.enter(next.to);
        }
        claim_requested
    }

    async fn commit(
        &self,
        conversation_id: ConversationId,
        draft: TurnDraft,
        text: &str,
        reply: Option<&str>,
    ) -> Result<ConversationState, DomainError> {
        let TurnDraft { delta, entered, .. } = draft;
        let inbound = text.to_string();
        let outbound = reply.map(str::to_string);
        self.conversations
            .update(
                &conversation_id,
                Box::new(move |state: &mut ConversationState| {
                    state.merge(delta);
                    for stage in entered {
                        state.enter_stage(stage);
                    }
                    state.record_customer(inbound);
                    if let Some(outbound) = outbound {
                        state.record_assistant(outbound);
                    }
                }),
            )
            .await
    }

    /// Closes the finished conversation and greets the customer in a fresh one.
    async fn restart(
        &self,
        customer_id: &CustomerId,
        draft: TurnDraft,
        text: &str,
        previous_stage: Option<StageId>,
    ) -> Result<TurnOutcome, TurnError> {
        let old_id = draft.state.conversation_id;
        let intent = draft.state.intent;
        self.commit(old_id, draft, text, None).await?;
        self.close_active(customer_id, old_id).await?;

        let (journey, mut state) = self.open_journey(customer_id, intent).await?;
        let start = self.graph(intent)?.current(None);
        state.enter_stage(start.id);
        state.record_customer(text);
        let reply = self.responses.reply(start, &state).await;
        state.record_assistant(reply.clone());
        self.conversations.save(&state).await?;

        info!(
            customer_id = %customer_id,
            old_conversation_id = %old_id,
            conversation_id = %journey.conversation_id,
            "Restarted journey"
        );
        Ok(TurnOutcome {
            conversation_id: journey.conversation_id,
            previous_stage,
            stage: start.id,
            outcome: Outcome::Restart,
            reply,
            claim: None,
        })
    }

    async fn load_or_create(&self, journey: &Journey) -> Result<ConversationState, DomainError> {
        if let Some(state) = self.conversations.find(&journey.conversation_id).await? {
            return Ok(state);
        }
        warn!(conversation_id = %journey.conversation_id, "Journey without conversation state, recreating");
        let state = ConversationState::new(journey.conversation_id, journey.customer_id.clone(), journey.intent);
        self.conversations.save(&state).await?;
        Ok(state)
    }

    async fn open_journey(
        &self,
        customer_id: &CustomerId,
        intent: Intent,
    ) -> Result<(Journey, ConversationState), DomainError> {
        let journey = Journey::start(customer_id.clone(), intent);
        let state = ConversationState::new(journey.conversation_id, customer_id.clone(), intent);
        self.conversations.save(&state).await?;
        self.journeys.save(&journey).await?;
        info!(
            customer_id = %customer_id,
            conversation_id = %journey.conversation_id,
            intent = %intent,
            "Journey started"
        );
        Ok((journey, state))
    }

    async fn close_active(&self, customer_id: &CustomerId, conversation_id: ConversationId) -> Result<(), TurnError> {
        if let Some(mut journey) = self.journeys.find_by_customer(customer_id).await? {
            if journey.conversation_id == conversation_id && journey.is_active() {
                journey.close()?;
                self.journeys.save(&journey).await?;
                info!(customer_id = %customer_id, conversation_id = %conversation_id, "Journey closed");
            }
        }
        Ok(())
    }

    /// Starts a new journey, replacing any active one. Pending follow-ups of
    /// the replaced conversation are cancelled.
    pub async fn start_journey(
        &self,
        customer_id: &CustomerId,
        intent: Intent,
    ) -> Result<(Journey, ConversationState), TurnError> {
        if let Some(previous) = self.active_journey(customer_id).await? {
            match self.scheduler.cancel_scheduled_messages(&previous.conversation_id).await {
                Ok(cancelled) => debug!(cancelled, "Cancelled follow-ups of replaced journey"),
                Err(e) => warn!(error = %e, "Could not cancel follow-ups of replaced journey"),
            }
        }
        Ok(self.open_journey(customer_id, intent).await?)
    }

    /// Closes the customer's active journey.
    pub async fn close_journey(&self, customer_id: &CustomerId) -> Result<Journey, TurnError> {
        let mut journey = self
            .active_journey(customer_id)
            .await?
            .ok_or_else(|| {
                DomainError::new(ErrorCode::JourneyNotFound, "no active journey")
                    .with_detail("customer_id", customer_id.as_str())
            })?;
        journey.close()?;
        self.journeys.save(&journey).await?;
        info!(customer_id = %customer_id, conversation_id = %journey.conversation_id, "Journey closed");
        Ok(journey)
    }

    pub async fn active_journey(&self, customer_id: &CustomerId) -> Result<Option<Journey>, DomainError> {
        Ok(self
            .journeys
            .find_by_customer(customer_id)
            .await?
            .filter(Journey::is_active))
    }

    pub async fn conversation(&self, conversation_id: &ConversationId) -> Result<ConversationState, DomainError> {
        self.conversations.find(conversation_id).await?.ok_or_else(|| {
            DomainError::new(ErrorCode::ConversationNotFound, "conversation not found")
                .with_detail("conversation_id", conversation_id.to_string())
        })
    }

    /// Latest claim pipeline run of the conversation, if one was started.
    pub async fn claim_pipeline(&self, conversation_id: &ConversationId) -> Result<Option<PipelineRun>, DomainError> {
        self.conversation(conversation_id).await?;
        Ok(self.pipeline.latest_run(conversation_id).await)
    }

    pub async fn jobs(&self, conversation_id: &ConversationId) -> Result<Vec<ScheduledMessageJob>, DomainError> {
        self.conversation(conversation_id).await?;
        self.scheduler.jobs_for(conversation_id).await.map_err(|e| {
            DomainError::new(ErrorCode::StorageError, e.to_string())
                .with_detail("conversation_id", conversation_id.to_string())
        })
    }

    /// Stops every armed follow-up timer.
    pub async fn shutdown(&self) {
        self.scheduler.shutdown().await;
    }
}
