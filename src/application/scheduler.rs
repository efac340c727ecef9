//! Scheduling agent for deferred follow-up messages.
//!
//! Each scheduling call arms one background task that walks its jobs in
//! order, sleeping until each job's absolute deadline. Every job owns a
//! cancellation ticket derived from the batch token, which in turn derives
//! from the agent's shutdown token, so cancelling at any level reaches the
//! timers below it.
//!
//! Job status lives in the [`ScheduledJobStore`]. Cancellation marks pending
//! jobs immediately; a timer that wakes up for a job that is no longer
//! pending does nothing.
//!
//! With a humanizer attached, each message is rewritten just before it is
//! sent, with the recent turns of its conversation as context.

use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::application::response_builder::history_messages;
use crate::domain::foundation::{ConversationId, CustomerId, DomainError, JobId, Timestamp, ValidationError};
use crate::domain::journey::Intent;
use crate::domain::scheduling::{plan_jobs, unresolved_placeholders, JobStatus, MessageSpec, ScheduledMessageJob};
use crate::ports::{
    ChatMessage, ConversationStore, GenerationRequest, MessageDispatcher, ScheduledJobStore, TextGenerator,
};

const HUMANIZE_PROMPT: &str = "Rewrite the message below so it reads warm and natural for a \
patient's family member. Keep every id, date, time, amount and hospital name exactly as written. \
Reply with the rewritten message only. The earlier messages are the recent conversation, for tone only.";

#[derive(Debug, Error)]
pub enum SchedulingError {
    #[error("nothing to schedule")]
    Empty,

    #[error("follow-ups are already scheduled for conversation {0}")]
    AlreadyScheduled(ConversationId),

    #[error("message {index} has unresolved placeholders: {placeholders:?}")]
    UnresolvedPlaceholder { index: usize, placeholders: Vec<String> },

    #[error("job not found: {0}")]
    JobNotFound(JobId),

    #[error("scheduling agent is shutting down")]
    ShuttingDown,

    #[error("invalid job transition: {0}")]
    Transition(#[from] ValidationError),

    #[error("job store error: {0}")]
    Store(#[from] DomainError),
}

/// Cancellable handle on one armed job.
#[derive(Debug, Clone)]
pub struct Ticket {
    pub job_id: JobId,
    pub conversation_id: ConversationId,
    token: CancellationToken,
}

impl Ticket {
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

pub struct SchedulingAgent {
    runner: JobRunner,
    shutdown: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl SchedulingAgent {
    pub fn new(jobs: Arc<dyn ScheduledJobStore>, dispatcher: Arc<dyn MessageDispatcher>) -> Self {
        Self {
            runner: JobRunner {
                jobs,
                dispatcher,
                humanizer: None,
                history: None,
                tickets: Arc::new(Mutex::new(HashMap::new())),
            },
            shutdown: CancellationToken::new(),
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Rewrites each message through the generator just before it is sent.
    pub fn with_humanizer(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.runner.humanizer = Some(generator);
        self
    }

    /// Gives the rewrite the last `window` transcript entries of the job's
    /// conversation.
    pub fn with_history(mut self, conversations: Arc<dyn ConversationStore>, window: usize) -> Self {
        self.runner.history = Some(HistorySource {
            conversations,
            window: window.max(1),
        });
        self
    }

    /// Arms one timer per message. Delays are cumulative.
    ///
    /// Rejected once the conversation has jobs for the same intent that were
    /// not cancelled, whether they already fired or not, or when any text
    /// still carries a `{placeholder}`.
    pub async fn schedule_messages(
        &self,
        conversation_id: ConversationId,
        customer_id: &CustomerId,
        intent: Intent,
        messages: Vec<MessageSpec>,
    ) -> Result<Vec<ScheduledMessageJob>, SchedulingError> {
        if self.shutdown.is_cancelled() {
            return Err(SchedulingError::ShuttingDown);
        }
        if messages.is_empty() {
            return Err(SchedulingError::Empty);
        }
        for (index, message) in messages.iter().enumerate() {
            let placeholders = unresolved_placeholders(&message.text);
            if !placeholders.is_empty() {
                return Err(SchedulingError::UnresolvedPlaceholder { index, placeholders });
            }
        }

        // Held across the existing-jobs check and the save so two callers
        // cannot both pass the check.
        let mut tickets = self.runner.tickets.lock().await;

        let existing = self.runner.jobs.list_for_conversation(&conversation_id).await?;
        if existing
            .iter()
            .any(|job| job.intent == intent && job.status != JobStatus::Cancelled)
        {
            return Err(SchedulingError::AlreadyScheduled(conversation_id));
        }

        let armed_at = Instant::now();
        let jobs = plan_jobs(conversation_id, customer_id, intent, &messages, Timestamp::now());
        for job in &jobs {
            self.runner.jobs.save(job).await?;
        }

        let batch = self.shutdown.child_token();
        let mut plan = Vec::with_capacity(jobs.len());
        for job in &jobs {
            let token = batch.child_token();
            tickets.insert(
                job.id,
                Ticket {
                    job_id: job.id,
                    conversation_id,
                    token: token.clone(),
                },
            );
            plan.push((job.id, armed_at + Duration::from_millis(job.delay_ms), token));
        }
        drop(tickets);

        let runner = self.runner.clone();
        let handle = tokio::spawn(async move { runner.run(plan).await });
        {
            let mut tasks = self.tasks.lock().await;
            tasks.retain(|task| !task.is_finished());
            tasks.push(handle);
        }

        info!(
            conversation_id = %conversation_id,
            count = jobs.len(),
            last_delay_ms = jobs.last().map(|j| j.delay_ms).unwrap_or_default(),
            "Scheduled follow-up messages"
        );
        Ok(jobs)
    }

    /// Cancels every pending job of the conversation. Returns how many were
    /// cancelled; calling again returns zero.
    pub async fn cancel_scheduled_messages(&self, conversation_id: &ConversationId) -> Result<usize, SchedulingError> {
        {
            let tickets = self.runner.tickets.lock().await;
            tickets
                .values()
                .filter(|t| t.conversation_id == *conversation_id)
                .for_each(Ticket::cancel);
        }

        let mut cancelled = 0;
        for mut job in self.runner.jobs.list_for_conversation(conversation_id).await? {
            if job.status.is_pending() {
                job.mark_cancelled()?;
                self.runner.jobs.save(&job).await?;
                cancelled += 1;
            }
        }
        if cancelled > 0 {
            info!(conversation_id = %conversation_id, cancelled, "Cancelled scheduled messages");
        }
        Ok(cancelled)
    }

    /// Cancels a single job. A job that already finished is returned unchanged.
    pub async fn cancel_job(&self, job_id: &JobId) -> Result<ScheduledMessageJob, SchedulingError> {
        if let Some(ticket) = self.runner.tickets.lock().await.get(job_id) {
            ticket.cancel();
        }
        let mut job = self
            .runner
            .jobs
            .find(job_id)
            .await?
            .ok_or(SchedulingError::JobNotFound(*job_id))?;
        if job.status.is_pending() {
            job.mark_cancelled()?;
            self.runner.jobs.save(&job).await?;
            debug!(job_id = %job_id, "Cancelled scheduled message");
        }
        Ok(job)
    }

    /// Tickets of jobs whose timers are still armed.
    pub async fn tickets_for(&self, conversation_id: &ConversationId) -> Vec<Ticket> {
        self.runner
            .tickets
            .lock()
            .await
            .values()
            .filter(|t| t.conversation_id == *conversation_id)
            .cloned()
            .collect()
    }

    pub async fn jobs_for(&self, conversation_id: &ConversationId) -> Result<Vec<ScheduledMessageJob>, SchedulingError> {
        Ok(self.runner.jobs.list_for_conversation(conversation_id).await?)
    }

    /// Cancels every armed timer and waits for the timer tasks to finish.
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        let tasks = std::mem::take(&mut *self.tasks.lock().await);
        let count = tasks.len();
        for result in join_all(tasks).await {
            if let Err(e) = result {
                error!(error = %e, "Scheduled message task panicked");
            }
        }
        info!(tasks = count, "Scheduling agent stopped");
    }
}

/// Where the rewrite finds recent conversation turns.
#[derive(Clone)]
struct HistorySource {
    conversations: Arc<dyn ConversationStore>,
    window: usize,
}

/// The part of the agent the timer tasks need.
#[derive(Clone)]
struct JobRunner {
    jobs: Arc<dyn ScheduledJobStore>,
    dispatcher: Arc<dyn MessageDispatcher>,
    humanizer: Option<Arc<dyn TextGenerator>>,
    history: Option<HistorySource>,
    tickets: Arc<Mutex<HashMap<JobId, Ticket>>>,
}

impl JobRunner {
    async fn run(&self, plan: Vec<(JobId, Instant, CancellationToken)>) {
        for (job_id, deadline, token) in plan {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    if let Err(e) = self.cancel(&job_id).await {
                        error!(job_id = %job_id, error = %e, "Failed to record cancellation");
                    }
                }
                _ = sleep_until(deadline) => {
                    if let Err(e) = self.fire(&job_id).await {
                        error!(job_id = %job_id, error = %e, "Failed to fire scheduled message");
                    }
                }
            }
            self.tickets.lock().await.remove(&job_id);
        }
    }

    async fn cancel(&self, job_id: &JobId) -> Result<(), SchedulingError> {
        if let Some(mut job) = self.jobs.find(job_id).await? {
            if job.status.is_pending() {
                job.mark_cancelled()?;
                self.jobs.save(&job).await?;
            }
        }
        Ok(())
    }

    async fn fire(&self, job_id: &JobId) -> Result<(), SchedulingError> {
        let Some(mut job) = self.jobs.find(job_id).await? else {
            warn!(job_id = %job_id, "Scheduled message vanished before firing");
            return Ok(());
        };
        if !job.status.is_pending() {
            return Ok(());
        }

        let placeholders = unresolved_placeholders(&job.text);
        if !placeholders.is_empty() {
            warn!(job_id = %job_id, ?placeholders, "Refusing to send message with placeholders");
            job.mark_error(format!("unresolved placeholders: {}", placeholders.join(", ")))?;
            self.jobs.save(&job).await?;
            return Ok(());
        }

        let text = self.humanize(&job).await;
        match self.dispatcher.send(&job.customer_id, &text).await {
            Ok(()) => {
                info!(
                    job_id = %job_id,
                    conversation_id = %job.conversation_id,
                    sequence = job.sequence,
                    "Sent scheduled message"
                );
                job.mark_sent(text)?;
            }
            Err(e) => {
                warn!(job_id = %job_id, error = %e, "Scheduled message delivery failed");
                job.mark_failed(e.to_string())?;
            }
        }
        self.jobs.save(&job).await?;
        Ok(())
    }

    /// Recent turns of the job's conversation. Empty when none are available.
    async fn history(&self, conversation_id: &ConversationId) -> Vec<ChatMessage> {
        let Some(source) = &self.history else {
            return Vec::new();
        };
        match source.conversations.find(conversation_id).await {
            Ok(Some(state)) => history_messages(state.recent_transcript(source.window)),
            Ok(None) => Vec::new(),
            Err(e) => {
                debug!(conversation_id = %conversation_id, error = %e, "Conversation history unavailable");
                Vec::new()
            }
        }
    }

    /// Rewritten text, or the original when rewriting fails or drops an identifier.
    async fn humanize(&self, job: &ScheduledMessageJob) -> String {
        let text = job.text.as_str();
        let Some(generator) = &self.humanizer else {
            return text.to_string();
        };
        let request = GenerationRequest::new()
            .with_system_prompt(HUMANIZE_PROMPT)
            .with_messages(self.history(&job.conversation_id).await)
            .with_message(ChatMessage::user(format!("Message to rewrite:\n{}", text)))
            .with_max_tokens(200)
            .with_temperature(0.7);

        match generator.generate(request).await {
            Ok(rewritten) => {
                let rewritten = rewritten.trim();
                if rewritten.is_empty()
                    || !unresolved_placeholders(rewritten).is_empty()
                    || !preserves_identifiers(text, rewritten)
                {
                    debug!("Rewrite dropped details, sending original text");
                    text.to_string()
                } else {
                    rewritten.to_string()
                }
            }
            Err(e) => {
                debug!(error = %e, "Rewrite unavailable, sending original text");
                text.to_string()
            }
        }
    }
}

/// Every word of the original that carries a digit must survive the rewrite.
fn preserves_identifiers(original: &str, rewritten: &str) -> bool {
    original
        .split_whitespace()
        .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|word| word.chars().any(|c| c.is_ascii_digit()))
        .all(|word| rewritten.contains(word))
}
