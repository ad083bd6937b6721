//! Scheduled prompts.
//!
//! Each enabled scheduled prompt becomes a job. The scheduler sleeps until
//! the earliest next firing, runs due jobs on their own tasks and reloads its
//! job list whenever a [`ReloadHandle`] is triggered. Missed firings are
//! neither queued nor retried.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use cron::Schedule;
use database::{schedule, validation, Database};
use tokio::sync::Notify;
use tracing::{debug, error, info, warn};

use crate::config::SchedulerConfig;
use crate::engine::ConversationEngine;
use crate::error::OrchestratorError;
use crate::sender::MessageSender;

/// How long to sleep when no job is scheduled.
const IDLE_WAIT: Duration = Duration::from_secs(3600);

/// A scheduled prompt with its parsed schedule.
#[derive(Debug, Clone)]
pub struct ScheduledJob {
    pub id: i64,
    pub name: String,
    pub prompt: String,
    pub schedule: Schedule,
}

impl ScheduledJob {
    /// Next firing strictly after `after`.
    pub fn next_after(&self, after: &DateTime<Local>) -> Option<DateTime<Local>> {
        self.schedule.after(after).next()
    }
}

/// What a firing did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FireOutcome {
    /// Destination unset or channel not ready.
    Skipped(&'static str),
    /// The prompt produced no text.
    Empty,
    Sent(String),
    Failed(String),
}

/// Asks a running scheduler to re-read its jobs.
#[derive(Debug, Clone)]
pub struct ReloadHandle {
    notify: Arc<Notify>,
}

impl ReloadHandle {
    pub fn reload(&self) {
        debug!("Scheduler reload requested");
        self.notify.notify_one();
    }

    /// Wait for the next reload request. A request made while nobody was
    /// waiting completes the next call immediately.
    pub async fn requested(&self) {
        self.notify.notified().await;
    }
}

/// Fires scheduled prompts through the engine's stateless path.
pub struct Scheduler {
    db: Database,
    engine: Arc<ConversationEngine>,
    sender: Arc<dyn MessageSender>,
    config: SchedulerConfig,
    reload: ReloadHandle,
}

impl Scheduler {
    pub fn new(
        engine: Arc<ConversationEngine>,
        sender: Arc<dyn MessageSender>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            db: engine.database().clone(),
            engine,
            sender,
            config,
            reload: ReloadHandle {
                notify: Arc::new(Notify::new()),
            },
        }
    }

    pub fn reload_handle(&self) -> ReloadHandle {
        self.reload.clone()
    }

    /// Read enabled scheduled prompts.
    ///
    /// Prompts whose expression does not parse are logged and left out.
    pub async fn load_jobs(&self) -> Result<Vec<ScheduledJob>, OrchestratorError> {
        let prompts = schedule::list_enabled(self.db.pool()).await?;
        let mut jobs = Vec::with_capacity(prompts.len());

        for prompt in prompts {
            match validation::parse_schedule(&prompt.schedule) {
                Ok(schedule) => jobs.push(ScheduledJob {
                    id: prompt.id,
                    name: prompt.name,
                    prompt: prompt.prompt,
                    schedule,
                }),
                Err(e) => error!(
                    "Scheduled prompt '{}' not registered: {}",
                    prompt.name, e
                ),
            }
        }

        info!("Loaded {} scheduled prompts", jobs.len());
        Ok(jobs)
    }

    async fn load_or_empty(&self) -> Vec<ScheduledJob> {
        self.load_jobs().await.unwrap_or_else(|e| {
            error!("Failed to load scheduled prompts: {}", e);
            Vec::new()
        })
    }

    /// Run until `shutdown` completes.
    pub async fn run(self: Arc<Self>, shutdown: impl Future<Output = ()>) {
        tokio::pin!(shutdown);
        let mut jobs = self.load_or_empty().await;

        loop {
            let since = Local::now();
            let wait = jobs
                .iter()
                .filter_map(|job| job.next_after(&since))
                .min()
                .map(|next| (next - since).to_std().unwrap_or_default())
                .unwrap_or(IDLE_WAIT);
            debug!("Scheduler sleeping for {:?}", wait);

            tokio::select! {
                _ = &mut shutdown => {
                    info!("Scheduler shutting down");
                    return;
                }
                _ = self.reload.requested() => {
                    jobs = self.load_or_empty().await;
                }
                _ = tokio::time::sleep(wait) => {
                    let now = Local::now();
                    for job in jobs.iter().filter(|job| job.next_after(&since).is_some_and(|t| t <= now)) {
                        let scheduler = Arc::clone(&self);
                        let job = job.clone();
                        tokio::spawn(async move {
                            scheduler.fire(&job).await;
                        });
                    }
                }
            }
        }
    }

    /// Run one job now.
    pub async fn fire(&self, job: &ScheduledJob) -> FireOutcome {
        let Some(destination) = self.config.broadcast_destination.as_deref() else {
            warn!(job = %job.name, "No broadcast destination configured, skipping");
            return FireOutcome::Skipped("no broadcast destination");
        };
        if !self.sender.is_ready() {
            warn!(job = %job.name, "Messaging channel not ready, skipping");
            return FireOutcome::Skipped("channel not ready");
        }

        info!(job = %job.name, "Firing scheduled prompt");
        let text = match self
            .engine
            .process_stateless(&self.config.sender_id, &job.prompt)
            .await
        {
            Ok(text) => text,
            Err(e) => {
                error!(job = %job.name, "Scheduled prompt failed: {}", e);
                return FireOutcome::Failed(e.to_string());
            }
        };

        if text.is_empty() {
            debug!(job = %job.name, "Scheduled prompt produced no text");
            return FireOutcome::Empty;
        }

        match self.sender.send_message(destination, &text).await {
            Ok(()) => FireOutcome::Sent(text),
            Err(e) => {
                error!(job = %job.name, "Failed to deliver scheduled message: {}", e);
                FireOutcome::Failed(e.to_string())
            }
        }
    }
}
