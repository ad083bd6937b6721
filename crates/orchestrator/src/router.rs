//! Inbound message routing.
//!
//! Each message moves through an explicit state machine:
//!
//! ```text
//! Idle → Classifying → Dispatched(route) → Responding → Idle
//! ```
//!
//! At most one message per sender is in flight. A message that arrives while
//! its sender is busy is dropped, not queued.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use brain_core::{AudioClip, InboundMessage, MessageKind};
use database::{keyword, turns, Database, KeywordKind, KeywordRule};
use tracing::{debug, error, info, warn};

use crate::commands::{self, Command, HELP_TEXT, RESET_CONFIRMATION};
use crate::config::RouterConfig;
use crate::engine::{ConversationEngine, ProcessOptions};
use crate::error::OrchestratorError;
use crate::keywords::match_keyword;
use crate::sender::MessageSender;

/// Sent when the model provider reports a quota or rate limit.
pub const QUOTA_EXCEEDED_MESSAGE: &str =
    "I've hit my usage limit for now. Please try again in a little while.";

/// Sent for every other failure.
pub const GENERIC_ERROR_MESSAGE: &str =
    "Sorry, something went wrong while handling that. Please try again.";

/// How a message will be handled.
#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    Command(Command),
    StaticKeyword(String),
    AugmentedKeyword { instructions: String, text: String },
    Voice(AudioClip),
    Text(String),
    Ignore,
}

impl Route {
    pub fn kind(&self) -> RouteKind {
        match self {
            Route::Command(_) => RouteKind::Command,
            Route::StaticKeyword(_) => RouteKind::StaticKeyword,
            Route::AugmentedKeyword { .. } => RouteKind::AugmentedKeyword,
            Route::Voice(_) => RouteKind::Voice,
            Route::Text(_) => RouteKind::Text,
            Route::Ignore => RouteKind::Ignore,
        }
    }
}

/// [`Route`] without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    Command,
    StaticKeyword,
    AugmentedKeyword,
    Voice,
    Text,
    Ignore,
}

/// Where a message is in its handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterState {
    Idle,
    Classifying,
    Dispatched(RouteKind),
    Responding,
}

impl RouterState {
    /// Whether `next` may follow `self`.
    pub fn can_advance_to(self, next: RouterState) -> bool {
        matches!(
            (self, next),
            (RouterState::Idle, RouterState::Classifying)
                | (RouterState::Classifying, RouterState::Dispatched(_))
                | (RouterState::Classifying, RouterState::Idle)
                | (RouterState::Dispatched(_), RouterState::Responding)
                | (RouterState::Responding, RouterState::Idle)
        )
    }
}

/// Why a route failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Quota,
    Generic,
}

impl FailureKind {
    pub fn of(err: &OrchestratorError) -> Self {
        if err.is_quota() {
            FailureKind::Quota
        } else {
            FailureKind::Generic
        }
    }

    /// The fixed text the user sees.
    pub fn user_message(self) -> &'static str {
        match self {
            FailureKind::Quota => QUOTA_EXCEEDED_MESSAGE,
            FailureKind::Generic => GENERIC_ERROR_MESSAGE,
        }
    }
}

/// Result of [`Router::route`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// The sender already had a message in flight.
    Dropped,
    /// Nothing to answer (empty text, stickers, images).
    Ignored,
    /// This text was sent back.
    Replied(String),
    /// The engine answered with nothing; nothing was sent.
    Silent,
    /// Handling failed; the matching fixed message was sent.
    Failed(FailureKind),
}

type InFlight = Arc<Mutex<HashSet<String>>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Holds a sender's in-flight slot and releases it on drop.
struct InFlightGuard {
    set: InFlight,
    sender: String,
}

impl InFlightGuard {
    fn acquire(set: &InFlight, sender: &str) -> Option<Self> {
        if !lock(set).insert(sender.to_string()) {
            return None;
        }
        Some(Self {
            set: Arc::clone(set),
            sender: sender.to_string(),
        })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        lock(&self.set).remove(&self.sender);
    }
}

/// Logs state transitions for one message.
struct Flow<'a> {
    sender: &'a str,
    state: RouterState,
}

impl<'a> Flow<'a> {
    fn new(sender: &'a str) -> Self {
        Self {
            sender,
            state: RouterState::Idle,
        }
    }

    fn advance(&mut self, next: RouterState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "invalid transition {:?} -> {:?}",
            self.state,
            next
        );
        debug!(sender = %self.sender, "Router {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

/// Entry point for inbound messages.
pub struct Router {
    engine: Arc<ConversationEngine>,
    db: Database,
    sender: Arc<dyn MessageSender>,
    config: RouterConfig,
    in_flight: InFlight,
    last_activity: Mutex<HashMap<String, Instant>>,
}

impl Router {
    pub fn new(
        engine: Arc<ConversationEngine>,
        sender: Arc<dyn MessageSender>,
        config: RouterConfig,
    ) -> Self {
        let db = engine.database().clone();
        Self {
            engine,
            db,
            sender,
            config,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
            last_activity: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Whether a message from `sender` is being handled right now.
    pub fn is_in_flight(&self, sender: &str) -> bool {
        lock(&self.in_flight).contains(sender)
    }

    /// Handle one inbound message end-to-end.
    ///
    /// Never returns an error: failures are reported to the sender with one
    /// of the two fixed messages and surfaced as [`RouteOutcome::Failed`].
    pub async fn route(&self, message: InboundMessage) -> RouteOutcome {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight, &message.sender) else {
            info!(sender = %message.sender, "Sender busy, dropping message");
            return RouteOutcome::Dropped;
        };

        let mut flow = Flow::new(&message.sender);
        flow.advance(RouterState::Classifying);

        self.reset_stale_session(&message.sender).await;

        let route = self.classify(&message).await;
        if route == Route::Ignore {
            flow.advance(RouterState::Idle);
            return RouteOutcome::Ignored;
        }
        flow.advance(RouterState::Dispatched(route.kind()));

        self.acknowledge(&message).await;

        let result = self.dispatch(&message.sender, route).await;
        flow.advance(RouterState::Responding);

        let outcome = match result {
            Ok(text) if text.trim().is_empty() => {
                debug!(sender = %message.sender, "Empty answer, nothing sent");
                RouteOutcome::Silent
            }
            Ok(text) => {
                self.send(&message.destination, &text).await;
                RouteOutcome::Replied(text)
            }
            Err(err) => {
                let kind = FailureKind::of(&err);
                error!(sender = %message.sender, "Failed to handle message ({:?}): {}", kind, err);
                self.send(&message.destination, kind.user_message()).await;
                RouteOutcome::Failed(kind)
            }
        };

        flow.advance(RouterState::Idle);
        outcome
    }

    /// Clear history when the sender has been quiet longer than the
    /// session timeout, then record this message as their latest activity.
    async fn reset_stale_session(&self, sender: &str) {
        let now = Instant::now();
        let previous = lock(&self.last_activity).insert(sender.to_string(), now);

        let Some(previous) = previous else {
            return;
        };
        if now.duration_since(previous) <= self.config.session_timeout {
            return;
        }

        match turns::clear_turns(self.db.pool(), sender).await {
            Ok(removed) => info!(
                sender = %sender,
                "Session timed out, cleared {} turns",
                removed
            ),
            Err(e) => warn!(sender = %sender, "Failed to clear stale session: {}", e),
        }
    }

    /// Decide how to handle a message.
    pub async fn classify(&self, message: &InboundMessage) -> Route {
        let text = match &message.kind {
            MessageKind::Text(text) => text.trim(),
            MessageKind::Voice(clip) => return Route::Voice(clip.clone()),
            MessageKind::Other => return Route::Ignore,
        };

        if let Some(command) = Command::parse(text, &self.config.command_prefix) {
            return Route::Command(command);
        }

        if let Some(rule) = match_keyword(&self.enabled_keywords().await, text) {
            debug!(sender = %message.sender, "Matched keyword rule {}", rule.id);
            return match rule.kind {
                KeywordKind::Static => Route::StaticKeyword(rule.payload.clone()),
                KeywordKind::Ai => Route::AugmentedKeyword {
                    instructions: rule.payload.clone(),
                    text: text.to_string(),
                },
            };
        }

        if text.is_empty() {
            Route::Ignore
        } else {
            Route::Text(text.to_string())
        }
    }

    async fn enabled_keywords(&self) -> Vec<KeywordRule> {
        keyword::list_enabled(self.db.pool())
            .await
            .unwrap_or_else(|e| {
                warn!("Failed to load keyword rules: {}", e);
                Vec::new()
            })
    }

    async fn dispatch(&self, sender: &str, route: Route) -> Result<String, OrchestratorError> {
        match route {
            Route::Command(command) => self.run_command(sender, command).await,
            Route::StaticKeyword(payload) => Ok(payload),
            Route::AugmentedKeyword { instructions, text } => {
                self.engine
                    .process(sender, &text, ProcessOptions::augmented(instructions))
                    .await
            }
            Route::Voice(clip) => {
                self.engine
                    .process_audio(sender, clip, ProcessOptions::default())
                    .await
            }
            Route::Text(text) => {
                self.engine
                    .process(sender, &text, ProcessOptions::default())
                    .await
            }
            Route::Ignore => Ok(String::new()),
        }
    }

    async fn run_command(&self, sender: &str, command: Command) -> Result<String, OrchestratorError> {
        info!(sender = %sender, "Command {:?}", command);
        match command {
            Command::Help => Ok(HELP_TEXT.to_string()),
            Command::Reset => {
                let removed = turns::clear_turns(self.db.pool(), sender).await?;
                debug!(sender = %sender, "Reset removed {} turns", removed);
                Ok(RESET_CONFIRMATION.to_string())
            }
            Command::Devices => commands::device_listing(&self.db).await,
            Command::Unknown(name) => Ok(commands::unknown_command_reply(
                &name,
                &self.config.command_prefix,
            )),
        }
    }

    async fn acknowledge(&self, message: &InboundMessage) {
        let (Some(emoji), Some(id)) = (&self.config.ack_reaction, &message.id) else {
            return;
        };
        if let Err(e) = self.sender.send_reaction(&message.destination, id, emoji).await {
            warn!(sender = %message.sender, "Failed to send acknowledgement: {}", e);
        }
    }

    async fn send(&self, destination: &str, text: &str) {
        if let Err(e) = self.sender.send_message(destination, text).await {
            error!("Failed to send reply to {}: {}", destination, e);
        }
    }
}
