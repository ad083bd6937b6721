//! Conversation orchestration for the household assistant.
//!
//! This crate provides the pieces between the messaging channel and the
//! model:
//!
//! - [`ConversationEngine`] drives the model through a bounded tool loop,
//!   with text, voice, stateless and broadcast entry points
//! - [`Router`] enforces one in-flight message per sender, resets stale
//!   sessions, classifies input and maps failures to fixed replies
//! - [`Scheduler`] fires stored prompts on cron schedules
//!
//! # Architecture
//!
//! ```text
//! Inbound message (from message-listener)
//!          ↓
//! ┌──────────────────────────────────────────────────────────┐
//! │                        ROUTER                            │
//! │  single-flight per sender → session reset → classify     │
//! │         ↓                ↓                  ↓            │
//! │     /command       keyword rule      text / voice        │
//! │         ↓          static │ ai            ↓              │
//! │      reply          reply └──→  CONVERSATION ENGINE      │
//! │                                  model ⇄ tool registry   │
//! └──────────────────────────────────────────────────────────┘
//!          ↓
//! MessageSender (chat bridge)
//!
//! Scheduler → engine (stateless) → MessageSender
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use orchestrator::{ConversationEngine, EngineConfig, LoggingSender, Router, RouterConfig};
//! use brain_core::InboundMessage;
//!
//! let engine = Arc::new(ConversationEngine::new(brain, tools, db, EngineConfig::from_env()));
//! let router = Router::new(engine, Arc::new(LoggingSender), RouterConfig::from_env());
//!
//! let outcome = router.route(InboundMessage::text("+972500000000", "turn on the lamp")).await;
//! ```

mod classifier;
mod commands;
mod config;
mod engine;
mod error;
mod keywords;
mod router;
mod scheduler;
mod sender;

pub use classifier::{DeviceVocabulary, DEFAULT_DEVICE_KEYWORDS};
pub use commands::{Command, HELP_TEXT, RESET_CONFIRMATION};
pub use config::{EngineConfig, RouterConfig, SchedulerConfig};
pub use engine::{fallback_announcement, ConversationEngine, ProcessOptions, VOICE_PLACEHOLDER};
pub use error::OrchestratorError;
pub use keywords::match_keyword;
pub use router::{
    FailureKind, Route, RouteKind, RouteOutcome, Router, RouterState, GENERIC_ERROR_MESSAGE,
    QUOTA_EXCEEDED_MESSAGE,
};
pub use scheduler::{FireOutcome, ReloadHandle, ScheduledJob, Scheduler};
pub use sender::{LoggingSender, MessageSender, NoOpSender};

// Re-export commonly used types from dependencies
pub use async_trait::async_trait;
pub use brain_core::{AudioClip, InboundMessage, MessageKind};
