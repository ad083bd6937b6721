//! Message listener for the household bot.
//!
//! Bridges the messaging gateway's event stream to the orchestrator's
//! [`Router`](orchestrator::Router):
//!
//! - Drops the bot's own messages and senders outside the allow-list
//! - Downloads voice notes before routing
//! - Dispatches each message on its own task
//! - Provides [`BridgeSender`], the gateway-backed `MessageSender`
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use chat_bridge::{BridgeClient, BridgeConfig};
//! use message_listener::{ListenerConfig, MessageListener};
//! use orchestrator::Router;
//!
//! # async fn example(router: Arc<Router>) -> Result<(), message_listener::ListenerError> {
//! let client = BridgeClient::connect(BridgeConfig::from_env()).await?;
//! let listener = MessageListener::new(client, router, ListenerConfig::from_env());
//! listener.run_with_shutdown(std::future::pending()).await
//! # }
//! ```

mod config;
mod convert;
mod error;
mod listener;
mod sender;

pub use config::{normalize_id, ListenerConfig};
pub use convert::{admit, resolve, text_kind, to_inbound, SkipReason};
pub use error::ListenerError;
pub use listener::MessageListener;
pub use sender::BridgeSender;

// Re-export gateway types for users
pub use chat_bridge::{BridgeClient, BridgeConfig, BridgeEvent, Envelope, ReconnectConfig};

/// Crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
