//! Messaging gateway client library.
//!
//! The chat channel itself is owned by a sidecar process that speaks a small
//! JSON-over-HTTP API. This crate wraps that API:
//!
//! - Sending text messages and reactions
//! - Downloading media attachments (voice notes)
//! - Receiving typed events via Server-Sent Events (SSE)
//! - Tracking whether the channel is ready to send
//!
//! # Example
//!
//! ```no_run
//! use chat_bridge::{BridgeClient, BridgeConfig, BridgeEvent};
//! use futures::StreamExt;
//!
//! # async fn example() -> Result<(), chat_bridge::BridgeError> {
//! let client = BridgeClient::connect(BridgeConfig::from_env()).await?;
//!
//! let mut events = chat_bridge::subscribe(&client)?;
//! while let Some(event) = events.next().await {
//!     if let Ok(BridgeEvent::Message(envelope)) = event {
//!         if let Some(text) = envelope.text() {
//!             client.send_text(envelope.reply_to(), text).await?;
//!         }
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod types;

pub use client::BridgeClient;
pub use config::{BridgeConfig, DEFAULT_BRIDGE_URL};
pub use error::BridgeError;
pub use events::{subscribe, subscribe_with_reconnect, EventStream, ReconnectConfig};
pub use types::*;
