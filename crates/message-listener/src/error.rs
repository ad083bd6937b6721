use chat_bridge::BridgeError;
use thiserror::Error;

/// Errors that can occur during message listening.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// Gateway communication error.
    #[error("bridge error: {0}")]
    Bridge(#[from] BridgeError),

    /// The event stream ended and will not reconnect.
    #[error("event stream ended")]
    StreamEnded,
}
