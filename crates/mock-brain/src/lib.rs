//! Mock model clients for testing.
//!
//! This crate provides implementations of the `Brain` trait for tests:
//! - `ScriptedBrain` - Replays queued responses and records every request
//! - `EchoBrain` - Answers with the last user message
//! - `DelayedBrain` - Wraps another brain with artificial delay
//!
//! For production use, see the `openai-brain` crate.
//!
//! # Example
//!
//! ```rust
//! use mock_brain::{Brain, ChatMessage, ModelRequest, ScriptedBrain};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mock_brain::BrainError> {
//!     let brain = ScriptedBrain::new();
//!     brain.push_tool_call("list_devices", "{}");
//!     brain.push_text("You have two lamps.");
//!
//!     let first = brain.complete(ModelRequest::new(vec![ChatMessage::user("what do I have?")])).await?;
//!     assert_eq!(first.tool_calls[0].name, "list_devices");
//!     assert_eq!(brain.requests().len(), 1);
//!     Ok(())
//! }
//! ```

mod delayed;
mod echo;
mod scripted;

// Re-export brain-core types for convenience
pub use brain_core::{
    async_trait, Brain, BrainError, ChatMessage, ModelRequest, ModelResponse, ToolCall,
};

pub use delayed::DelayedBrain;
pub use echo::EchoBrain;
pub use scripted::ScriptedBrain;
