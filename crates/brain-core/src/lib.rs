//! Core model-client trait and chat types for the household assistant.
//!
//! This crate provides the shared vocabulary used by every crate that talks
//! to a language model. It defines:
//!
//! - [`Brain`] - The trait that model clients implement
//! - [`ChatMessage`] / [`ModelRequest`] / [`ModelResponse`] - Request and response types
//! - [`ToolCall`] / [`ToolDefinition`] - Function-calling types
//! - [`InboundMessage`] - A chat message received from the messaging channel
//! - [`BrainError`] - Error types for model calls
//!
//! # Example
//!
//! ```rust
//! use brain_core::{Brain, BrainError, ModelRequest, ModelResponse};
//! use async_trait::async_trait;
//!
//! struct FixedBrain;
//!
//! #[async_trait]
//! impl Brain for FixedBrain {
//!     async fn complete(&self, _request: ModelRequest) -> Result<ModelResponse, BrainError> {
//!         Ok(ModelResponse::text("Hello!"))
//!     }
//!
//!     fn name(&self) -> &str {
//!         "FixedBrain"
//!     }
//! }
//! ```

mod error;
pub mod history;
mod message;
mod model;
pub mod prompt;
mod tools;

pub use error::BrainError;
pub use history::coalesce;
pub use message::{AudioClip, InboundMessage, MessageKind};
pub use model::{Brain, ChatMessage, ModelRequest, ModelResponse, Role, Usage};
pub use prompt::hash_prompt;
pub use tools::{FunctionDefinition, ToolCall, ToolDefinition};

// Re-export async_trait for convenience
pub use async_trait::async_trait;
