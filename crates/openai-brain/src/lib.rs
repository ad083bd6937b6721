//! OpenAI-compatible model client.
//!
//! This crate provides a [`Brain`] implementation that talks to any
//! `/v1/chat/completions` endpoint speaking the OpenAI wire format.
//!
//! # Features
//!
//! - Function calling: tool definitions out, tool calls back
//! - Audio input parts for voice notes
//! - Rate-limit and quota errors surface as [`BrainError::QuotaExceeded`]
//! - Configurable via environment variables
//!
//! # Usage
//!
//! ```rust,no_run
//! use openai_brain::OpenAiBrain;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let brain = OpenAiBrain::from_env()?;
//!     // Hand the brain to the conversation engine...
//!     Ok(())
//! }
//! ```

mod api_types;
mod brain;
mod config;

pub use brain::OpenAiBrain;
pub use config::{OpenAiBrainConfig, OpenAiBrainConfigBuilder, DEFAULT_PROMPT_FILE};

// Re-export brain-core types for convenience
pub use brain_core::{async_trait, Brain, BrainError, ModelRequest, ModelResponse};
