//! Conversation engine: history, the bounded tool loop and announcements.

use std::sync::Arc;

use agent_tools::{ToolError, ToolOutput, ToolRegistry};
use brain_core::{
    coalesce, AudioClip, Brain, ChatMessage, ModelRequest, ModelResponse, Role, ToolCall,
    ToolDefinition,
};
use chrono::Local;
use database::{tool_audit, turns, Database};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::OrchestratorError;

/// Text stored in place of a voice note.
pub const VOICE_PLACEHOLDER: &str = "[voice message]";

/// Per-call options for [`ConversationEngine::process`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessOptions {
    /// Replay history even when the input is device-related.
    pub keep_history: bool,
    /// Extra instructions placed before the input for this call only.
    pub instructions: Option<String>,
}

impl ProcessOptions {
    /// Options for an AI keyword: history kept, payload as instructions.
    pub fn augmented(instructions: impl Into<String>) -> Self {
        Self {
            keep_history: true,
            instructions: Some(instructions.into()),
        }
    }
}

/// Drives the model through the tool loop for one input.
///
/// One engine is shared by the router, the scheduler and the broadcast
/// webhook. It holds no per-sender state; history lives in the database.
pub struct ConversationEngine {
    brain: Arc<dyn Brain>,
    tools: Arc<ToolRegistry>,
    db: Database,
    config: EngineConfig,
}

impl ConversationEngine {
    pub fn new(
        brain: Arc<dyn Brain>,
        tools: Arc<ToolRegistry>,
        db: Database,
        config: EngineConfig,
    ) -> Self {
        info!(
            "Conversation engine using {} with {} tools",
            brain.name(),
            tools.len()
        );
        Self {
            brain,
            tools,
            db,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Answer a text message from `sender`.
    ///
    /// Device-related input is answered without history unless
    /// `keep_history` is set. The user turn is stored before the model is
    /// called; the answer is stored only when it is non-empty.
    pub async fn process(
        &self,
        sender: &str,
        text: &str,
        options: ProcessOptions,
    ) -> Result<String, OrchestratorError> {
        let device_related = self.config.vocabulary.is_device_related(text);
        let history = if device_related && !options.keep_history {
            debug!(sender = %sender, "Device-related input, history suppressed");
            Vec::new()
        } else {
            self.load_history(sender).await?
        };

        turns::insert_turn(self.db.pool(), sender, Role::User.as_str(), text).await?;

        let input = match options.instructions.as_deref().map(str::trim) {
            Some(instructions) if !instructions.is_empty() => {
                format!("{}\n\n{}", instructions, text)
            }
            _ => text.to_string(),
        };

        let mut messages = history;
        messages.push(ChatMessage::user(input));

        let temperature = if device_related {
            self.config.device_temperature
        } else {
            self.config.chat_temperature
        };

        let answer = self.run_tool_loop(sender, coalesce(messages), temperature).await?;
        self.store_answer(sender, &answer).await?;
        Ok(answer)
    }

    /// Answer a voice note from `sender`.
    ///
    /// History is always replayed. The stored user turn is a placeholder
    /// since the audio itself is not kept.
    pub async fn process_audio(
        &self,
        sender: &str,
        clip: AudioClip,
        options: ProcessOptions,
    ) -> Result<String, OrchestratorError> {
        let history = self.load_history(sender).await?;

        turns::insert_turn(self.db.pool(), sender, Role::User.as_str(), VOICE_PLACEHOLDER).await?;

        let mut messages = history;
        messages.push(ChatMessage::user_audio(
            clip,
            options.instructions.unwrap_or_default(),
        ));

        let answer = self
            .run_tool_loop(sender, coalesce(messages), self.config.device_temperature)
            .await?;
        self.store_answer(sender, &answer).await?;
        Ok(answer)
    }

    /// Run a prompt with no history and store nothing.
    ///
    /// Tool calls are still audited under `sender`.
    pub async fn process_stateless(
        &self,
        sender: &str,
        prompt: &str,
    ) -> Result<String, OrchestratorError> {
        self.run_tool_loop(
            sender,
            vec![ChatMessage::user(prompt)],
            self.config.chat_temperature,
        )
        .await
    }

    /// Phrase a short announcement of an external event.
    ///
    /// Never fails: when the model errors or answers with nothing, the text
    /// from [`fallback_announcement`] is returned.
    pub async fn announce(&self, event: &str, data: &Value) -> String {
        let fallback = fallback_announcement(event, data);

        let prompt = format!(
            "Write a short, friendly announcement for the household about this event. \
             Reply with the announcement only.\n\nEvent: {}\nDetails: {}",
            event, data
        );
        let request = ModelRequest::new(vec![ChatMessage::user(prompt)])
            .with_temperature(self.config.broadcast_temperature);

        match self.brain.complete(request).await {
            Ok(response) => {
                let text = response.text_or_empty().trim();
                if text.is_empty() {
                    warn!(event = %event, "Empty announcement, using fallback");
                    fallback
                } else {
                    text.to_string()
                }
            }
            Err(e) => {
                warn!(event = %event, "Announcement failed, using fallback: {}", e);
                fallback
            }
        }
    }

    async fn load_history(&self, sender: &str) -> Result<Vec<ChatMessage>, OrchestratorError> {
        let limit = i64::try_from(self.config.history_limit).unwrap_or(i64::MAX);
        let rows = turns::recent_turns(self.db.pool(), sender, limit).await?;

        Ok(rows
            .into_iter()
            .filter_map(|turn| match Role::parse(&turn.role) {
                Some(Role::User) => Some(ChatMessage::user(turn.content)),
                Some(Role::Assistant) => Some(ChatMessage::assistant(turn.content)),
                _ => None,
            })
            .collect())
    }

    async fn store_answer(&self, sender: &str, answer: &str) -> Result<(), OrchestratorError> {
        if answer.is_empty() {
            debug!(sender = %sender, "Empty answer not stored");
            return Ok(());
        }
        turns::insert_turn(self.db.pool(), sender, Role::Assistant.as_str(), answer).await?;
        Ok(())
    }

    /// Call the model, run requested tools and feed results back until the
    /// model answers in text or the iteration cap is hit.
    async fn run_tool_loop(
        &self,
        sender: &str,
        mut messages: Vec<ChatMessage>,
        temperature: f32,
    ) -> Result<String, OrchestratorError> {
        let definitions = self.tools.definitions();
        let mut response = self.complete(&messages, &definitions, temperature).await?;
        let mut iterations = 0;

        while response.has_tool_calls() {
            if iterations >= self.config.max_tool_iterations {
                warn!(
                    sender = %sender,
                    "Tool loop stopped after {} iterations with calls still pending",
                    iterations
                );
                break;
            }
            iterations += 1;

            let calls = std::mem::take(&mut response.tool_calls);
            messages.push(ChatMessage::assistant_tool_calls(
                response.text_or_empty(),
                calls.clone(),
            ));

            for call in &calls {
                let result = self.invoke_tool(sender, call).await;
                messages.push(ChatMessage::tool_result(&call.id, result));
            }

            response = self.complete(&messages, &definitions, temperature).await?;
        }

        Ok(response.text.unwrap_or_default().trim().to_string())
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
        temperature: f32,
    ) -> Result<ModelResponse, OrchestratorError> {
        let request = ModelRequest::new(messages.to_vec())
            .with_system_prompt(format!(
                "Current local time: {}",
                Local::now().format("%A %Y-%m-%d %H:%M")
            ))
            .with_tools(tools.to_vec())
            .with_temperature(temperature);

        Ok(self.brain.complete(request).await?)
    }

    /// Run one tool call and return the JSON text fed back to the model.
    ///
    /// Failures become `{"error": ...}` results. The audit write is
    /// best-effort.
    async fn invoke_tool(&self, sender: &str, call: &ToolCall) -> String {
        let output = match call.parsed_arguments() {
            Ok(params) => match self.tools.execute(&call.name, params, Some(sender)).await {
                Ok(output) => output,
                Err(err) => ToolOutput::from(err),
            },
            Err(e) => ToolOutput::from(ToolError::invalid("arguments", e.to_string())),
        };

        info!(
            sender = %sender,
            tool = %call.name,
            success = output.success,
            "Tool invoked"
        );

        let content = output.to_model_string();
        if let Err(e) = tool_audit::insert_audit(
            self.db.pool(),
            sender,
            &call.name,
            &call.arguments,
            output.success,
            &content,
        )
        .await
        {
            warn!(sender = %sender, tool = %call.name, "Failed to record tool audit: {}", e);
        }

        content
    }
}

/// Deterministic announcement: the event name, then one `key: value` line
/// per data field.
pub fn fallback_announcement(event: &str, data: &Value) -> String {
    let mut text = event.to_string();

    let mut push_line = |key: Option<&str>, value: &Value| {
        let value = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        text.push('\n');
        if let Some(key) = key {
            text.push_str(key);
            text.push_str(": ");
        }
        text.push_str(&value);
    };

    match data {
        Value::Object(fields) => {
            for (key, value) in fields {
                push_line(Some(key), value);
            }
        }
        Value::Null => {}
        other => push_line(None, other),
    }

    text
}
