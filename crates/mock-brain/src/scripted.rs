//! Scripted brain implementation - replays queued responses.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use brain_core::{async_trait, Brain, BrainError, ModelRequest, ModelResponse, ToolCall};

/// A brain that replays a queue of scripted outcomes and records every
/// request it receives.
///
/// When the queue runs dry the fallback response is returned, or a
/// `ProcessingFailed` error when no fallback is set.
#[derive(Debug, Default)]
pub struct ScriptedBrain {
    script: Mutex<VecDeque<Result<ModelResponse, BrainError>>>,
    requests: Mutex<Vec<ModelRequest>>,
    fallback: Mutex<Option<ModelResponse>>,
    next_call_id: AtomicUsize,
}

impl ScriptedBrain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an arbitrary outcome.
    pub fn push(&self, outcome: Result<ModelResponse, BrainError>) {
        lock(&self.script).push_back(outcome);
    }

    /// Queue a plain text answer.
    pub fn push_text(&self, text: impl Into<String>) {
        self.push(Ok(ModelResponse::text(text)));
    }

    /// Queue a single tool call with a generated call id.
    pub fn push_tool_call(&self, name: impl Into<String>, arguments: impl Into<String>) {
        let call = self.tool_call(name, arguments);
        self.push(Ok(ModelResponse::tool_calls(vec![call])));
    }

    /// Queue several tool calls in one response.
    pub fn push_tool_calls(&self, calls: Vec<(&str, &str)>) {
        let calls = calls
            .into_iter()
            .map(|(name, arguments)| self.tool_call(name, arguments))
            .collect();
        self.push(Ok(ModelResponse::tool_calls(calls)));
    }

    /// Queue a failure.
    pub fn push_error(&self, error: BrainError) {
        self.push(Err(error));
    }

    /// Response returned once the script is exhausted.
    pub fn set_fallback(&self, response: ModelResponse) {
        *lock(&self.fallback) = Some(response);
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<ModelRequest> {
        lock(&self.requests).clone()
    }

    /// Number of calls made so far.
    pub fn call_count(&self) -> usize {
        lock(&self.requests).len()
    }

    /// Number of scripted outcomes not yet consumed.
    pub fn remaining(&self) -> usize {
        lock(&self.script).len()
    }

    fn tool_call(&self, name: impl Into<String>, arguments: impl Into<String>) -> ToolCall {
        let id = self.next_call_id.fetch_add(1, Ordering::SeqCst) + 1;
        ToolCall::new(format!("call_{}", id), name, arguments)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl Brain for ScriptedBrain {
    async fn complete(&self, request: ModelRequest) -> Result<ModelResponse, BrainError> {
        lock(&self.requests).push(request);

        if let Some(outcome) = lock(&self.script).pop_front() {
            return outcome;
        }

        match lock(&self.fallback).clone() {
            Some(response) => Ok(response),
            None => Err(BrainError::ProcessingFailed(
                "scripted brain has no more responses".to_string(),
            )),
        }
    }

    fn name(&self) -> &str {
        "ScriptedBrain"
    }
}
