//! OpenAiBrain implementation over the chat completions API.

use base64::Engine;
use brain_core::{
    async_trait, hash_prompt, Brain, BrainError, ChatMessage, ModelRequest, ModelResponse, Role,
    ToolCall, Usage,
};
use reqwest::{Client, StatusCode};
use tracing::{debug, info, warn};

use crate::api_types::{
    ApiError, ChatCompletionRequest, ChatCompletionResponse, ContentPart, InputAudio,
    MessageContent, WireFunctionCall, WireMessage, WireToolCall,
};
use crate::config::OpenAiBrainConfig;

/// Markers that identify a rate-limit or quota rejection in an error body.
const QUOTA_MARKERS: &[&str] = &[
    "quota",
    "resource_exhausted",
    "rate limit",
    "rate_limit",
    "too many requests",
];

/// A [`Brain`] that calls an OpenAI-compatible chat completions endpoint.
///
/// The client is stateless: history, tools and temperature all arrive with
/// each [`ModelRequest`].
pub struct OpenAiBrain {
    client: Client,
    config: OpenAiBrainConfig,
    system_prompt_hash: Option<String>,
}

impl OpenAiBrain {
    /// Create a new OpenAiBrain with the given configuration.
    pub fn new(config: OpenAiBrainConfig) -> Result<Self, BrainError> {
        if config.api_key.trim().is_empty() {
            return Err(BrainError::Configuration("API key is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| BrainError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        let system_prompt_hash = config.system_prompt.as_deref().map(hash_prompt);
        if let Some(ref hash) = system_prompt_hash {
            info!("OpenAiBrain system prompt fingerprint: {}", hash);
        }

        info!(
            "OpenAiBrain initialized with model: {} at {}",
            config.model, config.api_url
        );

        Ok(Self {
            client,
            config,
            system_prompt_hash,
        })
    }

    /// Create an OpenAiBrain from environment variables.
    ///
    /// See [`OpenAiBrainConfig::from_env`] for required environment variables.
    pub fn from_env() -> Result<Self, BrainError> {
        Self::new(OpenAiBrainConfig::from_env()?)
    }

    /// Get the configuration.
    pub fn config(&self) -> &OpenAiBrainConfig {
        &self.config
    }

    /// Get the system prompt fingerprint, if configured.
    pub fn system_prompt_hash(&self) -> Option<&str> {
        self.system_prompt_hash.as_deref()
    }

    /// Build the wire request for a model request.
    fn build_request(&self, request: &ModelRequest) -> ChatCompletionRequest {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);

        let system = match (&self.config.system_prompt, &request.system_prompt) {
            (Some(base), Some(extra)) => Some(format!("{}\n\n{}", base, extra)),
            (Some(base), None) => Some(base.clone()),
            (None, Some(extra)) => Some(extra.clone()),
            (None, None) => None,
        };
        if let Some(system) = system {
            messages.push(WireMessage {
                role: Role::System.as_str().to_string(),
                content: Some(MessageContent::Text(system)),
                tool_calls: Vec::new(),
                tool_call_id: None,
            });
        }

        messages.extend(request.messages.iter().map(to_wire));

        let tools = if request.tools.is_empty() {
            None
        } else {
            Some(
                request
                    .tools
                    .iter()
                    .filter_map(|tool| serde_json::to_value(tool).ok())
                    .collect(),
            )
        };

        ChatCompletionRequest {
            model: self.config.model.clone(),
            messages,
            max_tokens: self.config.max_tokens,
            temperature: Some(request.temperature),
            tools,
        }
    }
}

/// Convert a core message into its wire form.
fn to_wire(message: &ChatMessage) -> WireMessage {
    let content = match &message.audio {
        Some(clip) => {
            let mut parts = Vec::with_capacity(2);
            if !message.content.is_empty() {
                parts.push(ContentPart::Text {
                    text: message.content.clone(),
                });
            }
            parts.push(ContentPart::InputAudio {
                input_audio: InputAudio {
                    data: base64::engine::general_purpose::STANDARD.encode(&clip.data),
                    format: clip.format().to_string(),
                },
            });
            Some(MessageContent::Parts(parts))
        }
        // Assistant turns that only call tools carry null content
        None if message.has_tool_calls() && message.content.is_empty() => None,
        None => Some(MessageContent::Text(message.content.clone())),
    };

    WireMessage {
        role: message.role.as_str().to_string(),
        content,
        tool_calls: message
            .tool_calls
            .iter()
            .map(|call| WireToolCall {
                id: call.id.clone(),
                call_type: "function".to_string(),
                function: WireFunctionCall {
                    name: call.name.clone(),
                    arguments: call.arguments.clone(),
                },
            })
            .collect(),
        tool_call_id: message.tool_call_id.clone(),
    }
}

/// Map a non-success HTTP response to a [`BrainError`].
///
/// HTTP 429 and bodies mentioning quota or rate limits are reported as
/// [`BrainError::QuotaExceeded`].
fn classify_error(status: StatusCode, body: &str) -> BrainError {
    let message = serde_json::from_str::<ApiError>(body)
        .map(|api_error| api_error.error.message)
        .unwrap_or_else(|_| body.to_string());
    let detail = format!("API error ({}): {}", status.as_u16(), message);

    let lowered = body.to_lowercase();
    if status == StatusCode::TOO_MANY_REQUESTS
        || QUOTA_MARKERS.iter().any(|marker| lowered.contains(marker))
    {
        return BrainError::QuotaExceeded(detail);
    }

    match status {
        StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY => {
            BrainError::Unavailable(detail)
        }
        StatusCode::GATEWAY_TIMEOUT => BrainError::Timeout,
        _ => BrainError::ProcessingFailed(detail),
    }
}

/// Extract the first choice into a [`ModelResponse`].
fn into_model_response(completion: ChatCompletionResponse) -> Result<ModelResponse, BrainError> {
    let usage = completion.usage.map(|u| Usage {
        prompt_tokens: u.prompt_tokens,
        completion_tokens: u.completion_tokens,
        total_tokens: u.total_tokens,
    });

    let choice = completion
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| BrainError::ProcessingFailed("response has no choices".to_string()))?;

    let tool_calls = choice
        .message
        .tool_calls
        .into_iter()
        .map(|call| ToolCall::new(call.id, call.function.name, call.function.arguments))
        .collect();

    Ok(ModelResponse {
        text: choice.message.content.filter(|text| !text.is_empty()),
        tool_calls,
        usage,
    })
}

#[async_trait]
impl Brain for OpenAiBrain {
    async fn complete(&self, request: ModelRequest) -> Result<ModelResponse, BrainError> {
        let body = self.build_request(&request);

        debug!(
            "Sending {} messages and {} tools to {}",
            body.messages.len(),
            request.tools.len(),
            self.config.model
        );

        let response = self
            .client
            .post(self.config.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    BrainError::Timeout
                } else {
                    BrainError::Network(format!("Failed to send request: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let err = classify_error(status, &error_text);
            warn!("Model provider error: {}", err);
            return Err(err);
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| BrainError::ProcessingFailed(format!("Failed to parse response: {}", e)))?;

        let result = into_model_response(completion)?;

        if let Some(usage) = result.usage {
            debug!(
                "Token usage - prompt: {}, completion: {}, total: {}",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }

        Ok(result)
    }

    fn name(&self) -> &str {
        "OpenAiBrain"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brain_core::{AudioClip, ToolDefinition};
    use serde_json::json;

    fn brain() -> OpenAiBrain {
        let config = OpenAiBrainConfig::builder()
            .api_key("test-key")
            .model("gpt-test")
            .system_prompt("You run the house")
            .build();
        OpenAiBrain::new(config).unwrap()
    }

    #[test]
    fn test_brain_name_and_fingerprint() {
        let brain = brain();
        assert_eq!(brain.name(), "OpenAiBrain");
        assert_eq!(
            brain.system_prompt_hash(),
            Some(hash_prompt("You run the house").as_str())
        );
    }

    #[test]
    fn test_empty_key_rejected() {
        let result = OpenAiBrain::new(OpenAiBrainConfig::default());
        assert!(matches!(result, Err(BrainError::Configuration(_))));
    }

    #[test]
    fn test_build_request_with_tools_and_tool_turns() {
        let brain = brain();
        let call = ToolCall::new("call_1", "list_devices", "{}");
        let request = ModelRequest::new(vec![
            ChatMessage::user("what's on?"),
            ChatMessage::assistant_tool_calls("", vec![call]),
            ChatMessage::tool_result("call_1", r#"{"devices":[]}"#),
        ])
        .with_system_prompt("Today is Monday")
        .with_tools(vec![ToolDefinition::function(
            "list_devices",
            "List devices",
            json!({"type": "object", "properties": {}}),
        )])
        .with_temperature(0.1);

        let value = serde_json::to_value(brain.build_request(&request)).unwrap();

        assert_eq!(value["model"], "gpt-test");
        assert_eq!(value["temperature"].as_f64().unwrap() as f32, 0.1);
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(
            value["messages"][0]["content"],
            "You run the house\n\nToday is Monday"
        );
        assert_eq!(value["messages"][1]["content"], "what's on?");
        assert!(value["messages"][2].get("content").is_none());
        assert_eq!(value["messages"][2]["tool_calls"][0]["type"], "function");
        assert_eq!(
            value["messages"][2]["tool_calls"][0]["function"]["name"],
            "list_devices"
        );
        assert_eq!(value["messages"][3]["role"], "tool");
        assert_eq!(value["messages"][3]["tool_call_id"], "call_1");
        assert_eq!(value["tools"][0]["function"]["name"], "list_devices");
    }

    #[test]
    fn test_build_request_without_tools_omits_field() {
        let request = ModelRequest::new(vec![ChatMessage::user("hi")]);
        let value = serde_json::to_value(brain().build_request(&request)).unwrap();
        assert!(value.get("tools").is_none());
    }

    #[test]
    fn test_audio_message_becomes_parts() {
        let clip = AudioClip::new(vec![1, 2, 3], "audio/ogg; codecs=opus");
        let wire = serde_json::to_value(to_wire(&ChatMessage::user_audio(clip, "transcribe"))).unwrap();

        assert_eq!(wire["content"][0]["type"], "text");
        assert_eq!(wire["content"][0]["text"], "transcribe");
        assert_eq!(wire["content"][1]["type"], "input_audio");
        assert_eq!(wire["content"][1]["input_audio"]["data"], "AQID");
        assert_eq!(wire["content"][1]["input_audio"]["format"], "ogg");
    }

    #[test]
    fn test_classify_quota_errors() {
        assert!(classify_error(StatusCode::TOO_MANY_REQUESTS, "").is_quota());
        assert!(classify_error(
            StatusCode::FORBIDDEN,
            r#"{"error":{"message":"You exceeded your current quota","type":"insufficient_quota"}}"#
        )
        .is_quota());
        assert!(classify_error(StatusCode::BAD_REQUEST, "RESOURCE_EXHAUSTED").is_quota());
        assert!(!classify_error(StatusCode::BAD_REQUEST, "bad schema").is_quota());
    }

    #[test]
    fn test_classify_other_errors() {
        match classify_error(
            StatusCode::BAD_REQUEST,
            r#"{"error":{"message":"invalid tool schema","type":"invalid_request_error"}}"#,
        ) {
            BrainError::ProcessingFailed(msg) => {
                assert!(msg.contains("400"));
                assert!(msg.contains("invalid tool schema"));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(
            classify_error(StatusCode::SERVICE_UNAVAILABLE, "down"),
            BrainError::Unavailable(_)
        ));
    }

    #[test]
    fn test_parse_tool_call_response() {
        let completion: ChatCompletionResponse = serde_json::from_value(json!({
            "id": "cmpl-1",
            "model": "gpt-test",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_9",
                        "type": "function",
                        "function": {"name": "control_device", "arguments": "{\"device\":\"lamp\",\"action\":\"turn_on\"}"}
                    }]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        }))
        .unwrap();

        let response = into_model_response(completion).unwrap();
        assert!(response.text.is_none());
        assert_eq!(response.tool_calls.len(), 1);
        assert_eq!(response.tool_calls[0].id, "call_9");
        assert_eq!(response.tool_calls[0].name, "control_device");
        assert_eq!(response.usage.unwrap().total_tokens, 15);
    }

    #[test]
    fn test_parse_text_response_and_empty_choices() {
        let completion: ChatCompletionResponse = serde_json::from_value(json!({
            "choices": [{"message": {"role": "assistant", "content": "The lamp is on."}, "finish_reason": "stop"}]
        }))
        .unwrap();
        let response = into_model_response(completion).unwrap();
        assert_eq!(response.text.as_deref(), Some("The lamp is on."));
        assert!(!response.has_tool_calls());

        let empty: ChatCompletionResponse = serde_json::from_value(json!({"choices": []})).unwrap();
        assert!(into_model_response(empty).is_err());
    }

    #[tokio::test]
    #[ignore = "requires LLM_API_KEY and network access"]
    async fn test_live_completion() {
        dotenvy::dotenv().ok();
        let brain = OpenAiBrain::from_env().unwrap();
        let response = brain
            .complete(ModelRequest::new(vec![ChatMessage::user("Say hi")]))
            .await
            .unwrap();
        assert!(response.text.is_some());
    }
}
