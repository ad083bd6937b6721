//! Wire types exchanged with the messaging gateway.

use serde::{Deserialize, Serialize};

/// An incoming chat message as delivered on the `message` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// Gateway-assigned message id, used as the reaction target.
    pub id: String,
    /// Sender identifier.
    pub from: String,
    /// Chat the message arrived in, when it differs from the sender (groups).
    #[serde(default)]
    pub chat_id: Option<String>,
    /// Unix timestamp in milliseconds.
    #[serde(default)]
    pub timestamp: u64,
    /// Message body or media caption.
    #[serde(default)]
    pub text: Option<String>,
    /// Attached media, if any.
    #[serde(default)]
    pub media: Option<MediaRef>,
    /// True when the message was sent by the bot's own account.
    #[serde(default)]
    pub from_me: bool,
}

impl Envelope {
    /// Where replies to this message should be sent.
    pub fn reply_to(&self) -> &str {
        self.chat_id.as_deref().unwrap_or(&self.from)
    }

    /// Non-empty message text.
    pub fn text(&self) -> Option<&str> {
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// Attached media when it is a voice note or other audio.
    pub fn audio(&self) -> Option<&MediaRef> {
        self.media.as_ref().filter(|m| m.is_audio())
    }
}

/// Reference to media stored by the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaRef {
    pub id: String,
    pub mime_type: String,
    #[serde(default)]
    pub kind: MediaKind,
}

impl MediaRef {
    pub fn is_audio(&self) -> bool {
        matches!(self.kind, MediaKind::Voice | MediaKind::Audio)
            || self.mime_type.starts_with("audio/")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Voice,
    Audio,
    Image,
    Video,
    Document,
    #[default]
    #[serde(other)]
    Other,
}

/// Downloaded media content.
#[derive(Debug, Clone, PartialEq)]
pub struct Media {
    pub data: Vec<u8>,
    pub mime_type: String,
}

/// Response to a sent message.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SendResult {
    pub id: String,
    #[serde(default)]
    pub timestamp: u64,
}

/// Health endpoint response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HealthResponse {
    pub ready: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct SendTextRequest<'a> {
    pub to: &'a str,
    pub text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReactionRequest<'a> {
    pub to: &'a str,
    pub message_id: &'a str,
    pub emoji: &'a str,
}

/// An event from the gateway's SSE stream.
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeEvent {
    /// An incoming message.
    Message(Envelope),
    /// The gateway's chat session is connected and can send.
    Ready,
    /// The chat session was lost.
    Disconnected { reason: Option<String> },
    /// Pairing is required; `code` is the QR payload to scan.
    Qr { code: String },
}

#[derive(Deserialize)]
struct DisconnectedPayload {
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Deserialize)]
struct QrPayload {
    code: String,
}

impl BridgeEvent {
    /// Parse an SSE event by name. Unknown event names yield `Ok(None)`.
    pub fn parse(event: &str, data: &str) -> Result<Option<Self>, serde_json::Error> {
        let parsed = match event {
            "message" => Self::Message(serde_json::from_str(data)?),
            "ready" => Self::Ready,
            "disconnected" => {
                let reason = if data.trim().is_empty() {
                    None
                } else {
                    serde_json::from_str::<DisconnectedPayload>(data)?.reason
                };
                Self::Disconnected { reason }
            }
            "qr" => Self::Qr {
                code: serde_json::from_str::<QrPayload>(data)?.code,
            },
            _ => return Ok(None),
        };
        Ok(Some(parsed))
    }

    /// Readiness implied by this event, if it changes it.
    pub fn readiness(&self) -> Option<bool> {
        match self {
            Self::Ready => Some(true),
            Self::Disconnected { .. } | Self::Qr { .. } => Some(false),
            Self::Message(_) => None,
        }
    }
}
