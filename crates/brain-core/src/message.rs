//! Inbound message types delivered by the messaging channel.

use serde::{Deserialize, Serialize};

/// Binary audio with its MIME type, e.g. a voice note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioClip {
    /// Raw audio bytes.
    #[serde(skip)]
    pub data: Vec<u8>,
    /// MIME type reported by the channel (e.g. "audio/ogg").
    pub mime_type: String,
}

impl AudioClip {
    pub fn new(data: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            data,
            mime_type: mime_type.into(),
        }
    }

    /// Short audio format name derived from the MIME type ("ogg", "mp3", "wav").
    pub fn format(&self) -> &str {
        let subtype = self
            .mime_type
            .split(';')
            .next()
            .unwrap_or_default()
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .trim();
        match subtype {
            "mpeg" => "mp3",
            "x-wav" | "wave" => "wav",
            "" => "ogg",
            other => other,
        }
    }
}

/// What an inbound message carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageKind {
    /// Plain text.
    Text(String),
    /// A voice note.
    Voice(AudioClip),
    /// Stickers, images, reactions and anything else.
    Other,
}

/// A message received from the messaging channel.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    /// Channel message id, used for acknowledgement reactions.
    pub id: Option<String>,
    /// Stable sender identifier.
    pub sender: String,
    /// Where replies go (the sender for direct chats, the group otherwise).
    pub destination: String,
    /// Message payload.
    pub kind: MessageKind,
    /// Timestamp in milliseconds since the epoch.
    pub timestamp: u64,
}

impl InboundMessage {
    /// Create a direct text message that replies to its sender.
    pub fn text(sender: impl Into<String>, text: impl Into<String>) -> Self {
        let sender = sender.into();
        Self {
            id: None,
            destination: sender.clone(),
            sender,
            kind: MessageKind::Text(text.into()),
            timestamp: 0,
        }
    }

    /// Create a direct voice message that replies to its sender.
    pub fn voice(sender: impl Into<String>, clip: AudioClip) -> Self {
        let sender = sender.into();
        Self {
            id: None,
            destination: sender.clone(),
            sender,
            kind: MessageKind::Voice(clip),
            timestamp: 0,
        }
    }

    /// Set the channel message id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set a destination other than the sender.
    pub fn with_destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = destination.into();
        self
    }

    /// Set the timestamp.
    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// The text payload, if any.
    pub fn text_body(&self) -> Option<&str> {
        match &self.kind {
            MessageKind::Text(text) => Some(text),
            _ => None,
        }
    }
}
