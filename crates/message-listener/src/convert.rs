//! Envelope filtering and conversion to router input.

use brain_core::{AudioClip, InboundMessage, MessageKind};
use chat_bridge::{BridgeClient, Envelope};
use tracing::warn;

use crate::config::ListenerConfig;

/// Why an envelope was not routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    FromSelf,
    NotAllowed,
}

impl SkipReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FromSelf => "message from self",
            Self::NotAllowed => "sender not on allow-list",
        }
    }
}

/// Decide whether an envelope should reach the router.
pub fn admit(config: &ListenerConfig, envelope: &Envelope) -> Result<(), SkipReason> {
    if envelope.from_me || config.is_self(&envelope.from) {
        return Err(SkipReason::FromSelf);
    }
    if !config.is_allowed(&envelope.from) {
        return Err(SkipReason::NotAllowed);
    }
    Ok(())
}

/// Build an inbound message with an already-resolved payload.
pub fn to_inbound(envelope: &Envelope, kind: MessageKind) -> InboundMessage {
    InboundMessage {
        id: Some(envelope.id.clone()),
        sender: envelope.from.clone(),
        destination: envelope.reply_to().to_string(),
        kind,
        timestamp: envelope.timestamp,
    }
}

/// Payload for envelopes that need no download: text or captions.
pub fn text_kind(envelope: &Envelope) -> MessageKind {
    match envelope.text() {
        Some(text) => MessageKind::Text(text.to_string()),
        None => MessageKind::Other,
    }
}

/// Convert an envelope, downloading voice media through the gateway.
///
/// A failed download degrades to [`MessageKind::Other`], which the router
/// ignores.
pub async fn resolve(client: &BridgeClient, envelope: &Envelope) -> InboundMessage {
    let kind = match envelope.audio() {
        Some(media) => match client.download_media(&media.id).await {
            Ok(downloaded) => {
                let mime = if downloaded.mime_type.starts_with("audio/") {
                    downloaded.mime_type
                } else {
                    media.mime_type.clone()
                };
                MessageKind::Voice(AudioClip::new(downloaded.data, mime))
            }
            Err(e) => {
                warn!(media_id = %media.id, "Voice download failed: {}", e);
                MessageKind::Other
            }
        },
        None => text_kind(envelope),
    };
    to_inbound(envelope, kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(json: &str) -> Envelope {
        chat_bridge::BridgeEvent::parse("message", json)
            .ok()
            .flatten()
            .and_then(|e| match e {
                chat_bridge::BridgeEvent::Message(env) => Some(env),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn test_admit() {
        let config = ListenerConfig::default()
            .with_self_id("972509999999")
            .with_allowed_senders(["972501111111", "972509999999"]);

        let ok = envelope(r#"{"id":"1","from":"972501111111","text":"hi"}"#);
        assert_eq!(admit(&config, &ok), Ok(()));

        let own = envelope(r#"{"id":"2","from":"972501111111","text":"hi","fromMe":true}"#);
        assert_eq!(admit(&config, &own), Err(SkipReason::FromSelf));

        let selfish = envelope(r#"{"id":"3","from":"+972509999999","text":"hi"}"#);
        assert_eq!(admit(&config, &selfish), Err(SkipReason::FromSelf));

        let stranger = envelope(r#"{"id":"4","from":"972502222222","text":"hi"}"#);
        assert_eq!(admit(&config, &stranger), Err(SkipReason::NotAllowed));
    }

    #[test]
    fn test_to_inbound_group() {
        let env = envelope(
            r#"{"id":"9","from":"972501111111","chatId":"family","timestamp":42,"text":" dinner? "}"#,
        );
        let msg = to_inbound(&env, text_kind(&env));
        assert_eq!(msg.id.as_deref(), Some("9"));
        assert_eq!(msg.sender, "972501111111");
        assert_eq!(msg.destination, "family");
        assert_eq!(msg.timestamp, 42);
        assert_eq!(msg.kind, MessageKind::Text("dinner?".to_string()));
    }

    #[test]
    fn test_media_without_caption_is_other() {
        let env = envelope(
            r#"{"id":"5","from":"a","media":{"id":"m","mimeType":"image/png","kind":"image"}}"#,
        );
        assert_eq!(text_kind(&env), MessageKind::Other);

        let captioned = envelope(
            r#"{"id":"6","from":"a","text":"look","media":{"id":"m","mimeType":"image/png"}}"#,
        );
        assert_eq!(text_kind(&captioned), MessageKind::Text("look".to_string()));
    }
}
