//! History repair for model requests.
//!
//! Providers require strict user/assistant alternation starting with a user
//! turn. Stored history does not always satisfy that: a failed model call
//! leaves a user turn without an answer, and a reset can cut a conversation
//! mid-exchange. [`coalesce`] repairs both.

use crate::model::{ChatMessage, Role};

/// Drop leading assistant turns and merge consecutive same-role turns.
///
/// Merged turns keep the first turn's metadata and join their text with a
/// newline. The result never starts with an assistant turn and never has two
/// adjacent turns of the same role.
pub fn coalesce(messages: Vec<ChatMessage>) -> Vec<ChatMessage> {
    let mut out: Vec<ChatMessage> = Vec::with_capacity(messages.len());

    for message in messages {
        if out.is_empty() && message.role == Role::Assistant {
            continue;
        }
        match out.last_mut() {
            Some(last) if last.role == message.role => {
                if !message.content.is_empty() {
                    if !last.content.is_empty() {
                        last.content.push('\n');
                    }
                    last.content.push_str(&message.content);
                }
                if last.audio.is_none() {
                    last.audio = message.audio;
                }
            }
            _ => out.push(message),
        }
    }

    out
}
