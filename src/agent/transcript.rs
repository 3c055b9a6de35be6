//! Transcript messages as seen by the reconciler.
//!
//! A transcript entry is either a typed [`ChatMessage`] produced by our own
//! reasoning loop, or a loosely-shaped JSON record (as recorded from other
//! agent frameworks: `{"type": "ai", "content": [...], "tool_calls": [...]}`).
//! [`TranscriptMessage::role`], [`TranscriptMessage::content`] and
//! [`TranscriptMessage::requested_tool_call`] normalize both shapes so no
//! caller has to sniff types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::message::{ChatMessage, Role};

/// One entry of a reasoning transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TranscriptMessage {
    /// A message in our own typed shape.
    Chat(ChatMessage),
    /// Any other JSON object.
    Record(Value),
}

impl From<ChatMessage> for TranscriptMessage {
    fn from(msg: ChatMessage) -> Self {
        Self::Chat(msg)
    }
}

impl TranscriptMessage {
    /// Returns the message role, or `None` if it cannot be determined.
    ///
    /// Records are checked for `role`, then `type`; framework spellings
    /// (`human`, `ai`) are accepted.
    pub fn role(&self) -> Option<Role> {
        match self {
            Self::Chat(m) => Some(m.role),
            Self::Record(v) => ["role", "type"]
                .iter()
                .filter_map(|key| v.get(key).and_then(Value::as_str))
                .find_map(Role::parse),
        }
    }

    /// Returns the text content, empty if absent.
    ///
    /// Content given as an array of parts has its text parts concatenated.
    pub fn content(&self) -> String {
        match self {
            Self::Chat(m) => m.content.clone(),
            Self::Record(v) => v.get("content").map(value_text).unwrap_or_default(),
        }
    }

    /// Returns `true` if this is a model message that requested a tool call.
    pub fn requested_tool_call(&self) -> bool {
        match self {
            Self::Chat(m) => m.role == Role::Assistant && !m.tool_calls.is_empty(),
            Self::Record(v) => {
                self.role() == Some(Role::Assistant)
                    && (non_empty(v.get("tool_calls"))
                        || non_empty(
                            v.get("additional_kwargs")
                                .and_then(|k| k.get("tool_calls")),
                        )
                        || non_empty(v.get("function_call")))
            }
        }
    }

    /// Returns `true` for tool-result messages.
    pub fn is_tool(&self) -> bool {
        self.role() == Some(Role::Tool)
    }

    /// Returns `true` for model messages.
    pub fn is_assistant(&self) -> bool {
        self.role() == Some(Role::Assistant)
    }
}

/// Flattens a content value to text.
fn value_text(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(parts) => parts
            .iter()
            .filter_map(|p| match p {
                Value::String(s) => Some(s.clone()),
                Value::Object(_) => p.get("text").and_then(Value::as_str).map(String::from),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join(""),
        other => other.to_string(),
    }
}

fn non_empty(v: Option<&Value>) -> bool {
    match v {
        None | Some(Value::Null) => false,
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}
