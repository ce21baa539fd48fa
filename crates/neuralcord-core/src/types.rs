use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::Result;

/// One chat utterance as delivered by the chat gateway.
///
/// Immutable once constructed; the filter only ever reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Opaque identifier, used for dedup.
    pub id: String,
    /// Display name of the sender.
    pub author: String,
    /// Raw message text.
    pub content: String,
    /// Ordering key.
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(
        id: impl Into<String>,
        author: impl Into<String>,
        content: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            author: author.into(),
            content: content.into(),
            timestamp,
        }
    }
}

/// Recent chat messages in chronological order (oldest first).
///
/// The caller assembles the window; renderers only look at the last
/// `max_context_messages` entries, so an over-long window is tolerated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextWindow {
    messages: Vec<ChatMessage>,
}

impl ContextWindow {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self { messages }
    }

    /// Build a window holding at most `max` of the newest messages.
    pub fn bounded(mut messages: Vec<ChatMessage>, max: usize) -> Self {
        if messages.len() > max {
            messages.drain(..messages.len() - max);
        }
        Self { messages }
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// The most recent message, if any.
    pub fn latest(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// The last `n` messages, oldest first.
    pub fn recent(&self, n: usize) -> &[ChatMessage] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChatMessage> {
        self.messages.iter()
    }

    pub fn into_messages(self) -> Vec<ChatMessage> {
        self.messages
    }

    /// Parse a JSON array of messages.
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Read a JSON array of messages from a file.
    pub fn read_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }
}

impl From<Vec<ChatMessage>> for ContextWindow {
    fn from(messages: Vec<ChatMessage>) -> Self {
        Self::new(messages)
    }
}

/// Outcome of one gate evaluation.
///
/// `Respond` carries the exact text forwarded to the agent. The rationale on
/// `Ignore`/`Inappropriate` is for logs only and is never sent anywhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", content = "text", rename_all = "snake_case")]
pub enum Decision {
    Respond(String),
    Ignore(Option<String>),
    Inappropriate(Option<String>),
}

impl Decision {
    pub fn should_respond(&self) -> bool {
        matches!(self, Decision::Respond(_))
    }

    /// The agent payload when responding.
    pub fn payload(&self) -> Option<&str> {
        match self {
            Decision::Respond(payload) => Some(payload),
            _ => None,
        }
    }

    /// Log-only rationale for the non-responding variants.
    pub fn rationale(&self) -> Option<&str> {
        match self {
            Decision::Respond(_) => None,
            Decision::Ignore(r) | Decision::Inappropriate(r) => r.as_deref(),
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Respond(_) => write!(f, "respond"),
            Decision::Ignore(_) => write!(f, "ignore"),
            Decision::Inappropriate(_) => write!(f, "inappropriate"),
        }
    }
}
