//! Assistant chat entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One message inside a chat session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: u64,
    /// True for the user's own messages, false for assistant replies.
    #[serde(default)]
    pub is_user: bool,
    pub content: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Evidence, audio, and note attachments; opaque to this client.
    #[serde(default)]
    pub attachments: Vec<Value>,
}

/// A chat session with its message history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: u64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

/// Response to sending a message: the stored user message and the
/// assistant's reply.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatReply {
    pub user_message: ChatMessage,
    pub ai_message: ChatMessage,
}
