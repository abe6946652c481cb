//! Chat message model shared by the socket and the chat page.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Ai,
    System,
}

/// Emotional tone attached to a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Sad,
    Neutral,
    Excited,
    Worried,
    Caring,
    /// Any tone this client does not know about
    #[serde(other)]
    Other,
}

impl Mood {
    /// Wire name of the mood
    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Sad => "sad",
            Mood::Neutral => "neutral",
            Mood::Excited => "excited",
            Mood::Worried => "worried",
            Mood::Caring => "caring",
            Mood::Other => "other",
        }
    }
}

/// One message in a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: ChatRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<Mood>,
    /// Partial content from a streamed reply
    #[serde(default)]
    pub is_streaming: bool,
}

impl ChatMessage {
    /// New message stamped now with a random id
    pub fn new(role: ChatRole, content: impl Into<String>, mood: Option<Mood>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
            mood,
            is_streaming: false,
        }
    }
}
