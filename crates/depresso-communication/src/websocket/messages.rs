//! Chat socket frames.

use chrono::{DateTime, Utc};
use depresso_core::AnalysisSource;
use serde::{Deserialize, Serialize};

use crate::analysis::DetailedAnalysis;
use crate::message::{ChatMessage, ChatRole, Mood};

/// Something that happened on the chat socket
#[derive(Debug, Clone, PartialEq)]
pub enum SocketEvent {
    /// A complete or streamed chat message
    Message(ChatMessage),
    /// The assistant started or stopped typing
    Typing(bool),
    /// Analysis pushed by the backend
    Analysis(DetailedAnalysis),
    /// Socket opened (`true`) or closed (`false`)
    Connection(bool),
}

/// Frames the backend sends, keyed by `type`
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum ServerFrame {
    ChatMessage {
        #[serde(default)]
        id: Option<String>,
        #[serde(default)]
        sender: Option<String>,
        #[serde(default)]
        content: String,
        #[serde(default)]
        timestamp: Option<String>,
        #[serde(default)]
        mood: Option<Mood>,
    },
    AiTyping {
        #[serde(default)]
        is_typing: bool,
    },
    AnalysisResult {
        #[serde(default)]
        analysis: DetailedAnalysis,
    },
    StreamingResponse {
        #[serde(default)]
        message_id: Option<String>,
        #[serde(default)]
        partial_content: String,
        #[serde(default)]
        mood: Option<Mood>,
    },
    #[serde(other)]
    Unknown,
}

impl ServerFrame {
    pub(crate) fn parse(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Event for this frame; unknown frame types yield nothing
    pub(crate) fn into_event(self) -> Option<SocketEvent> {
        match self {
            ServerFrame::ChatMessage {
                id,
                sender,
                content,
                timestamp,
                mood,
            } => {
                let role = if sender.as_deref() == Some("ai") {
                    ChatRole::Ai
                } else {
                    ChatRole::User
                };
                let mut message = ChatMessage::new(role, content, mood);
                if let Some(id) = id.filter(|id| !id.is_empty()) {
                    message.id = id;
                }
                if let Some(ts) = timestamp.as_deref().and_then(parse_timestamp) {
                    message.timestamp = ts;
                }
                Some(SocketEvent::Message(message))
            }
            ServerFrame::AiTyping { is_typing } => Some(SocketEvent::Typing(is_typing)),
            ServerFrame::AnalysisResult { analysis } => Some(SocketEvent::Analysis(analysis)),
            ServerFrame::StreamingResponse {
                message_id,
                partial_content,
                mood,
            } => {
                let mut message = ChatMessage::new(ChatRole::Ai, partial_content, mood);
                if let Some(id) = message_id {
                    message.id = id;
                }
                message.is_streaming = true;
                Some(SocketEvent::Message(message))
            }
            ServerFrame::Unknown => None,
        }
    }
}

fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

/// Frames this client sends
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum ClientFrame<'a> {
    ChatMessage {
        content: &'a str,
        #[serde(skip_serializing_if = "Option::is_none")]
        mood: Option<Mood>,
        timestamp: String,
    },
    AnalysisRequest {
        file_id: &'a str,
        file_type: AnalysisSource,
    },
}
