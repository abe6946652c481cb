//! Host bridge
//!
//! Tracks which page is showing and accepts "open the chat" requests from
//! other windows.

use depresso_core::{AnalysisBus, AnalysisEvent, AnalysisSource, Result};
use serde::Deserialize;

/// Message type that opens the chat page.
pub const OPEN_AI_CHAT: &str = "OPEN_AI_CHAT";

/// Top-level page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Upload,
    Chat,
}

impl std::fmt::Display for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Upload => write!(f, "upload"),
            Self::Chat => write!(f, "chat"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct HostMessage {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    advice: Option<String>,
}

/// Navigation state plus the cross-window entry point
#[derive(Debug)]
pub struct HostBridge {
    bus: AnalysisBus,
    view: View,
}

impl HostBridge {
    pub fn new(bus: AnalysisBus) -> Self {
        Self {
            bus,
            view: View::default(),
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn navigate(&mut self, view: View) {
        if self.view != view {
            tracing::debug!("Navigating from {} to {}", self.view, view);
            self.view = view;
        }
    }

    /// Handle a JSON message posted by another window.
    ///
    /// Returns whether the message was an [`OPEN_AI_CHAT`] request. Other
    /// message types are ignored; malformed JSON is an error.
    pub fn handle_message(&mut self, payload: &str) -> Result<bool> {
        let message: HostMessage = serde_json::from_str(payload)?;
        if message.kind != OPEN_AI_CHAT {
            tracing::debug!("Ignoring host message of type {:?}", message.kind);
            return Ok(false);
        }
        self.open_ai_chat(message.summary, message.advice);
        Ok(true)
    }

    /// Publish any given analysis text, then show the chat page.
    ///
    /// Empty strings count as absent.
    pub fn open_ai_chat(&mut self, summary: Option<String>, advice: Option<String>) {
        let summary = summary.filter(|s| !s.is_empty());
        let advice = advice.filter(|a| !a.is_empty());
        if summary.is_some() || advice.is_some() {
            self.bus
                .publish(AnalysisEvent::new(AnalysisSource::Image, summary, advice));
        }
        self.navigate(View::Chat);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_on_upload() {
        let bridge = HostBridge::new(AnalysisBus::new());
        assert_eq!(bridge.view(), View::Upload);
        assert_eq!(View::Chat.to_string(), "chat");
    }

    #[test]
    fn test_other_message_types_are_ignored() {
        let bus = AnalysisBus::new();
        let mut bridge = HostBridge::new(bus.clone());

        assert!(!bridge.handle_message(r#"{"type": "RESIZE", "summary": "x"}"#).unwrap());
        assert!(!bridge.handle_message(r#"{"summary": "no type"}"#).unwrap());
        assert_eq!(bridge.view(), View::Upload);
        assert!(bus.last_event().is_none());
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let mut bridge = HostBridge::new(AnalysisBus::new());
        let err = bridge.handle_message("{type: OPEN_AI_CHAT").unwrap_err();
        assert!(matches!(err, depresso_core::Error::Json(_)));
        assert_eq!(bridge.view(), View::Upload);
    }
}
