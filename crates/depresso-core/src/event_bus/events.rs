//! Event type definitions for the event bus.
//!
//! Events are cloneable and serializable so the host bridge can build them
//! from cross-window JSON payloads.

use serde::{Deserialize, Serialize};

/// Placeholder body used in chat when an event carries no summary.
pub const DEFAULT_SUMMARY: &str = "Analysis ready.";

/// Kind of media an analysis result came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisSource {
    /// Still image upload.
    Image,
    /// Video upload.
    Video,
}

impl std::fmt::Display for AnalysisSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisSource::Image => write!(f, "image"),
            AnalysisSource::Video => write!(f, "video"),
        }
    }
}

/// An analysis result and its follow-up guidance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisEvent {
    /// Where the analysed media came from.
    pub source: AnalysisSource,
    /// Human-readable analysis result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Follow-up guidance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advice: Option<String>,
}

impl AnalysisEvent {
    /// Create an event from its parts
    pub fn new(source: AnalysisSource, summary: Option<String>, advice: Option<String>) -> Self {
        Self {
            source,
            summary,
            advice,
        }
    }

    /// Create an image event carrying only a summary
    pub fn image(summary: impl Into<String>) -> Self {
        Self::new(AnalysisSource::Image, Some(summary.into()), None)
    }

    /// Create a video event carrying only a summary
    pub fn video(summary: impl Into<String>) -> Self {
        Self::new(AnalysisSource::Video, Some(summary.into()), None)
    }

    /// Attach follow-up guidance
    pub fn with_advice(mut self, advice: impl Into<String>) -> Self {
        self.advice = Some(advice.into());
        self
    }

    /// Render the body of the chat message announcing this event.
    ///
    /// The summary (or a placeholder) followed by the advice after a blank
    /// line, when there is non-empty advice.
    pub fn chat_text(&self) -> String {
        let summary = self.summary.as_deref().unwrap_or(DEFAULT_SUMMARY);
        match self.advice.as_deref() {
            Some(advice) if !advice.is_empty() => format!("{}\n\n{}", summary, advice),
            _ => summary.to_string(),
        }
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        format!(
            "{} analysis (summary: {}, advice: {})",
            self.source,
            self.summary.as_ref().map_or(0, |s| s.len()),
            self.advice.as_ref().map_or(0, |s| s.len())
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_text_joins_summary_and_advice() {
        let event = AnalysisEvent::video("B").with_advice("C");
        assert_eq!(event.chat_text(), "B\n\nC");
    }

    #[test]
    fn test_chat_text_without_advice() {
        assert_eq!(AnalysisEvent::image("A").chat_text(), "A");
    }

    #[test]
    fn test_chat_text_without_summary() {
        let event = AnalysisEvent::new(AnalysisSource::Image, None, Some("breathe".into()));
        assert_eq!(event.chat_text(), "Analysis ready.\n\nbreathe");

        let empty = AnalysisEvent::new(AnalysisSource::Video, None, None);
        assert_eq!(empty.chat_text(), DEFAULT_SUMMARY);
    }

    #[test]
    fn test_chat_text_skips_empty_advice() {
        let event = AnalysisEvent::image("A").with_advice("");
        assert_eq!(event.chat_text(), "A");
    }

    #[test]
    fn test_source_serializes_lowercase() {
        let json = serde_json::to_value(AnalysisEvent::image("A")).unwrap();
        assert_eq!(json, serde_json::json!({"source": "image", "summary": "A"}));

        let event: AnalysisEvent =
            serde_json::from_str(r#"{"source":"video","advice":"rest"}"#).unwrap();
        assert_eq!(event.source, AnalysisSource::Video);
        assert_eq!(event.summary, None);
        assert_eq!(event.advice.as_deref(), Some("rest"));
    }
}
