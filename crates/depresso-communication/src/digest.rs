//! Normalization of analysis payloads.
//!
//! The backend answers in one of two shapes. The simple analyzer sends an
//! `emotions` score map with `diagnosis` and `confidence`; the detailed
//! analyzer sends `risk_level` and an `emotional_analysis` block. Both are
//! reduced to an [`AnalysisDigest`].

use serde_json::Value;

const UNKNOWN_DIAGNOSIS: &str = "unknown";
const UNKNOWN_EMOTION: &str = "n/a";

/// Diagnosis and dominant emotion for one analysed file
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisDigest {
    pub diagnosis: String,
    pub confidence: Option<f64>,
    pub dominant_emotion: String,
}

impl AnalysisDigest {
    /// Reduce a raw `analysis_result` payload. A missing payload yields the
    /// unknown digest.
    pub fn from_payload(payload: Option<&Value>) -> Self {
        let Some(payload) = payload else {
            return Self::unknown();
        };

        if let Some(emotions) = payload.get("emotions").and_then(Value::as_object) {
            // Ties keep the first emotion in map order.
            let dominant = emotions
                .iter()
                .filter_map(|(name, score)| score.as_f64().map(|s| (name, s)))
                .fold(None::<(&String, f64)>, |best, (name, score)| match best {
                    Some((_, top)) if score <= top => best,
                    _ => Some((name, score)),
                })
                .map(|(name, _)| name.clone())
                .unwrap_or_else(|| UNKNOWN_EMOTION.to_string());

            return Self {
                diagnosis: text(payload.get("diagnosis"))
                    .unwrap_or_else(|| UNKNOWN_DIAGNOSIS.to_string()),
                confidence: payload.get("confidence").and_then(Value::as_f64),
                dominant_emotion: dominant,
            };
        }

        let emotional = payload.get("emotional_analysis");
        Self {
            diagnosis: text(payload.get("risk_level"))
                .unwrap_or_else(|| UNKNOWN_DIAGNOSIS.to_string()),
            confidence: emotional
                .and_then(|e| e.get("emotion_confidence"))
                .and_then(Value::as_f64),
            dominant_emotion: text(emotional.and_then(|e| e.get("dominant_emotion")))
                .unwrap_or_else(|| UNKNOWN_EMOTION.to_string()),
        }
    }

    fn unknown() -> Self {
        Self {
            diagnosis: UNKNOWN_DIAGNOSIS.to_string(),
            confidence: None,
            dominant_emotion: UNKNOWN_EMOTION.to_string(),
        }
    }
}

impl std::fmt::Display for AnalysisDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Diagnosis: {} | Dominant Emotion: {}",
            self.diagnosis, self.dominant_emotion
        )
    }
}

fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
