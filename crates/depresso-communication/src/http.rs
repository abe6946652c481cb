//! Shared HTTP plumbing for the backend clients.

use depresso_core::{ConnectionError, Error, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Map a transport failure from reqwest.
pub(crate) fn request_error(err: reqwest::Error) -> Error {
    ConnectionError::Request {
        reason: err.to_string(),
    }
    .into()
}

/// Decode a JSON response, turning non-success statuses into
/// [`ConnectionError::Http`].
///
/// The error message is the body's `message`, else its `error`, else a
/// generic `HTTP <code>: <reason>`.
pub(crate) async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body: Option<Value> = response.json().await.ok();
        let server_message = body
            .as_ref()
            .and_then(|b| b.get("message").or_else(|| b.get("error")))
            .and_then(Value::as_str)
            .map(str::to_string);
        tracing::debug!("Backend answered {}: {:?}", status, server_message);
        return Err(
            ConnectionError::http(status.as_u16(), status.canonical_reason(), server_message)
                .into(),
        );
    }

    response.json::<T>().await.map_err(|e| {
        ConnectionError::InvalidResponse {
            reason: e.to_string(),
        }
        .into()
    })
}

/// Render an identifier the backend may send as a string or a number.
pub(crate) fn id_text(value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_id_text() {
        assert_eq!(id_text(Some(json!("abc"))), Some("abc".to_string()));
        assert_eq!(id_text(Some(json!(42))), Some("42".to_string()));
        assert_eq!(id_text(Some(Value::Null)), None);
        assert_eq!(id_text(None), None);
    }
}
