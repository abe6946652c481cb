//! Text generation over HTTP.

use async_trait::async_trait;
use depresso_core::Result;
use depresso_settings::{endpoints, Config};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::http::{read_json, request_error};

/// Produces replies to free text
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a reply with the language model
    async fn generate(&self, text: &str) -> Result<String>;

    /// Reply from the intent classifier
    async fn send_intent(&self, text: &str) -> Result<String>;
}

#[derive(Serialize)]
struct TextRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct ReplyResponse {
    #[serde(default)]
    reply: Option<String>,
}

/// HTTP client for the chat endpoints
#[derive(Debug, Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    config: Arc<Config>,
}

impl ChatClient {
    pub fn new(config: Arc<Config>) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(http: reqwest::Client, config: Arc<Config>) -> Self {
        Self { http, config }
    }

    async fn post_text(&self, endpoint: &str, text: &str) -> Result<String> {
        let mut request = self
            .http
            .post(self.config.build_api_url(endpoint))
            .json(&TextRequest { text });
        if let Some(key) = self.config.api_key.as_deref() {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(request_error)?;
        let body: ReplyResponse = read_json(response).await?;
        // A missing reply reads as empty so callers can fall back.
        Ok(body.reply.unwrap_or_default())
    }
}

#[async_trait]
impl TextGenerator for ChatClient {
    async fn generate(&self, text: &str) -> Result<String> {
        tracing::debug!("Requesting generated reply ({} chars)", text.len());
        self.post_text(endpoints::chat::GENERATE, text).await
    }

    async fn send_intent(&self, text: &str) -> Result<String> {
        tracing::debug!("Requesting intent reply ({} chars)", text.len());
        self.post_text(endpoints::chat::INTENT, text).await
    }
}
