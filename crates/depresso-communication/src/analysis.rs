//! Media analysis client
//!
//! Uploads images and videos to the analysis backend as multipart forms and
//! decodes the analysis it returns.

use async_trait::async_trait;
use depresso_core::{AnalysisSource, Result, UploadError};
use depresso_settings::{endpoints, Config};
use futures_util::future::join_all;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::http::{id_text, read_json, request_error};
use crate::media::MediaFile;

/// Analysis type requested for every upload.
pub const ANALYSIS_TYPE: &str = "depression_detection";

/// Outcome of a successful upload
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisUpload {
    pub file_id: Option<String>,
    pub analysis_id: Option<String>,
    /// Raw `analysis_result` payload; see [`crate::digest`] for its shapes
    pub analysis: Option<Value>,
    /// Guidance generated by the backend
    pub advice: Option<String>,
    pub message: String,
}

/// Overall risk rating in the detailed analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[default]
    Low,
    Moderate,
    High,
}

/// Depression indicator scores
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DepressionIndicators {
    pub facial_expression: f64,
    pub body_language: f64,
    pub eye_contact: f64,
    pub micro_expressions: f64,
    pub overall_score: f64,
}

/// Emotion breakdown
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EmotionalAnalysis {
    pub dominant_emotion: String,
    pub emotion_confidence: f64,
    pub emotion_distribution: HashMap<String, f64>,
}

/// Detailed analysis, as returned by the results endpoint and pushed over
/// the chat socket
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DetailedAnalysis {
    pub depression_indicators: DepressionIndicators,
    pub emotional_analysis: EmotionalAnalysis,
    pub recommendations: Vec<String>,
    pub mood_analysis: String,
    pub risk_level: RiskLevel,
    pub therapeutic_suggestions: Vec<String>,
    pub timestamp: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(default)]
    file_id: Option<Value>,
    #[serde(default)]
    analysis_id: Option<Value>,
    #[serde(default)]
    analysis_result: Option<Value>,
    #[serde(default)]
    advice: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl UploadResponse {
    fn into_upload(self, default_message: &str) -> AnalysisUpload {
        AnalysisUpload {
            file_id: id_text(self.file_id),
            analysis_id: id_text(self.analysis_id),
            analysis: self.analysis_result.filter(|v| !v.is_null()),
            advice: self.advice.filter(|a| !a.is_empty()),
            message: self
                .message
                .unwrap_or_else(|| default_message.to_string()),
        }
    }
}

/// Something that can analyse media files
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// Validate and upload an image
    async fn upload_image(&self, file: &MediaFile, metadata: Option<&Value>)
        -> Result<AnalysisUpload>;

    /// Validate and upload a video
    async fn upload_video(&self, file: &MediaFile, metadata: Option<&Value>)
        -> Result<AnalysisUpload>;
}

/// HTTP client for the analysis endpoints
#[derive(Debug, Clone)]
pub struct AnalysisClient {
    http: reqwest::Client,
    config: Arc<Config>,
}

impl AnalysisClient {
    /// Create a client for the configured backend
    pub fn new(config: Arc<Config>) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Create a client reusing an existing reqwest client
    pub fn with_client(http: reqwest::Client, config: Arc<Config>) -> Self {
        Self { http, config }
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.config.api_key.as_deref() {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    async fn upload(
        &self,
        file: &MediaFile,
        kind: AnalysisSource,
        metadata: Option<&Value>,
    ) -> Result<AnalysisUpload> {
        file.validate(kind, &self.config.upload)?;

        let (field, endpoint, default_message) = match kind {
            AnalysisSource::Image => (
                "image",
                endpoints::analysis::UPLOAD_IMAGE,
                "Image analyzed successfully.",
            ),
            AnalysisSource::Video => (
                "video",
                endpoints::analysis::UPLOAD_VIDEO,
                "Video analyzed successfully.",
            ),
        };

        let part = Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.mime_type)
            .map_err(request_error)?;
        let mut form = Form::new()
            .part(field, part)
            .text("analysis_type", ANALYSIS_TYPE);
        if let Some(metadata) = metadata {
            form = form.text("metadata", serde_json::to_string(metadata)?);
        }

        tracing::info!("Uploading {} ({} bytes) for {} analysis", file.name, file.size(), kind);
        let response = self
            .authorize(self.http.post(self.config.build_api_url(endpoint)))
            .multipart(form)
            .send()
            .await
            .map_err(request_error)?;

        let body: UploadResponse = read_json(response).await?;
        Ok(body.into_upload(default_message))
    }

    /// Upload a file in `upload.chunk_size` pieces, then ask the backend to
    /// assemble and analyse it.
    pub async fn upload_in_chunks(
        &self,
        file: &MediaFile,
        kind: AnalysisSource,
    ) -> Result<AnalysisUpload> {
        let upload_id = uuid::Uuid::new_v4().to_string();
        let chunk_size = usize::try_from(self.config.upload.chunk_size).unwrap_or(usize::MAX);
        let chunks: Vec<&[u8]> = file.bytes.chunks(chunk_size.max(1)).collect();
        let total = chunks.len();
        let chunk_url = self
            .config
            .build_api_url(&format!("{}chunk", endpoints::analysis::UPLOAD_IMAGE));

        for (index, chunk) in chunks.into_iter().enumerate() {
            let form = Form::new()
                .part("chunk", Part::bytes(chunk.to_vec()).file_name(file.name.clone()))
                .text("upload_id", upload_id.clone())
                .text("chunk_index", index.to_string())
                .text("total_chunks", total.to_string())
                .text("filename", file.name.clone())
                .text("file_type", kind.to_string());

            let response = self
                .authorize(self.http.post(&chunk_url))
                .multipart(form)
                .send()
                .await
                .map_err(request_error)?;
            let _: Value = read_json(response).await?;
            tracing::debug!("Sent chunk {}/{} of {}", index + 1, total, file.name);
        }

        let finalize_url = self
            .config
            .build_api_url(&format!("{}finalize", endpoints::analysis::UPLOAD_IMAGE));
        let response = self
            .authorize(self.http.post(finalize_url))
            .json(&serde_json::json!({
                "upload_id": upload_id,
                "analysis_type": ANALYSIS_TYPE,
            }))
            .send()
            .await
            .map_err(request_error)?;

        let body: UploadResponse = read_json(response).await?;
        Ok(AnalysisUpload {
            file_id: id_text(body.file_id),
            analysis_id: id_text(body.analysis_id),
            analysis: None,
            advice: None,
            message: "File uploaded successfully. Analysis in progress...".to_string(),
        })
    }

    /// Fetch the detailed analysis for a previous upload
    pub async fn get_results(&self, analysis_id: &str) -> Result<DetailedAnalysis> {
        let url = self.config.build_api_url(&format!(
            "{}/{}",
            endpoints::analysis::GET_RESULTS,
            analysis_id
        ));
        let response = self
            .authorize(self.http.get(url))
            .send()
            .await
            .map_err(request_error)?;
        read_json(response).await
    }

    /// Upload several files concurrently, one result per input in order.
    ///
    /// Files are routed by the configured allow-lists; anything else fails
    /// with [`UploadError::UnsupportedType`].
    pub async fn batch_analysis(&self, files: &[MediaFile]) -> Vec<Result<AnalysisUpload>> {
        join_all(files.iter().map(|file| async move {
            if self.config.upload.accepts_image(&file.mime_type) {
                self.upload(file, AnalysisSource::Image, None).await
            } else if self.config.upload.accepts_video(&file.mime_type) {
                self.upload(file, AnalysisSource::Video, None).await
            } else {
                Err(UploadError::UnsupportedType {
                    mime_type: file.mime_type.clone(),
                }
                .into())
            }
        }))
        .await
    }
}

#[async_trait]
impl AnalysisBackend for AnalysisClient {
    async fn upload_image(
        &self,
        file: &MediaFile,
        metadata: Option<&Value>,
    ) -> Result<AnalysisUpload> {
        self.upload(file, AnalysisSource::Image, metadata).await
    }

    async fn upload_video(
        &self,
        file: &MediaFile,
        metadata: Option<&Value>,
    ) -> Result<AnalysisUpload> {
        self.upload(file, AnalysisSource::Video, metadata).await
    }
}

/// Sends every upload through [`AnalysisClient::upload_in_chunks`].
///
/// The backend analyses chunked uploads asynchronously, so results carry no
/// analysis payload or advice.
#[derive(Debug, Clone)]
pub struct ChunkedUploads {
    client: AnalysisClient,
}

impl ChunkedUploads {
    pub fn new(client: AnalysisClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AnalysisBackend for ChunkedUploads {
    async fn upload_image(
        &self,
        file: &MediaFile,
        _metadata: Option<&Value>,
    ) -> Result<AnalysisUpload> {
        self.client.upload_in_chunks(file, AnalysisSource::Image).await
    }

    async fn upload_video(
        &self,
        file: &MediaFile,
        _metadata: Option<&Value>,
    ) -> Result<AnalysisUpload> {
        self.client.upload_in_chunks(file, AnalysisSource::Video).await
    }
}
